use skirmish_core::{AttackPower, Faction, Scenario, BASELINE_ELF_POWER};
use skirmish_system_calibration::Calibration;

const CAVERN_27730: &str = "\
#######
#.G...#
#...EG#
#.#.#G#
#..G#E#
#.....#
#######";

const CAVERN_18740: &str = "\
#########
#G......#
#.E.#...#
#..##..G#
#...##..#
#...#...#
#.G...G.#
#.....G.#
#########";

#[test]
fn calibrates_the_first_worked_battle() {
    let scenario = Scenario::parse(CAVERN_27730).expect("scenario parses");
    let mut calibration = Calibration::new();

    let outcome = calibration.calibrate(&scenario);

    assert_eq!(outcome.baseline.score, 27_730);
    assert_eq!(outcome.baseline.victor, Some(Faction::Goblin));
    assert_eq!(outcome.power, AttackPower::new(15));
    assert_eq!(outcome.calibrated.rounds, 29);
    assert_eq!(outcome.calibrated.remaining_health, 172);
    assert_eq!(outcome.calibrated.score, 4_988);
    assert_eq!(outcome.calibrated.elf_losses, 0);
}

#[test]
fn calibrates_the_large_worked_battle() {
    let scenario = Scenario::parse(CAVERN_18740).expect("scenario parses");
    let mut calibration = Calibration::new();

    let outcome = calibration.calibrate(&scenario);

    assert_eq!(outcome.baseline.score, 18_740);
    assert_eq!(outcome.power, AttackPower::new(34));
    assert_eq!(outcome.calibrated.rounds, 30);
    assert_eq!(outcome.calibrated.remaining_health, 38);
    assert_eq!(outcome.calibrated.score, 1_140);
}

#[test]
fn flawless_baseline_reports_identical_battles() {
    // A lone elf-versus-goblin duel: the elf strikes first every round and
    // wins the baseline fight without dying, so no calibration is needed.
    let scenario = Scenario::parse("EG").expect("scenario parses");
    let mut calibration = Calibration::new();

    let outcome = calibration.calibrate(&scenario);

    assert_eq!(outcome.power, BASELINE_ELF_POWER);
    assert_eq!(outcome.baseline, outcome.calibrated);
    assert_eq!(outcome.baseline.rounds, 67);
    assert_eq!(outcome.baseline.remaining_health, 2);
    assert_eq!(outcome.baseline.score, 134);
    assert_eq!(outcome.baseline.victor, Some(Faction::Elf));
}

#[test]
fn rising_power_never_increases_elf_losses() {
    // Two locked melee pairs: at the baseline power both elves fall, and
    // from power four upward both survive. Losses must never rebound as
    // the search walks through successive power values.
    let scenario = Scenario::parse("E..G\n....\n....\nE..G").expect("scenario parses");
    let mut calibration = Calibration::new();

    let mut previous_losses = u32::MAX;
    for power in 3..=8 {
        let report = calibration.attempt(&scenario, AttackPower::new(power));
        assert!(
            report.elf_losses <= previous_losses,
            "losses rose from {previous_losses} at power {power}"
        );
        previous_losses = report.elf_losses;
    }

    let outcome = calibration.calibrate(&scenario);
    assert_eq!(outcome.power, AttackPower::new(4));
    assert_eq!(outcome.baseline.score, 268);
    assert_eq!(outcome.calibrated.rounds, 51);
    assert_eq!(outcome.calibrated.remaining_health, 100);
    assert_eq!(outcome.calibrated.score, 5_100);
}
