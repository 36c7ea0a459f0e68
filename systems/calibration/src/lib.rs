#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Outer search that raises elf power until the elves win without losses.
//!
//! Every attempt deploys a fresh battlefield from the pristine scenario, so
//! no state leaks between power values. The search starts at the baseline
//! power, records that first battle regardless of its outcome, and then
//! keeps raising the power one point at a time until a battle finishes with
//! zero elf losses. There is no upper bound: the search runs until its
//! condition is met.

use serde::{Deserialize, Serialize};
use skirmish_core::{AttackPower, BattleReport, Command, Event, Scenario, BASELINE_ELF_POWER};
use skirmish_system_engagement::Engagement;
use skirmish_world::{self as world, Battlefield};

/// Result of a completed calibration search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationOutcome {
    /// Report of the first battle, fought at the baseline power.
    pub baseline: BattleReport,
    /// Report of the first battle the elves finished without a loss.
    ///
    /// Equals `baseline` when the baseline battle was already flawless.
    pub calibrated: BattleReport,
    /// Elf power that produced the flawless battle.
    pub power: AttackPower,
}

/// Elf-power calibration search.
#[derive(Debug, Default)]
pub struct Calibration {
    engagement: Engagement,
    events: Vec<Event>,
}

impl Calibration {
    /// Creates a new calibration search with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs battles at increasing elf power until the elves take no losses.
    pub fn calibrate(&mut self, scenario: &Scenario) -> CalibrationOutcome {
        let baseline = self.attempt(scenario, BASELINE_ELF_POWER);
        if baseline.flawless_for_elves() {
            return CalibrationOutcome {
                calibrated: baseline.clone(),
                baseline,
                power: BASELINE_ELF_POWER,
            };
        }

        let mut power = BASELINE_ELF_POWER.raised();
        loop {
            let report = self.attempt(scenario, power);
            if report.flawless_for_elves() {
                return CalibrationOutcome {
                    baseline,
                    calibrated: report,
                    power,
                };
            }
            power = power.raised();
        }
    }

    /// Fights one battle at the provided power on a fresh deployment.
    pub fn attempt(&mut self, scenario: &Scenario, power: AttackPower) -> BattleReport {
        let mut battlefield = Battlefield::new();
        self.events.clear();
        world::apply(
            &mut battlefield,
            Command::Deploy {
                scenario: scenario.clone(),
            },
            &mut self.events,
        );
        world::apply(
            &mut battlefield,
            Command::SetElfPower { power },
            &mut self.events,
        );

        let report = self.engagement.resolve(&mut battlefield, &mut self.events);
        tracing::debug!(
            power = power.get(),
            score = report.score,
            elf_losses = report.elf_losses,
            "attempt resolved"
        );
        report
    }
}
