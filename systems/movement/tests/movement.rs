use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{CellCoord, Command, Scenario, UnitId};
use skirmish_system_movement::Movement;
use skirmish_world::{self as world, query, Battlefield};

#[test]
fn steps_directly_toward_the_only_enemy() {
    let world = battlefield("E...G");
    let mut movement = Movement::new();

    let step = plan_for(&world, &mut movement, UnitId::new(0));

    assert_eq!(step, Some(CellCoord::new(1, 0)));
}

#[test]
fn stays_put_when_an_enemy_is_already_adjacent() {
    let world = battlefield("EG");
    let mut movement = Movement::new();

    assert_eq!(plan_for(&world, &mut movement, UnitId::new(0)), None);
    assert_eq!(plan_for(&world, &mut movement, UnitId::new(1)), None);
}

#[test]
fn stays_put_when_every_enemy_is_walled_off() {
    let world = battlefield("E.#.G");
    let mut movement = Movement::new();

    assert_eq!(plan_for(&world, &mut movement, UnitId::new(0)), None);
}

#[test]
fn stays_put_when_no_open_cell_borders_any_enemy() {
    let world = battlefield("#G#\n#E#\n#E#");
    let mut movement = Movement::new();

    // The bottom elf cannot reach the goblin: its ally blocks the only
    // cell from which the goblin could be engaged.
    assert_eq!(plan_for(&world, &mut movement, UnitId::new(2)), None);
}

#[test]
fn destination_ties_resolve_by_reading_order() {
    // Both goblins are equally near; the contested cell between them on the
    // top row precedes every other candidate in reading order.
    let world = battlefield("G.G\n...\n.E.");
    let mut movement = Movement::new();

    let step = plan_for(&world, &mut movement, UnitId::new(2));

    assert_eq!(step, Some(CellCoord::new(1, 1)));
}

#[test]
fn step_ties_resolve_by_reading_order() {
    // Two shortest paths leave the elf: up first or left first. The upward
    // step sits on the earlier row, so it wins.
    let world = battlefield("G..\n...\n..E");
    let mut movement = Movement::new();

    let step = plan_for(&world, &mut movement, UnitId::new(1));

    assert_eq!(step, Some(CellCoord::new(2, 1)));
}

#[test]
fn planned_steps_approach_the_enemy_on_open_ground() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x51_6b_69_72);
    let mut movement = Movement::new();

    for _ in 0..64 {
        let elf = random_cell(&mut rng, 6, 6);
        let goblin = loop {
            let cell = random_cell(&mut rng, 6, 6);
            if cell != elf {
                break cell;
            }
        };

        let world = battlefield(&open_grid(6, 6, elf, goblin));
        let view = query::unit_view(&world);
        let actor = *view
            .iter()
            .find(|unit| unit.cell == elf)
            .expect("elf deployed");

        let step = movement.plan(
            &actor,
            &view,
            query::terrain_view(&world),
            query::occupancy_view(&world),
        );

        if elf.is_adjacent_to(goblin) {
            assert_eq!(step, None, "adjacent elf at {elf:?} should hold still");
        } else {
            let step = step.expect("open ground always offers a step");
            assert_eq!(
                step.manhattan_distance(goblin),
                elf.manhattan_distance(goblin) - 1,
                "step from {elf:?} toward {goblin:?} must close the gap"
            );
        }
    }
}

fn battlefield(text: &str) -> Battlefield {
    let scenario = Scenario::parse(text).expect("scenario parses");
    let mut world = Battlefield::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::Deploy { scenario }, &mut events);
    world
}

fn plan_for(world: &Battlefield, movement: &mut Movement, unit: UnitId) -> Option<CellCoord> {
    let view = query::unit_view(world);
    let actor = *view.snapshot(unit).expect("acting unit is alive");
    movement.plan(
        &actor,
        &view,
        query::terrain_view(world),
        query::occupancy_view(world),
    )
}

fn random_cell(rng: &mut ChaCha8Rng, columns: u32, rows: u32) -> CellCoord {
    CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows))
}

fn open_grid(columns: u32, rows: u32, elf: CellCoord, goblin: CellCoord) -> String {
    let mut lines = Vec::new();
    for row in 0..rows {
        let mut line = String::new();
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            if cell == elf {
                line.push('E');
            } else if cell == goblin {
                line.push('G');
            } else {
                line.push('.');
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}
