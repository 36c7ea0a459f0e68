#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle loop that resolves one deployment to its end condition.
//!
//! Each round re-sorts the living units into reading order and gives every
//! unit one turn: an end-of-battle check, a single-cell move toward the
//! nearest reachable enemy, and a strike against the weakest adjacent
//! enemy. The battle ends the instant an acting unit finds no living
//! enemies anywhere, even mid-round; that partial round does not count
//! toward the score. Factions that cannot reach each other never trigger
//! the end condition, so such a battle runs forever by design of the rules.

use skirmish_core::{BattleReport, Command, Event, Faction, UnitSnapshot};
use skirmish_system_combat::Combat;
use skirmish_system_movement::Movement;
use skirmish_world::{self as world, query, Battlefield};

/// Battle loop driver owning the movement and combat systems.
#[derive(Debug, Default)]
pub struct Engagement {
    movement: Movement,
    combat: Combat,
    order: Vec<UnitSnapshot>,
}

impl Engagement {
    /// Creates a new battle loop with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the deployed battle, appending every event to `out_events`.
    ///
    /// The returned report captures the completed round count, the summed
    /// health of the survivors, and the per-faction losses the calibration
    /// search keys on.
    pub fn resolve(&mut self, world: &mut Battlefield, out_events: &mut Vec<Event>) -> BattleReport {
        let elves_at_start = query::living_count(world, Faction::Elf);
        let goblins_at_start = query::living_count(world, Faction::Goblin);
        let mut rounds = 0u32;

        loop {
            // Turn order is recomputed every round because the previous
            // round moved units around.
            self.order.clear();
            self.order
                .extend(query::unit_view(world).iter().copied());
            self.order.sort_by_key(|snapshot| snapshot.cell);

            if self.order.is_empty() {
                return finish(world, rounds, elves_at_start, goblins_at_start);
            }

            for index in 0..self.order.len() {
                let scheduled = self.order[index];

                // Units felled earlier in the round lose their turn.
                let Some(actor) = query::unit(world, scheduled.id) else {
                    continue;
                };

                if query::living_count(world, actor.faction.foe()) == 0 {
                    return finish(world, rounds, elves_at_start, goblins_at_start);
                }

                let view = query::unit_view(world);
                let planned = self.movement.plan(
                    &actor,
                    &view,
                    query::terrain_view(world),
                    query::occupancy_view(world),
                );
                if let Some(to) = planned {
                    world::apply(
                        world,
                        Command::MoveUnit {
                            unit: actor.id,
                            to,
                        },
                        out_events,
                    );
                }

                let Some(actor) = query::unit(world, scheduled.id) else {
                    continue;
                };
                let view = query::unit_view(world);
                if let Some(target) = self.combat.select(&actor, &view, query::occupancy_view(world))
                {
                    world::apply(
                        world,
                        Command::Strike {
                            attacker: actor.id,
                            target,
                        },
                        out_events,
                    );
                }
            }

            rounds = rounds.saturating_add(1);
            tracing::trace!(
                rounds,
                remaining = query::remaining_health(world),
                "round complete"
            );
        }
    }
}

fn finish(
    world: &Battlefield,
    rounds: u32,
    elves_at_start: u32,
    goblins_at_start: u32,
) -> BattleReport {
    let elves = query::living_count(world, Faction::Elf);
    let goblins = query::living_count(world, Faction::Goblin);

    let victor = if elves > 0 && goblins == 0 {
        Some(Faction::Elf)
    } else if goblins > 0 && elves == 0 {
        Some(Faction::Goblin)
    } else {
        None
    };

    let report = BattleReport::new(
        victor,
        rounds,
        query::remaining_health(world),
        elves_at_start - elves,
        goblins_at_start - goblins,
    );
    tracing::debug!(
        rounds = report.rounds,
        score = report.score,
        victor = ?report.victor,
        "battle ended"
    );
    report
}
