#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects deterministic melee targets.
//!
//! After a unit finishes its move it strikes the adjacent enemy with the
//! fewest hit points; equal health resolves by reading order of the enemy's
//! cell. The comparison is explicit so target choice never depends on the
//! order units happen to be stored in.

use skirmish_core::{CellCoord, Health, OccupancyView, UnitId, UnitSnapshot, UnitView};

/// Melee target selector.
#[derive(Debug, Default)]
pub struct Combat;

impl Combat {
    /// Creates a new target selector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Selects the adjacent enemy the acting unit should strike, if any.
    pub fn select(
        &self,
        actor: &UnitSnapshot,
        units: &UnitView,
        occupancy: OccupancyView<'_>,
    ) -> Option<UnitId> {
        let mut best: Option<TargetCandidate> = None;

        for neighbor in adjacent_cells(actor.cell, occupancy) {
            let Some(occupant) = occupancy.occupant(neighbor) else {
                continue;
            };
            let Some(snapshot) = units.snapshot(occupant) else {
                continue;
            };
            if snapshot.faction == actor.faction {
                continue;
            }

            let candidate = TargetCandidate {
                health: snapshot.health,
                cell: neighbor,
                unit: occupant,
            };

            best = Some(match best {
                None => candidate,
                Some(existing) => {
                    if candidate.precedes(&existing) {
                        candidate
                    } else {
                        existing
                    }
                }
            });
        }

        best.map(|candidate| candidate.unit)
    }
}

#[derive(Clone, Copy, Debug)]
struct TargetCandidate {
    health: Health,
    cell: CellCoord,
    unit: UnitId,
}

impl TargetCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.health != other.health {
            return self.health < other.health;
        }

        self.cell < other.cell
    }
}

fn adjacent_cells(cell: CellCoord, occupancy: OccupancyView<'_>) -> impl Iterator<Item = CellCoord> {
    let (columns, rows) = occupancy.dimensions();
    let mut candidates = [None; 4];
    let mut count = 0;

    if cell.row() > 0 {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() - 1));
        count += 1;
    }
    if cell.column() > 0 {
        candidates[count] = Some(CellCoord::new(cell.column() - 1, cell.row()));
        count += 1;
    }
    if cell.column() + 1 < columns {
        candidates[count] = Some(CellCoord::new(cell.column() + 1, cell.row()));
        count += 1;
    }
    if cell.row() + 1 < rows {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() + 1));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
