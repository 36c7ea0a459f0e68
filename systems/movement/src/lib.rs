#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that plans single-cell steps toward enemies.
//!
//! For an acting unit the planner answers one question: which adjacent cell,
//! if any, should the unit step onto this turn? The answer is derived from
//! two breadth-first distance fields over open floor: one seeded at the
//! actor, used to pick the nearest open cell adjacent to an enemy, and one
//! seeded at that destination, used to pick the first step. Every tie is
//! broken by reading order (row, then column), so the same battlefield
//! always produces the same step.

use std::collections::VecDeque;

use skirmish_core::{CellCoord, OccupancyView, TerrainView, UnitSnapshot, UnitView};

const UNREACHED: u16 = u16::MAX;

/// Movement planner that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct Movement {
    to_enemy: Vec<u16>,
    from_destination: Vec<u16>,
    frontier: VecDeque<CellCoord>,
    in_range: Vec<CellCoord>,
}

impl Movement {
    /// Creates a new movement planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans the step the acting unit should take this turn, if any.
    ///
    /// Returns `None` when the unit is already adjacent to an enemy, when no
    /// enemy is reachable, or when no enemy remains at all. Both outcomes
    /// are normal turn results, not errors.
    pub fn plan(
        &mut self,
        actor: &UnitSnapshot,
        units: &UnitView,
        terrain: TerrainView<'_>,
        occupancy: OccupancyView<'_>,
    ) -> Option<CellCoord> {
        let (columns, rows) = terrain.dimensions();

        self.in_range.clear();
        let mut enemy_seen = false;
        for unit in units.iter().filter(|unit| unit.faction != actor.faction) {
            enemy_seen = true;
            if unit.cell.is_adjacent_to(actor.cell) {
                return None;
            }

            for neighbor in reading_order_neighbors(unit.cell, columns, rows) {
                if terrain.is_passable(neighbor) && occupancy.is_vacant(neighbor) {
                    self.in_range.push(neighbor);
                }
            }
        }

        if !enemy_seen || self.in_range.is_empty() {
            return None;
        }

        flood(
            &mut self.to_enemy,
            &mut self.frontier,
            actor.cell,
            terrain,
            occupancy,
        );

        let mut destination: Option<(u16, CellCoord)> = None;
        for &cell in &self.in_range {
            let Some(distance) = distance_at(&self.to_enemy, columns, cell) else {
                continue;
            };
            if distance == UNREACHED {
                continue;
            }

            let replace = match destination {
                None => true,
                Some(best) => (distance, cell) < best,
            };
            if replace {
                destination = Some((distance, cell));
            }
        }

        let (_, destination) = destination?;

        flood(
            &mut self.from_destination,
            &mut self.frontier,
            destination,
            terrain,
            occupancy,
        );

        let mut step: Option<(u16, CellCoord)> = None;
        for neighbor in reading_order_neighbors(actor.cell, columns, rows) {
            if !terrain.is_passable(neighbor) || !occupancy.is_vacant(neighbor) {
                continue;
            }
            let Some(distance) = distance_at(&self.from_destination, columns, neighbor) else {
                continue;
            };
            if distance == UNREACHED {
                continue;
            }

            // Strict comparison keeps the earliest neighbor in reading order
            // among those equally close to the destination.
            if step.map_or(true, |(best, _)| distance < best) {
                step = Some((distance, neighbor));
            }
        }

        step.map(|(_, cell)| cell)
    }
}

/// Rebuilds a dense breadth-first distance field seeded at the origin.
///
/// Distances default to `u16::MAX` for cells the search never reaches, so
/// callers can distinguish unreachable floor from visited floor. Walls and
/// occupied cells block expansion; the origin itself is always seeded even
/// though the acting unit stands on it.
fn flood(
    distances: &mut Vec<u16>,
    frontier: &mut VecDeque<CellCoord>,
    origin: CellCoord,
    terrain: TerrainView<'_>,
    occupancy: OccupancyView<'_>,
) {
    let (columns, rows) = terrain.dimensions();
    let cell_count = columns as usize * rows as usize;

    if distances.len() != cell_count {
        *distances = vec![UNREACHED; cell_count];
    } else {
        distances.fill(UNREACHED);
    }

    frontier.clear();
    let Some(origin_index) = index(columns, rows, origin) else {
        return;
    };
    distances[origin_index] = 0;
    frontier.push_back(origin);

    while let Some(cell) = frontier.pop_front() {
        let Some(cell_index) = index(columns, rows, cell) else {
            continue;
        };
        let current = distances[cell_index];
        if current >= UNREACHED.saturating_sub(1) {
            continue;
        }
        let next = current + 1;

        for neighbor in reading_order_neighbors(cell, columns, rows) {
            if !terrain.is_passable(neighbor) || !occupancy.is_vacant(neighbor) {
                continue;
            }
            let Some(neighbor_index) = index(columns, rows, neighbor) else {
                continue;
            };
            if distances[neighbor_index] <= next {
                continue;
            }

            distances[neighbor_index] = next;
            frontier.push_back(neighbor);
        }
    }
}

fn distance_at(distances: &[u16], columns: u32, cell: CellCoord) -> Option<u16> {
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(columns).ok()?;
    distances.get(row.checked_mul(width)?.checked_add(column)?).copied()
}

fn index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(columns).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

/// Enumerates in-bounds cardinal neighbors in reading order: up, left,
/// right, down.
fn reading_order_neighbors(cell: CellCoord, columns: u32, rows: u32) -> NeighborIter {
    let mut neighbors = NeighborIter::default();

    if cell.row() > 0 {
        neighbors.push(CellCoord::new(cell.column(), cell.row() - 1));
    }
    if cell.column() > 0 {
        neighbors.push(CellCoord::new(cell.column() - 1, cell.row()));
    }
    if cell.column() + 1 < columns {
        neighbors.push(CellCoord::new(cell.column() + 1, cell.row()));
    }
    if cell.row() + 1 < rows {
        neighbors.push(CellCoord::new(cell.column(), cell.row() + 1));
    }

    neighbors
}

#[derive(Clone, Debug, Default)]
struct NeighborIter {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{flood, index, reading_order_neighbors, UNREACHED};
    use skirmish_core::{CellCoord, OccupancyView, TerrainView, Tile, UnitId};
    use std::collections::VecDeque;

    #[test]
    fn neighbors_enumerate_in_reading_order() {
        let cells: Vec<CellCoord> = reading_order_neighbors(CellCoord::new(1, 1), 3, 3).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn neighbors_clip_to_grid_bounds() {
        let cells: Vec<CellCoord> = reading_order_neighbors(CellCoord::new(0, 0), 2, 2).collect();
        assert_eq!(cells, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);
    }

    #[test]
    fn flood_measures_distance_from_the_origin() {
        let tiles = vec![Tile::Floor; 9];
        let cells: Vec<Option<UnitId>> = vec![None; 9];
        let terrain = TerrainView::new(&tiles, 3, 3);
        let occupancy = OccupancyView::new(&cells, 3, 3);

        let mut distances = Vec::new();
        let mut frontier = VecDeque::new();
        flood(
            &mut distances,
            &mut frontier,
            CellCoord::new(0, 0),
            terrain,
            occupancy,
        );

        let at = |column, row| {
            distances[index(3, 3, CellCoord::new(column, row)).expect("cell in bounds")]
        };
        assert_eq!(at(0, 0), 0);
        assert_eq!(at(1, 0), 1);
        assert_eq!(at(1, 1), 2);
        assert_eq!(at(2, 2), 4);
    }

    #[test]
    fn flood_stops_at_walls_and_occupied_cells() {
        let mut tiles = vec![Tile::Floor; 9];
        tiles[index(3, 3, CellCoord::new(1, 0)).expect("cell in bounds")] = Tile::Wall;
        let mut cells: Vec<Option<UnitId>> = vec![None; 9];
        cells[index(3, 3, CellCoord::new(1, 1)).expect("cell in bounds")] = Some(UnitId::new(7));
        let terrain = TerrainView::new(&tiles, 3, 3);
        let occupancy = OccupancyView::new(&cells, 3, 3);

        let mut distances = Vec::new();
        let mut frontier = VecDeque::new();
        flood(
            &mut distances,
            &mut frontier,
            CellCoord::new(0, 0),
            terrain,
            occupancy,
        );

        let at = |column, row| {
            distances[index(3, 3, CellCoord::new(column, row)).expect("cell in bounds")]
        };
        assert_eq!(at(1, 0), UNREACHED);
        assert_eq!(at(1, 1), UNREACHED);
        // The detour around the blocked column.
        assert_eq!(at(2, 0), 6);
    }
}
