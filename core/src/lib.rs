#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the skirmish engine.
//!
//! This crate defines the message surface that connects the adapter, the
//! authoritative battlefield, and the pure systems. The adapter and the
//! battle loop submit [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values describing what actually happened. Systems
//! consume immutable snapshot views and respond exclusively with new
//! commands, which keeps every battle bit-for-bit reproducible.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hit points assigned to every unit when a scenario deploys.
pub const STARTING_HEALTH: Health = Health::new(200);

/// Damage dealt per strike by goblins, fixed for every battle.
pub const GOBLIN_ATTACK_POWER: AttackPower = AttackPower::new(3);

/// Damage dealt per strike by elves before calibration raises it.
pub const BASELINE_ELF_POWER: AttackPower = AttackPower::new(3);

/// Commands that express all permissible battlefield mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the battlefield from the provided scenario blueprint.
    ///
    /// Terrain, the unit table, and the occupancy grid are replaced
    /// wholesale and elf power resets to [`BASELINE_ELF_POWER`], so each
    /// deployment is an independent copy of the pristine scenario.
    Deploy {
        /// Blueprint describing terrain and starting unit positions.
        scenario: Scenario,
    },
    /// Updates the damage dealt by the elf faction for this battle.
    SetElfPower {
        /// Damage applied by every subsequent elf strike.
        power: AttackPower,
    },
    /// Requests that a unit advance a single step onto an adjacent cell.
    MoveUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
        /// Destination cell, which must be an adjacent vacant floor cell.
        to: CellCoord,
    },
    /// Requests a melee strike against an adjacent enemy.
    Strike {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the adjacent enemy receiving the blow.
        target: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a scenario was deployed onto the battlefield.
    Deployed {
        /// Number of grid columns in the deployed terrain.
        columns: u32,
        /// Number of grid rows in the deployed terrain.
        rows: u32,
        /// Number of units mustered from the scenario scan.
        units: u32,
    },
    /// Confirms that the elf faction's strike damage changed.
    ElfPowerSet {
        /// Damage applied by every subsequent elf strike.
        power: AttackPower,
    },
    /// Confirms that a unit stepped between two cells.
    UnitMoved {
        /// Identifier of the unit that advanced.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after completing the step.
        to: CellCoord,
    },
    /// Confirms that a strike landed on an adjacent enemy.
    UnitStruck {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit that received the blow.
        target: UnitId,
        /// Damage subtracted from the target's health.
        damage: AttackPower,
        /// Health the target retains after the strike.
        remaining: Health,
    },
    /// Announces that a unit's health was depleted and its cell vacated.
    UnitFelled {
        /// Identifier of the unit removed from combat.
        unit: UnitId,
        /// Faction the fallen unit belonged to.
        faction: Faction,
        /// Cell the unit occupied at the moment it fell.
        cell: CellCoord,
    },
}

/// One of the two opposing unit classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Units marked `E` in scenario text; their power is calibrated.
    Elf,
    /// Units marked `G` in scenario text; their power is fixed.
    Goblin,
}

impl Faction {
    /// Returns the opposing faction.
    #[must_use]
    pub const fn foe(self) -> Faction {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Glyph that represents the faction in scenario text.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Elf => 'E',
            Self::Goblin => 'G',
        }
    }
}

/// Unique identifier assigned to a unit.
///
/// Identifiers index the world's unit table and stay stable for the whole
/// battle; a fallen unit's identifier is never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Cells compare by reading order: row ascending, then column ascending.
/// Turn order, movement tie-breaks, and attack tie-breaks all rely on this
/// ordering, so it is written out explicitly rather than derived from the
/// field layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the other cell shares an edge with this one.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.column).cmp(&(other.row, other.column))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hit points carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the health left after absorbing a strike.
    ///
    /// Damage saturates at zero; overkill never underflows.
    #[must_use]
    pub const fn damaged(self, damage: AttackPower) -> Health {
        Health(self.0.saturating_sub(damage.get()))
    }

    /// Reports whether the unit's hit points are exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Damage applied by a single melee strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackPower(u32);

impl AttackPower {
    /// Creates a new attack power value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the damage dealt per strike.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the next power value tried by the calibration search.
    #[must_use]
    pub const fn raised(self) -> AttackPower {
        AttackPower(self.0.saturating_add(1))
    }
}

/// Terrain occupying a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Impassable cell; units never enter or search through it.
    Wall,
    /// Open cavern floor that units traverse and fight over.
    Floor,
}

impl Tile {
    /// Reports whether units may stand on the tile.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Floor)
    }
}

/// Resolved contents of a single cell: terrain plus any occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// The cell is impassable terrain.
    Wall,
    /// The cell is open floor with no unit standing on it.
    Floor,
    /// The cell is floor occupied by the referenced living unit.
    Occupied(UnitId),
}

/// Immutable representation of a single living unit used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Grid cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Hit points the unit has left.
    pub health: Health,
}

/// Read-only snapshot describing all living units on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided unit, if it is alive.
    #[must_use]
    pub fn snapshot(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&unit, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of living units of the provided faction.
    #[must_use]
    pub fn count_of(&self, faction: Faction) -> u32 {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.faction == faction)
            .count() as u32
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<UnitId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<UnitId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the unit occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies in bounds and holds no unit.
    #[must_use]
    pub fn is_vacant(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| {
            self.cells.get(index).copied().unwrap_or(None).is_none()
        })
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Read-only view into the battlefield terrain.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    tiles: &'a [Tile],
    columns: u32,
    rows: u32,
}

impl<'a> TerrainView<'a> {
    /// Captures a new terrain view backed by the provided tile slice.
    #[must_use]
    pub fn new(tiles: &'a [Tile], columns: u32, rows: u32) -> Self {
        Self {
            tiles,
            columns,
            rows,
        }
    }

    /// Returns the tile stored at the provided cell, if it lies in bounds.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        self.tiles.get(row * width + column).copied()
    }

    /// Reports whether units may stand on the provided cell.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.tile(cell).map_or(false, Tile::is_passable)
    }

    /// Provides the dimensions of the underlying terrain grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Starting position recorded for a single unit during the scenario scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSeed {
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Cell the unit occupies when the scenario deploys.
    pub cell: CellCoord,
}

/// Immutable blueprint describing terrain and starting unit positions.
///
/// A scenario is parsed once from text and never mutated; every deployment
/// copies it onto a fresh battlefield, which gives the calibration search
/// its independent, fully isolated attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    units: Vec<UnitSeed>,
}

impl Scenario {
    /// Parses a scenario from rows of `#`, `.`, `E`, and `G` glyphs.
    ///
    /// The grid must be rectangular; its dimensions are derived from the
    /// text. Unit glyphs contribute a floor tile plus a [`UnitSeed`]
    /// recorded in reading order.
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let mut columns = 0u32;
        let mut rows = 0u32;
        let mut tiles = Vec::new();
        let mut units = Vec::new();

        for (row_index, line) in text.lines().enumerate() {
            let line = line.trim_end();
            let row = row_index as u32;
            let mut width = 0u32;

            for (column_index, glyph) in line.chars().enumerate() {
                let cell = CellCoord::new(column_index as u32, row);
                let tile = match glyph {
                    '#' => Tile::Wall,
                    '.' => Tile::Floor,
                    'E' | 'G' => {
                        let faction = if glyph == 'E' {
                            Faction::Elf
                        } else {
                            Faction::Goblin
                        };
                        units.push(UnitSeed { faction, cell });
                        Tile::Floor
                    }
                    _ => {
                        return Err(ScenarioError::UnknownGlyph {
                            glyph,
                            column: column_index as u32,
                            row,
                        })
                    }
                };
                tiles.push(tile);
                width += 1;
            }

            if row == 0 {
                columns = width;
            } else if width != columns {
                return Err(ScenarioError::RaggedRow {
                    row,
                    expected: columns,
                    found: width,
                });
            }

            rows += 1;
        }

        if columns == 0 || rows == 0 {
            return Err(ScenarioError::Empty);
        }

        Ok(Self {
            columns,
            rows,
            tiles,
            units,
        })
    }

    /// Number of grid columns described by the scenario.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of grid rows described by the scenario.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Terrain tiles stored in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Starting unit positions in reading order of the scan.
    #[must_use]
    pub fn units(&self) -> &[UnitSeed] {
        &self.units
    }

    /// Renders the scenario back into rows of glyphs.
    ///
    /// Parsing the joined rows reproduces an equal scenario, which is what
    /// the transfer encoding relies on.
    #[must_use]
    pub fn glyph_rows(&self) -> Vec<String> {
        let width = self.columns as usize;
        let mut grid: Vec<Vec<char>> = self
            .tiles
            .chunks(width)
            .map(|row| {
                row.iter()
                    .map(|tile| match tile {
                        Tile::Wall => '#',
                        Tile::Floor => '.',
                    })
                    .collect()
            })
            .collect();

        for seed in &self.units {
            let row = seed.cell.row() as usize;
            let column = seed.cell.column() as usize;
            grid[row][column] = seed.faction.glyph();
        }

        grid.into_iter()
            .map(|row| row.into_iter().collect())
            .collect()
    }
}

/// Reasons scenario text fails validation.
///
/// Malformed input is a fatal error; there is no partial deployment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The scenario text contained no rows.
    #[error("scenario text contains no rows")]
    Empty,
    /// A row's width did not match the first row's width.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width actually found on the offending row.
        found: u32,
    },
    /// The scenario text contained a glyph outside `#`, `.`, `E`, `G`.
    #[error("unknown glyph '{glyph}' at column {column}, row {row}")]
    UnknownGlyph {
        /// The unrecognised character.
        glyph: char,
        /// Zero-based column of the character.
        column: u32,
        /// Zero-based row of the character.
        row: u32,
    },
}

/// Outcome of a single battle resolved to completion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Faction with living units when the battle ended, if any.
    pub victor: Option<Faction>,
    /// Number of full rounds completed before the end condition fired.
    ///
    /// The round in which combat ends is not counted unless every unit had
    /// already taken its turn.
    pub rounds: u32,
    /// Summed hit points of all units alive at the moment the battle ended.
    pub remaining_health: u32,
    /// Battle score: completed rounds multiplied by remaining health.
    pub score: u64,
    /// Number of elves that fell during the battle.
    pub elf_losses: u32,
    /// Number of goblins that fell during the battle.
    pub goblin_losses: u32,
}

impl BattleReport {
    /// Assembles a report, deriving the score from rounds and health.
    #[must_use]
    pub fn new(
        victor: Option<Faction>,
        rounds: u32,
        remaining_health: u32,
        elf_losses: u32,
        goblin_losses: u32,
    ) -> Self {
        Self {
            victor,
            rounds,
            remaining_health,
            score: u64::from(rounds) * u64::from(remaining_health),
            elf_losses,
            goblin_losses,
        }
    }

    /// Reports whether the elf faction finished without a single loss.
    #[must_use]
    pub const fn flawless_for_elves(&self) -> bool {
        self.elf_losses == 0
    }
}
