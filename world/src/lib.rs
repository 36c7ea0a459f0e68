#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state management for the skirmish engine.
//!
//! The [`Battlefield`] owns the terrain grid, the unit table, and the dense
//! occupancy grid. All mutation flows through [`apply`], which validates
//! each command against the current state and broadcasts events for the
//! mutations that actually happened. Invalid movement and strike requests
//! are dropped silently: "no valid target" is a normal outcome of a turn,
//! not an error.

use skirmish_core::{
    AttackPower, CellCoord, Command, Event, Faction, Health, Scenario, Tile, UnitId, UnitSnapshot,
    BASELINE_ELF_POWER, GOBLIN_ATTACK_POWER, STARTING_HEALTH,
};

/// Represents the authoritative state of one battle.
#[derive(Clone, Debug)]
pub struct Battlefield {
    columns: u32,
    rows: u32,
    terrain: Vec<Tile>,
    units: Vec<Unit>,
    occupancy: OccupancyGrid,
    elf_power: AttackPower,
}

impl Battlefield {
    /// Creates an empty battlefield awaiting a [`Command::Deploy`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: 0,
            rows: 0,
            terrain: Vec::new(),
            units: Vec::new(),
            occupancy: OccupancyGrid::new(0, 0),
            elf_power: BASELINE_ELF_POWER,
        }
    }

    fn deploy(&mut self, scenario: &Scenario) {
        self.columns = scenario.columns();
        self.rows = scenario.rows();
        self.terrain = scenario.tiles().to_vec();
        self.units = scenario
            .units()
            .iter()
            .enumerate()
            .map(|(index, seed)| Unit {
                id: UnitId::new(index as u32),
                faction: seed.faction,
                cell: seed.cell,
                health: STARTING_HEALTH,
            })
            .collect();
        self.occupancy = OccupancyGrid::new(self.columns, self.rows);
        self.occupancy.fill_with(&self.units);
        self.elf_power = BASELINE_ELF_POWER;
    }

    fn unit(&self, id: UnitId) -> Option<&Unit> {
        let index = usize::try_from(id.get()).ok()?;
        self.units.get(index).filter(|unit| unit.id == id)
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        let index = usize::try_from(id.get()).ok()?;
        self.units.get_mut(index).filter(|unit| unit.id == id)
    }

    fn attack_power_of(&self, faction: Faction) -> AttackPower {
        match faction {
            Faction::Elf => self.elf_power,
            Faction::Goblin => GOBLIN_ATTACK_POWER,
        }
    }

    fn is_passable(&self, cell: CellCoord) -> bool {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return false;
        }

        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.terrain
            .get(index)
            .map_or(false, |tile| tile.is_passable())
    }

    fn move_unit(&mut self, id: UnitId, to: CellCoord, out_events: &mut Vec<Event>) {
        let Some(unit) = self.unit(id) else {
            return;
        };

        if unit.health.is_depleted() {
            return;
        }

        let from = unit.cell;
        if !from.is_adjacent_to(to) {
            return;
        }

        if !self.is_passable(to) || !self.occupancy.can_enter(to) {
            return;
        }

        self.occupancy.vacate(from);
        self.occupancy.occupy(id, to);
        if let Some(unit) = self.unit_mut(id) {
            unit.cell = to;
        }
        out_events.push(Event::UnitMoved { unit: id, from, to });
    }

    fn strike(&mut self, attacker: UnitId, target: UnitId, out_events: &mut Vec<Event>) {
        let Some(attacking) = self.unit(attacker) else {
            return;
        };
        if attacking.health.is_depleted() {
            return;
        }
        let attacker_faction = attacking.faction;
        let attacker_cell = attacking.cell;

        let Some(defending) = self.unit(target) else {
            return;
        };
        if defending.health.is_depleted()
            || defending.faction == attacker_faction
            || !defending.cell.is_adjacent_to(attacker_cell)
        {
            return;
        }

        let damage = self.attack_power_of(attacker_faction);
        let fallen_cell = defending.cell;
        let fallen_faction = defending.faction;

        let remaining = {
            let Some(defending) = self.unit_mut(target) else {
                return;
            };
            defending.health = defending.health.damaged(damage);
            defending.health
        };

        out_events.push(Event::UnitStruck {
            attacker,
            target,
            damage,
            remaining,
        });

        if remaining.is_depleted() {
            // The cell opens up immediately so later actors this round can
            // path through it and no longer target the fallen unit.
            self.occupancy.vacate(fallen_cell);
            out_events.push(Event::UnitFelled {
                unit: target,
                faction: fallen_faction,
                cell: fallen_cell,
            });
        }
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the battlefield, mutating state deterministically.
pub fn apply(world: &mut Battlefield, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Deploy { scenario } => {
            world.deploy(&scenario);
            out_events.push(Event::Deployed {
                columns: world.columns,
                rows: world.rows,
                units: world.units.len() as u32,
            });
        }
        Command::SetElfPower { power } => {
            world.elf_power = power;
            out_events.push(Event::ElfPowerSet { power });
        }
        Command::MoveUnit { unit, to } => {
            world.move_unit(unit, to, out_events);
        }
        Command::Strike { attacker, target } => {
            world.strike(attacker, target, out_events);
        }
    }
}

/// Query functions that provide read-only access to the battlefield state.
pub mod query {
    use super::Battlefield;
    use skirmish_core::{
        AttackPower, CellCoord, CellState, Faction, OccupancyView, TerrainView, UnitId,
        UnitSnapshot, UnitView,
    };

    /// Captures a read-only view of all living units.
    #[must_use]
    pub fn unit_view(world: &Battlefield) -> UnitView {
        let snapshots: Vec<UnitSnapshot> = world
            .units
            .iter()
            .filter(|unit| !unit.health.is_depleted())
            .map(|unit| unit.snapshot())
            .collect();
        UnitView::from_snapshots(snapshots)
    }

    /// Retrieves the snapshot of a single unit, if it is still alive.
    #[must_use]
    pub fn unit(world: &Battlefield, id: UnitId) -> Option<UnitSnapshot> {
        world
            .unit(id)
            .filter(|unit| !unit.health.is_depleted())
            .map(|unit| unit.snapshot())
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &Battlefield) -> OccupancyView<'_> {
        OccupancyView::new(world.occupancy.cells(), world.columns, world.rows)
    }

    /// Exposes a read-only view of the battlefield terrain.
    #[must_use]
    pub fn terrain_view(world: &Battlefield) -> TerrainView<'_> {
        TerrainView::new(&world.terrain, world.columns, world.rows)
    }

    /// Resolves the contents of a single cell, if it lies in bounds.
    #[must_use]
    pub fn cell_state(world: &Battlefield, cell: CellCoord) -> Option<CellState> {
        if cell.column() >= world.columns || cell.row() >= world.rows {
            return None;
        }

        if !world.is_passable(cell) {
            return Some(CellState::Wall);
        }

        match occupancy_view(world).occupant(cell) {
            Some(unit) => Some(CellState::Occupied(unit)),
            None => Some(CellState::Floor),
        }
    }

    /// Damage currently applied by elf strikes.
    #[must_use]
    pub fn elf_power(world: &Battlefield) -> AttackPower {
        world.elf_power
    }

    /// Number of living units fighting for the provided faction.
    #[must_use]
    pub fn living_count(world: &Battlefield, faction: Faction) -> u32 {
        world
            .units
            .iter()
            .filter(|unit| unit.faction == faction && !unit.health.is_depleted())
            .count() as u32
    }

    /// Summed hit points of every living unit on the battlefield.
    #[must_use]
    pub fn remaining_health(world: &Battlefield) -> u32 {
        world
            .units
            .iter()
            .filter(|unit| !unit.health.is_depleted())
            .map(|unit| unit.health.get())
            .sum()
    }

    /// Provides the dimensions of the battlefield grid.
    #[must_use]
    pub fn dimensions(world: &Battlefield) -> (u32, u32) {
        (world.columns, world.rows)
    }
}

#[derive(Clone, Copy, Debug)]
struct Unit {
    id: UnitId,
    faction: Faction,
    cell: CellCoord,
    health: Health,
}

impl Unit {
    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            faction: self.faction,
            cell: self.cell,
            health: self.health,
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    fn fill_with(&mut self, units: &[Unit]) {
        self.cells.fill(None);
        for unit in units {
            if let Some(index) = self.index(unit.cell) {
                self.cells[index] = Some(unit.id);
            }
        }
    }

    fn can_enter(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| {
            self.cells.get(index).copied().unwrap_or(None).is_none()
        })
    }

    fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(unit);
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
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

    fn cells(&self) -> &[Option<UnitId>] {
        &self.cells
    }
}
