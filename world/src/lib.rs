#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative dungeon level state for the cavefall effects engine.

use std::collections::BTreeMap;

use cavefall_core::{
    CellCoord, CellFlags, Command, CommandError, Condition, CreatureId, Dice, Event, FloorItem,
    OccupantId, Race, TerrainKind, ALERTNESS_MAX, ALERTNESS_MIN, MAX_SIGHT,
};

pub mod chance;
pub mod combat;
pub mod marking;
pub mod sight;

/// Represents the authoritative state of one dungeon level.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    depth: u32,
    player: Option<Player>,
    creatures: BTreeMap<CreatureId, Creature>,
    next_creature: u32,
    target: Option<CellCoord>,
}

impl World {
    /// Creates a new world with an empty grid on the surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(0, 0),
            depth: 0,
            player: None,
            creatures: BTreeMap::new(),
            next_creature: 0,
            target: None,
        }
    }

    fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.grid.index(cell).and_then(|index| self.grid.cells.get(index))
    }

    fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        self.grid
            .index(cell)
            .and_then(|index| self.grid.cells.get_mut(index))
    }

    fn occupant_at(&self, cell: CellCoord) -> Option<OccupantId> {
        self.cell(cell).and_then(|cell| cell.occupant)
    }

    fn can_stand_on(&self, cell: CellCoord) -> Result<(), CommandError> {
        let Some(slot) = self.cell(cell) else {
            return Err(CommandError::OutOfBounds);
        };
        if !slot.terrain.is_passable() {
            return Err(CommandError::Impassable);
        }
        if slot.occupant.is_some() {
            return Err(CommandError::Occupied);
        }
        Ok(())
    }

    fn set_position(&mut self, occupant: OccupantId, cell: CellCoord) {
        match occupant {
            OccupantId::Player => {
                if let Some(player) = self.player.as_mut() {
                    player.cell = cell;
                }
            }
            OccupantId::Creature(id) => {
                if let Some(creature) = self.creatures.get_mut(&id) {
                    creature.cell = cell;
                }
            }
        }
    }

    fn refresh_view(&mut self) {
        let player_cell = self.player.as_ref().map(|player| player.cell);
        let mut visible = Vec::new();
        if let Some(origin) = player_cell {
            for row in 0..self.grid.rows {
                for column in 0..self.grid.columns {
                    let cell = CellCoord::new(row, column);
                    if origin.distance(cell) <= MAX_SIGHT && sight::los(self, origin, cell) {
                        visible.push(cell);
                    }
                }
            }
        }

        for cell in &mut self.grid.cells {
            cell.flags.remove(CellFlags::VIEW);
        }

        for cell in visible {
            let adjacent = player_cell.map_or(false, |origin| origin.chebyshev_distance(cell) <= 1);
            if let Some(slot) = self.cell_mut(cell) {
                slot.flags.insert(CellFlags::VIEW);
                if adjacent || slot.flags.contains(CellFlags::LIT) {
                    slot.flags.insert(CellFlags::SEEN);
                }
            }
        }

        let grid = &self.grid;
        for creature in self.creatures.values_mut() {
            creature.visible = grid
                .index(creature.cell)
                .and_then(|index| grid.cells.get(index))
                .map_or(false, |cell| cell.flags.contains(CellFlags::VIEW));
        }
    }

    fn remove_creature(&mut self, id: CreatureId) -> Option<Creature> {
        let creature = self.creatures.remove(&id)?;
        if let Some(slot) = self.cell_mut(creature.cell) {
            if slot.occupant == Some(OccupantId::Creature(id)) {
                slot.occupant = None;
            }
        }
        Some(creature)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { rows, columns } => {
            world.grid = Grid::new(rows, columns);
            world.player = None;
            world.creatures.clear();
            world.target = None;
            out_events.push(Event::GridConfigured { rows, columns });
        }
        Command::SetDepth { depth } => {
            world.depth = depth;
            out_events.push(Event::DepthChanged { depth });
        }
        Command::SetTerrain { cell, terrain } => {
            let Some(slot) = world.cell_mut(cell) else {
                reject(out_events, CommandError::OutOfBounds);
                return;
            };
            let from = slot.terrain;
            if from == terrain {
                return;
            }
            slot.terrain = terrain;
            out_events.push(Event::TerrainChanged {
                cell,
                from,
                to: terrain,
            });
            out_events.push(Event::CellRedrawn { cell });
        }
        Command::SetCellFlags {
            cell,
            mut flags,
            enabled,
        } => {
            flags.remove(CellFlags::MARKED | CellFlags::VIEW);
            let Some(slot) = world.cell_mut(cell) else {
                reject(out_events, CommandError::OutOfBounds);
                return;
            };
            let before = slot.flags;
            slot.flags.set(flags, enabled);
            if slot.flags != before {
                out_events.push(Event::CellRedrawn { cell });
            }
        }
        Command::PlacePlayer {
            cell,
            health,
            protection,
        } => {
            let previous = world.player.as_ref().map(|player| player.cell);
            if previous != Some(cell) {
                if let Err(reason) = world.can_stand_on(cell) {
                    reject(out_events, reason);
                    return;
                }
            }
            if let Some(previous) = previous {
                if let Some(slot) = world.cell_mut(previous) {
                    slot.occupant = None;
                }
            }
            world.player = Some(Player::new(cell, health, protection));
            if let Some(slot) = world.cell_mut(cell) {
                slot.occupant = Some(OccupantId::Player);
            }
            world.refresh_view();
            out_events.push(Event::PlayerPlaced { cell });
        }
        Command::SpawnCreature {
            race,
            cell,
            health,
            alertness,
        } => {
            if let Err(reason) = world.can_stand_on(cell) {
                reject(out_events, reason);
                return;
            }
            let id = CreatureId::new(world.next_creature);
            world.next_creature = world.next_creature.saturating_add(1);
            let visible = world
                .cell(cell)
                .map_or(false, |slot| slot.flags.contains(CellFlags::VIEW));
            let mut creature = Creature::new(id, race, cell, health, alertness);
            creature.visible = visible;
            let _ = world.creatures.insert(id, creature);
            if let Some(slot) = world.cell_mut(cell) {
                slot.occupant = Some(OccupantId::Creature(id));
            }
            out_events.push(Event::CreatureSpawned { creature: id, cell });
        }
        Command::RemoveCreature { creature } => {
            if world.remove_creature(creature).is_some() {
                out_events.push(Event::CreatureRemoved { creature });
            } else {
                reject(out_events, CommandError::UnknownCreature);
            }
        }
        Command::PlaceItem { cell, item } => {
            let Some(slot) = world.cell_mut(cell) else {
                reject(out_events, CommandError::OutOfBounds);
                return;
            };
            slot.item = Some(item);
            out_events.push(Event::ItemPlaced { cell });
        }
        Command::DestroyItem { cell } => {
            if let Some(item) = world.cell_mut(cell).and_then(|slot| slot.item.take()) {
                out_events.push(Event::ItemDestroyed {
                    cell,
                    name: item.name,
                });
                out_events.push(Event::CellRedrawn { cell });
            }
        }
        Command::SetTarget { target } => {
            world.target = target;
            out_events.push(Event::TargetChanged { target });
        }
        Command::MoveOccupant { from, to } => {
            if world.cell(to).is_none() {
                reject(out_events, CommandError::OutOfBounds);
                return;
            }
            let Some(moving) = world.occupant_at(from) else {
                reject(out_events, CommandError::NothingToMove);
                return;
            };
            if from == to {
                return;
            }
            let displaced = world.occupant_at(to);
            if let Some(slot) = world.cell_mut(from) {
                slot.occupant = displaced;
            }
            if let Some(slot) = world.cell_mut(to) {
                slot.occupant = Some(moving);
            }
            world.set_position(moving, to);
            out_events.push(Event::OccupantMoved {
                occupant: moving,
                from,
                to,
            });
            if let Some(other) = displaced {
                world.set_position(other, from);
                out_events.push(Event::OccupantMoved {
                    occupant: other,
                    from: to,
                    to: from,
                });
            }
            if moving == OccupantId::Player || displaced == Some(OccupantId::Player) {
                world.refresh_view();
            }
        }
        Command::DamagePlayer { amount } => {
            let Some(player) = world.player.as_mut() else {
                reject(out_events, CommandError::NoPlayer);
                return;
            };
            player.health = player.health.saturating_sub(amount);
            out_events.push(Event::PlayerDamaged {
                amount,
                remaining: player.health,
            });
        }
        Command::StunPlayer { amount } => {
            let Some(player) = world.player.as_mut() else {
                reject(out_events, CommandError::NoPlayer);
                return;
            };
            player.stun = player.stun.saturating_add(amount).max(0);
            out_events.push(Event::PlayerStunned { total: player.stun });
        }
        Command::BlindPlayer { turns } => {
            let Some(player) = world.player.as_mut() else {
                reject(out_events, CommandError::NoPlayer);
                return;
            };
            player.blind = player.blind.saturating_add(turns).max(0);
            out_events.push(Event::PlayerBlinded {
                total: player.blind,
            });
        }
        Command::DamageCreature { creature, amount } => {
            let Some(target) = world.creatures.get_mut(&creature) else {
                reject(out_events, CommandError::UnknownCreature);
                return;
            };
            target.health = target.health.saturating_sub(amount);
            if target.health > 0 {
                out_events.push(Event::CreatureDamaged {
                    creature,
                    amount,
                    remaining: target.health,
                });
                return;
            }
            if let Some(slain) = world.remove_creature(creature) {
                out_events.push(Event::CreatureSlain {
                    creature,
                    cell: slain.cell,
                });
                out_events.push(Event::CellRedrawn { cell: slain.cell });
            }
        }
        Command::AfflictCreature {
            creature,
            condition,
            amount,
        } => {
            let Some(target) = world.creatures.get_mut(&creature) else {
                reject(out_events, CommandError::UnknownCreature);
                return;
            };
            let counter = target.condition_mut(condition);
            *counter = counter.saturating_add(amount).max(0);
            out_events.push(Event::CreatureAfflicted {
                creature,
                condition,
                total: *counter,
            });
        }
        Command::SetAlertness {
            creature,
            alertness,
        } => {
            let Some(target) = world.creatures.get_mut(&creature) else {
                reject(out_events, CommandError::UnknownCreature);
                return;
            };
            let from = target.alertness;
            let to = alertness.clamp(ALERTNESS_MIN, ALERTNESS_MAX);
            if from != to {
                target.alertness = to;
                out_events.push(Event::AlertnessChanged { creature, from, to });
            }
        }
        Command::RefreshView => {
            world.refresh_view();
            out_events.push(Event::ViewRefreshed);
        }
    }
}

fn reject(out_events: &mut Vec<Event>, reason: CommandError) {
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cavefall_core::{
        CellCoord, CellFlags, CreatureId, Dice, FloorItem, OccupantId, Race, TerrainKind,
    };

    use super::World;

    /// Number of rows and columns in the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.rows, world.grid.columns)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(world: &World, cell: CellCoord) -> bool {
        world.grid.index(cell).is_some()
    }

    /// Depth of the current level, zero on the surface.
    #[must_use]
    pub fn depth(world: &World) -> u32 {
        world.depth
    }

    /// Terrain of the cell, `None` outside the grid.
    #[must_use]
    pub fn terrain(world: &World, cell: CellCoord) -> Option<TerrainKind> {
        world.cell(cell).map(|slot| slot.terrain)
    }

    /// Flags of the cell, empty outside the grid.
    #[must_use]
    pub fn flags(world: &World, cell: CellCoord) -> CellFlags {
        world.cell(cell).map_or(CellFlags::empty(), |slot| slot.flags)
    }

    /// Reports whether light and lines pass over the cell.
    #[must_use]
    pub fn is_passable(world: &World, cell: CellCoord) -> bool {
        terrain(world, cell).map_or(false, TerrainKind::is_passable)
    }

    /// Reports whether the cell is inside the player's field of view.
    #[must_use]
    pub fn in_view(world: &World, cell: CellCoord) -> bool {
        flags(world, cell).contains(CellFlags::VIEW)
    }

    /// Occupant standing on the cell.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<OccupantId> {
        world.occupant_at(cell)
    }

    /// Item lying on the cell.
    #[must_use]
    pub fn item(world: &World, cell: CellCoord) -> Option<&FloorItem> {
        world.cell(cell).and_then(|slot| slot.item.as_ref())
    }

    /// Reports whether effects may rewrite the terrain of the cell.
    ///
    /// Cells outside the grid, permanent features and cells holding an
    /// artefact are excluded.
    #[must_use]
    pub fn is_mutable(world: &World, cell: CellCoord) -> bool {
        let Some(slot) = world.cell(cell) else {
            return false;
        };
        !slot.terrain.is_irremovable() && !slot.item.as_ref().map_or(false, |item| item.artefact)
    }

    /// Counts the in-bounds neighbours of `cell` whose terrain is `kind`.
    #[must_use]
    pub fn count_adjacent(world: &World, cell: CellCoord, kind: TerrainKind) -> usize {
        cell.neighbors()
            .filter(|neighbor| terrain(world, *neighbor) == Some(kind))
            .count()
    }

    /// Confirmed target of the player.
    #[must_use]
    pub fn target(world: &World) -> Option<CellCoord> {
        world.target
    }

    /// Captures the state of the player, if one is placed.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.player.as_ref().map(|player| PlayerSnapshot {
            cell: player.cell,
            health: player.health,
            max_health: player.max_health,
            protection: player.protection,
            stun: player.stun,
            blind: player.blind,
        })
    }

    /// Cell the player stands on.
    #[must_use]
    pub fn player_cell(world: &World) -> Option<CellCoord> {
        world.player.as_ref().map(|player| player.cell)
    }

    /// Captures the state of one creature.
    #[must_use]
    pub fn creature(world: &World, id: CreatureId) -> Option<CreatureSnapshot> {
        world.creatures.get(&id).map(CreatureSnapshot::from_creature)
    }

    /// Captures the state of every creature, ordered by identifier.
    #[must_use]
    pub fn creatures(world: &World) -> Vec<CreatureSnapshot> {
        world
            .creatures
            .values()
            .map(CreatureSnapshot::from_creature)
            .collect()
    }

    /// Read-only state of the player.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Cell the player stands on.
        pub cell: CellCoord,
        /// Hit points left.
        pub health: i32,
        /// Maximum hit points.
        pub max_health: i32,
        /// Dice rolled to reduce incoming damage.
        pub protection: Dice,
        /// Stun counter.
        pub stun: i32,
        /// Blindness counter.
        pub blind: i32,
    }

    /// Read-only state of a creature.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CreatureSnapshot {
        /// Identifier of the creature.
        pub id: CreatureId,
        /// Race of the creature.
        pub race: Race,
        /// Cell the creature stands on.
        pub cell: CellCoord,
        /// Hit points left.
        pub health: i32,
        /// Maximum hit points.
        pub max_health: i32,
        /// Current alertness.
        pub alertness: i32,
        /// Stun counter.
        pub stun: i32,
        /// Slow counter.
        pub slow: i32,
        /// Confusion counter.
        pub confusion: i32,
        /// Fear counter.
        pub fear: i32,
        /// Whether the player can currently see the creature.
        pub visible: bool,
    }

    impl CreatureSnapshot {
        fn from_creature(creature: &super::Creature) -> Self {
            Self {
                id: creature.id,
                race: creature.race.clone(),
                cell: creature.cell,
                health: creature.health,
                max_health: creature.max_health,
                alertness: creature.alertness,
                stun: creature.stun,
                slow: creature.slow,
                confusion: creature.confusion,
                fear: creature.fear,
                visible: creature.visible,
            }
        }
    }
}

#[derive(Debug)]
struct Grid {
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
}

impl Grid {
    fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![Cell::default(); capacity],
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
}

#[derive(Clone, Debug)]
struct Cell {
    terrain: TerrainKind,
    flags: CellFlags,
    occupant: Option<OccupantId>,
    item: Option<FloorItem>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            terrain: TerrainKind::Floor,
            flags: CellFlags::empty(),
            occupant: None,
            item: None,
        }
    }
}

#[derive(Debug)]
struct Player {
    cell: CellCoord,
    health: i32,
    max_health: i32,
    protection: Dice,
    stun: i32,
    blind: i32,
}

impl Player {
    fn new(cell: CellCoord, health: i32, protection: Dice) -> Self {
        Self {
            cell,
            health,
            max_health: health,
            protection,
            stun: 0,
            blind: 0,
        }
    }
}

#[derive(Debug)]
struct Creature {
    id: CreatureId,
    race: Race,
    cell: CellCoord,
    health: i32,
    max_health: i32,
    alertness: i32,
    stun: i32,
    slow: i32,
    confusion: i32,
    fear: i32,
    visible: bool,
}

impl Creature {
    fn new(id: CreatureId, race: Race, cell: CellCoord, health: i32, alertness: i32) -> Self {
        Self {
            id,
            race,
            cell,
            health,
            max_health: health,
            alertness: alertness.clamp(ALERTNESS_MIN, ALERTNESS_MAX),
            stun: 0,
            slow: 0,
            confusion: 0,
            fear: 0,
            visible: false,
        }
    }

    fn condition_mut(&mut self, condition: Condition) -> &mut i32 {
        match condition {
            Condition::Stun => &mut self.stun,
            Condition::Slow => &mut self.slow,
            Condition::Confusion => &mut self.confusion,
            Condition::Fear => &mut self.fear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use cavefall_core::{
        CellCoord, CellFlags, Command, CommandError, Dice, Event, OccupantId, Race, RaceFlags,
        TerrainKind,
    };

    fn orc() -> Race {
        Race {
            name: "orc".to_owned(),
            glyph: 'o',
            protection: Dice::new(1, 4),
            will: 2,
            flags: RaceFlags::empty(),
        }
    }

    fn world_with_grid(rows: u32, columns: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::ConfigureGrid { rows, columns }, &mut events);
        world
    }

    #[test]
    fn spawning_on_an_occupied_cell_is_rejected() {
        let mut world = world_with_grid(5, 5);
        let mut events = Vec::new();
        let cell = CellCoord::new(2, 2);
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SpawnCreature {
                    race: orc(),
                    cell,
                    health: 10,
                    alertness: 0,
                },
                &mut events,
            );
        }
        assert_eq!(query::creatures(&world).len(), 1);
        assert_eq!(
            events.last(),
            Some(&Event::CommandRejected {
                reason: CommandError::Occupied
            })
        );
    }

    #[test]
    fn lethal_damage_clears_the_cell() {
        let mut world = world_with_grid(5, 5);
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 3);
        apply(
            &mut world,
            Command::SpawnCreature {
                race: orc(),
                cell,
                health: 4,
                alertness: 0,
            },
            &mut events,
        );
        let id = query::creatures(&world)[0].id;
        apply(
            &mut world,
            Command::DamageCreature {
                creature: id,
                amount: 4,
            },
            &mut events,
        );
        assert!(query::occupant(&world, cell).is_none());
        assert!(events.contains(&Event::CreatureSlain { creature: id, cell }));
    }

    #[test]
    fn moving_onto_an_occupant_swaps_places() {
        let mut world = world_with_grid(5, 5);
        let mut events = Vec::new();
        let player_cell = CellCoord::new(2, 2);
        let creature_cell = CellCoord::new(2, 3);
        apply(
            &mut world,
            Command::PlacePlayer {
                cell: player_cell,
                health: 20,
                protection: Dice::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnCreature {
                race: orc(),
                cell: creature_cell,
                health: 10,
                alertness: 0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveOccupant {
                from: player_cell,
                to: creature_cell,
            },
            &mut events,
        );
        assert_eq!(query::player_cell(&world), Some(creature_cell));
        assert!(matches!(
            query::occupant(&world, player_cell),
            Some(OccupantId::Creature(_))
        ));
        assert_eq!(query::creatures(&world)[0].cell, player_cell);
    }

    #[test]
    fn view_stops_at_walls() {
        let mut world = world_with_grid(5, 9);
        let mut events = Vec::new();
        for row in 0..5 {
            apply(
                &mut world,
                Command::SetTerrain {
                    cell: CellCoord::new(row, 4),
                    terrain: TerrainKind::Wall,
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::PlacePlayer {
                cell: CellCoord::new(2, 1),
                health: 20,
                protection: Dice::new(0, 0),
            },
            &mut events,
        );
        assert!(query::in_view(&world, CellCoord::new(2, 3)));
        assert!(query::in_view(&world, CellCoord::new(2, 4)), "walls themselves are seen");
        assert!(!query::in_view(&world, CellCoord::new(2, 6)));
    }

    #[test]
    fn transient_flags_cannot_be_set_by_command() {
        let mut world = world_with_grid(3, 3);
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 1);
        apply(
            &mut world,
            Command::SetCellFlags {
                cell,
                flags: CellFlags::MARKED | CellFlags::ROOM,
                enabled: true,
            },
            &mut events,
        );
        let flags = query::flags(&world, cell);
        assert!(flags.contains(CellFlags::ROOM));
        assert!(!flags.contains(CellFlags::MARKED));
    }
}
