#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cavefall effects engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the effect systems. Systems read the world through
//! its query module, submit [`Command`] values describing the mutations an
//! effect causes, and the world answers every command with [`Event`] values
//! that display layers use to redraw cells, refresh the map and print
//! messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest distance a bolt or beam travels, and the reach of area effects.
pub const MAX_RANGE: u32 = 20;

/// Distance the player can see, and the default reach of arcs.
pub const MAX_SIGHT: u32 = 20;

/// Maximum number of cells a single flood fill may mark.
pub const MARK_CAPACITY: usize = 1536;

/// Largest radius accepted by ball effects.
pub const MAX_BALL_RADIUS: u32 = 9;

/// Maximum number of cells an explosion may touch, the epicentre included.
pub const MAX_BLAST_CELLS: usize = 256;

/// Largest radius accepted by the earthquake.
pub const MAX_EARTHQUAKE_RADIUS: u32 = 6;

/// Depth of the deepest fixed encounter. Chasms never open within one level of it.
pub const DEEPEST_ENCOUNTER_DEPTH: u32 = 20;

/// Lowest alertness a creature can have (deeply asleep).
pub const ALERTNESS_MIN: i32 = -20;

/// Alertness threshold below which a creature is asleep.
pub const ALERTNESS_UNWARY: i32 = -10;

/// Alertness at which a creature is fully alert.
pub const ALERTNESS_ALERT: i32 = 0;

/// Alertness at which a creature is very alert.
pub const ALERTNESS_VERY_ALERT: i32 = 5;

/// Highest alertness a creature can have.
pub const ALERTNESS_MAX: i32 = 20;

/// Offsets visited when scanning the eight neighbours of a cell.
///
/// The order is south, north, east, west, then the diagonals.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
];

/// Location of a single cell within the dungeon grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate using the provided row and column indices.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Number of king moves separating two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        let rows = self.row.abs_diff(other.row);
        let columns = self.column.abs_diff(other.column);
        rows.max(columns)
    }

    /// Octagonal approximation of the euclidean distance between two cells.
    ///
    /// The longer axis counts in full and the shorter axis counts half.
    #[must_use]
    pub fn distance(self, other: CellCoord) -> u32 {
        let rows = self.row.abs_diff(other.row);
        let columns = self.column.abs_diff(other.column);
        rows.max(columns) + rows.min(columns) / 2
    }

    /// Returns the cell displaced by the provided row and column deltas.
    ///
    /// `None` is returned when the result would have a negative index.
    #[must_use]
    pub fn offset(self, row_delta: i32, column_delta: i32) -> Option<CellCoord> {
        let row = i64::from(self.row) + i64::from(row_delta);
        let column = i64::from(self.column) + i64::from(column_delta);
        let row = u32::try_from(row).ok()?;
        let column = u32::try_from(column).ok()?;
        Some(CellCoord::new(row, column))
    }

    /// Iterates the eight neighbours that have non-negative indices.
    pub fn neighbors(self) -> impl Iterator<Item = CellCoord> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(row, column)| self.offset(row, column))
    }
}

/// Symbolic aiming input supplied by the command layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards decreasing rows.
    North,
    /// Towards decreasing rows and increasing columns.
    NorthEast,
    /// Towards increasing columns.
    East,
    /// Towards increasing rows and columns.
    SouthEast,
    /// Towards increasing rows.
    South,
    /// Towards increasing rows and decreasing columns.
    SouthWest,
    /// Towards decreasing columns.
    West,
    /// Towards decreasing rows and columns.
    NorthWest,
    /// Towards the currently confirmed target.
    Target,
    /// Straight up. The effect lands on its origin.
    Up,
    /// Straight down. The effect lands on its origin.
    Down,
}

impl Direction {
    /// Row and column step of a compass direction.
    ///
    /// The targeting and vertical pseudo-directions have no step.
    #[must_use]
    pub const fn delta(self) -> Option<(i32, i32)> {
        match self {
            Direction::North => Some((-1, 0)),
            Direction::NorthEast => Some((-1, 1)),
            Direction::East => Some((0, 1)),
            Direction::SouthEast => Some((1, 1)),
            Direction::South => Some((1, 0)),
            Direction::SouthWest => Some((1, -1)),
            Direction::West => Some((0, -1)),
            Direction::NorthWest => Some((-1, -1)),
            Direction::Target | Direction::Up | Direction::Down => None,
        }
    }
}

/// Terrain occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Plain open floor.
    Floor,
    /// Loose rubble that blocks movement and sight.
    Rubble,
    /// Granite wall.
    Wall,
    /// Quartz vein.
    Quartz,
    /// Wall that no effect can alter.
    PermanentWall,
    /// Collapsed floor that drops to a deeper level.
    Chasm,
    /// Open pit trap.
    PitTrap,
    /// Warding glyph.
    Glyph,
    /// Door standing open.
    OpenDoor,
    /// Door torn from its hinges.
    BrokenDoor,
    /// Closed door, locked when `lock` is non-zero.
    ClosedDoor {
        /// Strength of the lock, zero for an unlocked door.
        lock: u8,
    },
    /// Door disguised as wall.
    SecretDoor,
    /// Forge.
    Forge,
    /// Staircase leading up.
    StairUp,
    /// Staircase leading down.
    StairDown,
}

impl TerrainKind {
    /// Reports whether light, lines of sight and floods pass over the terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(
            self,
            TerrainKind::Rubble
                | TerrainKind::Wall
                | TerrainKind::Quartz
                | TerrainKind::PermanentWall
                | TerrainKind::ClosedDoor { .. }
                | TerrainKind::SecretDoor
        )
    }

    /// Reports whether the terrain is plain enough to be forgotten in darkness.
    #[must_use]
    pub const fn is_boring(self) -> bool {
        matches!(self, TerrainKind::Floor)
    }

    /// Reports whether no effect may rewrite the terrain.
    #[must_use]
    pub const fn is_irremovable(self) -> bool {
        matches!(
            self,
            TerrainKind::PermanentWall
                | TerrainKind::StairUp
                | TerrainKind::StairDown
                | TerrainKind::Forge
        )
    }
}

/// Bit set of per-cell flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellFlags(u8);

impl CellFlags {
    /// Transient mark placed by the flood fill.
    pub const MARKED: CellFlags = CellFlags(1 << 0);
    /// Permanently lit.
    pub const LIT: CellFlags = CellFlags(1 << 1);
    /// Part of a room.
    pub const ROOM: CellFlags = CellFlags(1 << 2);
    /// Remembered by the player.
    pub const SEEN: CellFlags = CellFlags(1 << 3);
    /// Inside the player's current field of view.
    pub const VIEW: CellFlags = CellFlags(1 << 4);

    /// Flag set with no bits enabled.
    #[must_use]
    pub const fn empty() -> Self {
        CellFlags(0)
    }

    /// Reports whether every bit of `other` is enabled.
    #[must_use]
    pub const fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Reports whether any bit of `other` is enabled.
    #[must_use]
    pub const fn intersects(self, other: CellFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Enables every bit of `other`.
    pub fn insert(&mut self, other: CellFlags) {
        self.0 |= other.0;
    }

    /// Disables every bit of `other`.
    pub fn remove(&mut self, other: CellFlags) {
        self.0 &= !other.0;
    }

    /// Enables or disables the bits of `other`.
    pub fn set(&mut self, other: CellFlags, enabled: bool) {
        if enabled {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl std::ops::BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        CellFlags(self.0 | rhs.0)
    }
}

/// Unique identifier assigned to a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
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

/// Occupant standing on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantId {
    /// The player character.
    Player,
    /// A creature from the creature table.
    Creature(CreatureId),
}

/// Race traits that change how a creature reacts to effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceFlags(u16);

impl RaceFlags {
    /// Barely notices its surroundings; alerted at half strength.
    pub const MINDLESS: RaceFlags = RaceFlags(1 << 0);
    /// Quick to notice; alerted at double strength.
    pub const SMART: RaceFlags = RaceFlags(1 << 1);
    /// Cannot be stunned.
    pub const NO_STUN: RaceFlags = RaceFlags(1 << 2);
    /// Cannot be put to sleep.
    pub const NO_SLEEP: RaceFlags = RaceFlags(1 << 3);
    /// Cannot be confused.
    pub const NO_CONFUSION: RaceFlags = RaceFlags(1 << 4);
    /// Cannot be frightened.
    pub const NO_FEAR: RaceFlags = RaceFlags(1 << 5);
    /// Cannot be slowed.
    pub const NO_SLOW: RaceFlags = RaceFlags(1 << 6);
    /// Takes a third of fire damage.
    pub const RES_FIRE: RaceFlags = RaceFlags(1 << 7);
    /// Takes a third of cold damage.
    pub const RES_COLD: RaceFlags = RaceFlags(1 << 8);
    /// Takes a third of poison damage.
    pub const RES_POISON: RaceFlags = RaceFlags(1 << 9);
    /// Harmed by bright light.
    pub const HURT_LIGHT: RaceFlags = RaceFlags(1 << 10);

    /// Flag set with no traits.
    #[must_use]
    pub const fn empty() -> Self {
        RaceFlags(0)
    }

    /// Reports whether every trait of `other` is present.
    #[must_use]
    pub const fn contains(self, other: RaceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Looks up a trait by its lowercase name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<RaceFlags> {
        let flag = match name {
            "mindless" => RaceFlags::MINDLESS,
            "smart" => RaceFlags::SMART,
            "no_stun" => RaceFlags::NO_STUN,
            "no_sleep" => RaceFlags::NO_SLEEP,
            "no_confusion" => RaceFlags::NO_CONFUSION,
            "no_fear" => RaceFlags::NO_FEAR,
            "no_slow" => RaceFlags::NO_SLOW,
            "res_fire" => RaceFlags::RES_FIRE,
            "res_cold" => RaceFlags::RES_COLD,
            "res_poison" => RaceFlags::RES_POISON,
            "hurt_light" => RaceFlags::HURT_LIGHT,
            _ => return None,
        };
        Some(flag)
    }
}

impl std::ops::BitOr for RaceFlags {
    type Output = RaceFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        RaceFlags(self.0 | rhs.0)
    }
}

/// Shared description of a creature race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    /// Display name used in messages.
    pub name: String,
    /// Map glyph.
    pub glyph: char,
    /// Dice rolled to reduce incoming damage.
    pub protection: Dice,
    /// Skill used to resist status effects.
    pub will: i32,
    /// Special traits.
    pub flags: RaceFlags,
}

impl Race {
    /// Name used as the subject of a sentence, such as "The orc".
    ///
    /// Capitalised names belong to unique creatures and are used unchanged.
    #[must_use]
    pub fn subject(&self) -> String {
        if self.name.chars().next().map_or(false, char::is_uppercase) {
            self.name.clone()
        } else {
            format!("The {}", self.name)
        }
    }
}

/// Dice expression rolled by effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dice {
    count: u32,
    sides: u32,
}

impl Dice {
    /// Creates a new dice expression of `count` dice with `sides` faces.
    #[must_use]
    pub const fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }

    /// Number of dice rolled.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Number of faces on each die.
    #[must_use]
    pub const fn sides(&self) -> u32 {
        self.sides
    }

    /// Same dice with a different count.
    #[must_use]
    pub const fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }

    /// Reports whether rolling the dice always yields zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.count == 0 || self.sides == 0
    }
}

impl std::fmt::Display for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Kind of damage or status an effect carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Plain physical harm.
    Hurt,
    /// Fire, burns flammable items.
    Fire,
    /// Cold, shatters fragile items.
    Cold,
    /// Poison.
    Poison,
    /// Darkness, unlights cells.
    Darkness,
    /// Light, lights cells and sears light-sensitive creatures.
    Light,
    /// Slows creatures.
    Slow,
    /// Puts creatures to sleep.
    Sleep,
    /// Confuses creatures.
    Confuse,
    /// Frightens creatures.
    Scare,
    /// Shatters walls and rubble.
    KillWall,
    /// Unlocks, opens or breaks doors.
    KillDoor,
    /// Locks closed doors.
    LockDoor,
    /// Disarms traps.
    KillTrap,
    /// Shaking ground, visual only.
    Earthquake,
}

impl EffectKind {
    /// Reports whether the effect deals hit-point damage.
    #[must_use]
    pub const fn is_damaging(self) -> bool {
        matches!(
            self,
            EffectKind::Hurt | EffectKind::Fire | EffectKind::Cold | EffectKind::Poison
        )
    }
}

/// Who caused an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectSource {
    /// The player.
    Player,
    /// A creature.
    Creature(CreatureId),
    /// A trap, the dungeon itself or another unattended cause.
    Environment,
}

/// Condition counters a creature can suffer from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Stunned.
    Stun,
    /// Slowed.
    Slow,
    /// Confused.
    Confusion,
    /// Afraid.
    Fear,
}

/// How an effect travels from its origin to the cells it affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectShape {
    /// Lands directly on the target cell without travelling.
    Point,
    /// Travels until it hits an occupant or a wall; affects only where it stops.
    Bolt,
    /// Affects every cell along its line.
    Beam,
    /// Travels to the target and explodes there.
    Ball {
        /// Explode at the first occupant met on the way.
        stop_at_occupant: bool,
    },
    /// Sector spreading from the origin towards the target.
    Arc {
        /// Angular width of the sector.
        degrees: i32,
    },
}

/// What an effect applies itself to once it reaches a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Affects {
    /// Terrain of the cell.
    pub terrain: bool,
    /// Items lying on the cell.
    pub items: bool,
    /// Creatures standing on the cell.
    pub creatures: bool,
    /// The player standing on the cell.
    pub player: bool,
    /// Explosions reach walls next to visible cells.
    pub walls: bool,
    /// Ignores walls while travelling and exploding.
    pub passes_walls: bool,
}

/// Legacy projection bit mask.
///
/// Effect recipes are composed from these bits and translated into an
/// [`EffectShape`] plus [`Affects`] before anything travels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProjectFlags(u32);

impl ProjectFlags {
    /// Stop at the first occupant.
    pub const STOP: ProjectFlags = ProjectFlags(1 << 0);
    /// Affect every cell of the path.
    pub const BEAM: ProjectFlags = ProjectFlags(1 << 1);
    /// Explode at the end of the path.
    pub const BOOM: ProjectFlags = ProjectFlags(1 << 2);
    /// Explode in a sector around the origin.
    pub const ARC: ProjectFlags = ProjectFlags(1 << 3);
    /// Start directly at the target.
    pub const JUMP: ProjectFlags = ProjectFlags(1 << 4);
    /// Affect terrain.
    pub const GRID: ProjectFlags = ProjectFlags(1 << 5);
    /// Affect items.
    pub const ITEM: ProjectFlags = ProjectFlags(1 << 6);
    /// Affect creatures.
    pub const KILL: ProjectFlags = ProjectFlags(1 << 7);
    /// Affect the player.
    pub const PLAY: ProjectFlags = ProjectFlags(1 << 8);
    /// Pass through walls.
    pub const PASS: ProjectFlags = ProjectFlags(1 << 9);
    /// Reach walls next to visible cells.
    pub const WALL: ProjectFlags = ProjectFlags(1 << 10);
    /// Draw nothing while travelling.
    pub const HIDE: ProjectFlags = ProjectFlags(1 << 11);

    /// Flag set with no bits enabled.
    #[must_use]
    pub const fn empty() -> Self {
        ProjectFlags(0)
    }

    /// Reports whether every bit of `other` is enabled.
    #[must_use]
    pub const fn contains(self, other: ProjectFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Translates the shape bits into an [`EffectShape`].
    ///
    /// `degrees` is only consulted for arcs.
    #[must_use]
    pub const fn shape(self, degrees: i32) -> EffectShape {
        if self.contains(ProjectFlags::ARC) {
            EffectShape::Arc { degrees }
        } else if self.contains(ProjectFlags::JUMP) && !self.contains(ProjectFlags::BOOM) {
            EffectShape::Point
        } else if self.contains(ProjectFlags::BOOM) {
            EffectShape::Ball {
                stop_at_occupant: self.contains(ProjectFlags::STOP),
            }
        } else if self.contains(ProjectFlags::BEAM) {
            EffectShape::Beam
        } else {
            EffectShape::Bolt
        }
    }

    /// Translates the target bits into [`Affects`].
    #[must_use]
    pub const fn affects(self) -> Affects {
        Affects {
            terrain: self.contains(ProjectFlags::GRID),
            items: self.contains(ProjectFlags::ITEM),
            creatures: self.contains(ProjectFlags::KILL),
            player: self.contains(ProjectFlags::PLAY),
            walls: self.contains(ProjectFlags::WALL),
            passes_walls: self.contains(ProjectFlags::PASS),
        }
    }

    /// Reports whether the effect should be drawn while it travels.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        self.contains(ProjectFlags::HIDE)
    }
}

impl std::ops::BitOr for ProjectFlags {
    type Output = ProjectFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ProjectFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ProjectFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Value object handed to the projection primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectDescriptor {
    /// Who caused the effect.
    pub source: EffectSource,
    /// Cell the effect starts from.
    pub origin: CellCoord,
    /// Cell the effect is aimed at.
    pub target: CellCoord,
    /// Travel range for lines, or radius for explosions.
    pub range: u32,
    /// Damage dice at the epicentre.
    pub dice: Dice,
    /// Strength pitted against resistance and terrain checks.
    pub power: i32,
    /// Kind of damage or status applied.
    pub kind: EffectKind,
    /// What the effect applies itself to.
    pub affects: Affects,
    /// Keep the full dice at every ring of an explosion.
    pub uniform: bool,
    /// Draw nothing while travelling.
    pub hidden: bool,
    /// Compass direction the effect was aimed in, if it was aimed by direction.
    pub heading: Option<Direction>,
}

/// Minimal description of an item lying on the floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorItem {
    /// Display name used in messages.
    pub name: String,
    /// Burns in fire.
    #[serde(default)]
    pub flammable: bool,
    /// Shatters in cold.
    #[serde(default)]
    pub fragile: bool,
    /// Indestructible artefact that also pins its cell's terrain.
    #[serde(default)]
    pub artefact: bool,
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CommandError {
    /// The referenced cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The destination already holds an occupant.
    #[error("cell is already occupied")]
    Occupied,
    /// The destination cannot be stood upon.
    #[error("cell is not passable")]
    Impassable,
    /// The referenced creature does not exist.
    #[error("no such creature")]
    UnknownCreature,
    /// The command needs a player and none is placed.
    #[error("no player is placed")]
    NoPlayer,
    /// No occupant stands on the source cell.
    #[error("no occupant to move")]
    NothingToMove,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with an empty floor of the provided size.
    ConfigureGrid {
        /// Number of rows in the grid.
        rows: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// Sets the dungeon depth of the current level.
    SetDepth {
        /// Depth in levels, zero on the surface.
        depth: u32,
    },
    /// Rewrites the terrain of a cell.
    SetTerrain {
        /// Cell to rewrite.
        cell: CellCoord,
        /// New terrain.
        terrain: TerrainKind,
    },
    /// Enables or disables the lit, room or seen flags of a cell.
    ///
    /// The transient and view flags are owned by the world and ignored here.
    SetCellFlags {
        /// Cell to update.
        cell: CellCoord,
        /// Flags to change.
        flags: CellFlags,
        /// Whether the flags are enabled or disabled.
        enabled: bool,
    },
    /// Places the player on a cell.
    PlacePlayer {
        /// Cell the player stands on.
        cell: CellCoord,
        /// Starting and maximum hit points.
        health: i32,
        /// Dice rolled to reduce incoming damage.
        protection: Dice,
    },
    /// Creates a creature on a cell.
    SpawnCreature {
        /// Race of the creature.
        race: Race,
        /// Cell the creature stands on.
        cell: CellCoord,
        /// Starting and maximum hit points.
        health: i32,
        /// Starting alertness.
        alertness: i32,
    },
    /// Removes a creature without killing it.
    RemoveCreature {
        /// Creature to remove.
        creature: CreatureId,
    },
    /// Drops an item on a cell, replacing any item already there.
    PlaceItem {
        /// Cell receiving the item.
        cell: CellCoord,
        /// Item to drop.
        item: FloorItem,
    },
    /// Destroys the item lying on a cell.
    DestroyItem {
        /// Cell holding the item.
        cell: CellCoord,
    },
    /// Confirms or clears the player's target.
    SetTarget {
        /// Confirmed target cell.
        target: Option<CellCoord>,
    },
    /// Moves the occupant of `from` to `to`, swapping with any occupant there.
    MoveOccupant {
        /// Cell the occupant currently stands on.
        from: CellCoord,
        /// Destination cell.
        to: CellCoord,
    },
    /// Removes hit points from the player.
    DamagePlayer {
        /// Hit points removed.
        amount: i32,
    },
    /// Adds to the player's stun counter.
    StunPlayer {
        /// Turns of stun added.
        amount: i32,
    },
    /// Adds to the player's blindness counter.
    BlindPlayer {
        /// Turns of blindness added.
        turns: i32,
    },
    /// Removes hit points from a creature, slaying it when none remain.
    DamageCreature {
        /// Creature to damage.
        creature: CreatureId,
        /// Hit points removed.
        amount: i32,
    },
    /// Adds to one of a creature's condition counters.
    AfflictCreature {
        /// Creature to afflict.
        creature: CreatureId,
        /// Condition to increase.
        condition: Condition,
        /// Turns added to the counter.
        amount: i32,
    },
    /// Sets a creature's alertness, clamped to the alertness scale.
    SetAlertness {
        /// Creature to update.
        creature: CreatureId,
        /// New alertness.
        alertness: i32,
    },
    /// Recomputes the player's field of view and creature visibility.
    RefreshView,
}

/// Events broadcast by the world after processing commands, and display
/// signals raised by the effect systems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the grid was replaced.
    GridConfigured {
        /// Number of rows in the grid.
        rows: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// Announces the depth of the current level.
    DepthChanged {
        /// New depth.
        depth: u32,
    },
    /// Requests that a cell be drawn again.
    CellRedrawn {
        /// Cell to redraw.
        cell: CellCoord,
    },
    /// Reports a terrain rewrite.
    TerrainChanged {
        /// Cell that changed.
        cell: CellCoord,
        /// Terrain before the change.
        from: TerrainKind,
        /// Terrain after the change.
        to: TerrainKind,
    },
    /// Requests that the whole map be drawn again.
    MapRedrawRequested,
    /// Requests that the tracked health bar be drawn again.
    HealthBarRedrawRequested,
    /// Requests that the field of view be recomputed.
    ViewUpdateRequested,
    /// Confirms that the field of view was recomputed.
    ViewRefreshed,
    /// Flavour text for the player.
    Message {
        /// Text to print.
        text: String,
    },
    /// Records a damage roll against protection for display.
    CombatRoll {
        /// Occupant that was hit.
        target: OccupantId,
        /// Dice that were rolled.
        dice: Dice,
        /// Total of the damage roll.
        rolled: u32,
        /// Total of the protection roll.
        protection: u32,
        /// Damage left after protection.
        net: u32,
    },
    /// Cells an effect visibly travelled over.
    BlastDrawn {
        /// Cells that were drawn.
        cells: Vec<CellCoord>,
    },
    /// Confirms that the player was placed.
    PlayerPlaced {
        /// Cell the player stands on.
        cell: CellCoord,
    },
    /// Reports damage taken by the player.
    PlayerDamaged {
        /// Hit points removed.
        amount: i32,
        /// Hit points left.
        remaining: i32,
    },
    /// Reports added stun on the player.
    PlayerStunned {
        /// Stun counter after the change.
        total: i32,
    },
    /// Reports added blindness on the player.
    PlayerBlinded {
        /// Blindness counter after the change.
        total: i32,
    },
    /// Confirms that a creature was created.
    CreatureSpawned {
        /// Identifier assigned to the creature.
        creature: CreatureId,
        /// Cell the creature stands on.
        cell: CellCoord,
    },
    /// Reports damage taken by a creature that survived.
    CreatureDamaged {
        /// Creature that was damaged.
        creature: CreatureId,
        /// Hit points removed.
        amount: i32,
        /// Hit points left.
        remaining: i32,
    },
    /// Reports that a creature died.
    CreatureSlain {
        /// Creature that died.
        creature: CreatureId,
        /// Cell it died on.
        cell: CellCoord,
    },
    /// Reports that a creature left the level without dying.
    CreatureRemoved {
        /// Creature that was removed.
        creature: CreatureId,
    },
    /// Reports a change to a creature condition counter.
    CreatureAfflicted {
        /// Creature that was afflicted.
        creature: CreatureId,
        /// Condition that changed.
        condition: Condition,
        /// Counter after the change.
        total: i32,
    },
    /// Reports a change of creature alertness.
    AlertnessChanged {
        /// Creature whose alertness changed.
        creature: CreatureId,
        /// Alertness before the change.
        from: i32,
        /// Alertness after the change.
        to: i32,
    },
    /// Reports that an occupant moved.
    OccupantMoved {
        /// Occupant that moved.
        occupant: OccupantId,
        /// Cell it left.
        from: CellCoord,
        /// Cell it entered.
        to: CellCoord,
    },
    /// Confirms that an item was dropped.
    ItemPlaced {
        /// Cell holding the item.
        cell: CellCoord,
    },
    /// Reports that an item was destroyed.
    ItemDestroyed {
        /// Cell that held the item.
        cell: CellCoord,
        /// Name of the item.
        name: String,
    },
    /// Reports a change of the confirmed target.
    TargetChanged {
        /// New target.
        target: Option<CellCoord>,
    },
    /// Reports that a command was rejected.
    CommandRejected {
        /// Reason the command failed.
        reason: CommandError,
    },
}
