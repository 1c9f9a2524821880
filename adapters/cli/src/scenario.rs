//! TOML scenarios describing a small dungeon level to run effects against.

use std::{fs, path::Path};

use cavefall_core::{
    CellCoord, CellFlags, Command, CommandError, Dice, Event, FloorItem, Race, RaceFlags,
    TerrainKind, ALERTNESS_UNWARY,
};
use cavefall_world::{self as world, World};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a scenario.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The scenario file could not be read.
    #[error("could not read scenario {path}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The scenario is not valid TOML for the expected layout.
    #[error("could not parse scenario")]
    Parse(#[from] toml::de::Error),
    /// The map has no rows.
    #[error("scenario map is empty")]
    EmptyMap,
    /// A map row differs in width from the first one.
    #[error("map row {row} is {found} cells wide, expected {expected}")]
    RaggedMap {
        /// Offending row.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A map cell uses a glyph that is neither terrain nor a listed creature.
    #[error("unknown glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Glyph found.
        glyph: char,
        /// Row of the glyph.
        row: u32,
        /// Column of the glyph.
        column: u32,
    },
    /// The map holds more than one player.
    #[error("map places the player more than once")]
    DuplicatePlayer,
    /// A creature lists a race flag that does not exist.
    #[error("creature '{creature}' has unknown flag '{flag}'")]
    UnknownRaceFlag {
        /// Creature name.
        creature: String,
        /// Unrecognised flag.
        flag: String,
    },
    /// The world refused a command while the scenario was being built.
    #[error("scenario rejected at {cell:?}: {reason}")]
    Rejected {
        /// Cell being set up.
        cell: CellCoord,
        /// Reason given by the world.
        reason: CommandError,
    },
}

/// Scenario file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Dungeon depth; zero is the surface.
    pub(crate) depth: u32,
    /// One string per map row.
    pub(crate) map: Vec<String>,
    /// Rectangles belonging to rooms.
    #[serde(default)]
    pub(crate) rooms: Vec<RoomSpec>,
    /// Stats of the player marked `@` on the map.
    #[serde(default)]
    pub(crate) player: PlayerSpec,
    /// Creatures, placed wherever their glyph appears on the map.
    #[serde(default)]
    pub(crate) creatures: Vec<CreatureSpec>,
    /// Items lying on the floor.
    #[serde(default)]
    pub(crate) items: Vec<ItemSpec>,
    /// Confirmed target as `[row, column]`.
    #[serde(default)]
    pub(crate) target: Option<[u32; 2]>,
}

/// Inclusive rectangle of room cells.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RoomSpec {
    pub(crate) top: u32,
    pub(crate) left: u32,
    pub(crate) bottom: u32,
    pub(crate) right: u32,
    #[serde(default)]
    pub(crate) lit: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct PlayerSpec {
    pub(crate) health: i32,
    pub(crate) protection: Dice,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        Self {
            health: 30,
            protection: Dice::new(1, 4),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CreatureSpec {
    pub(crate) glyph: char,
    pub(crate) name: String,
    pub(crate) health: i32,
    #[serde(default)]
    pub(crate) protection: Dice,
    #[serde(default)]
    pub(crate) will: i32,
    #[serde(default = "unwary")]
    pub(crate) alertness: i32,
    #[serde(default)]
    pub(crate) flags: Vec<String>,
}

fn unwary() -> i32 {
    ALERTNESS_UNWARY
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ItemSpec {
    pub(crate) at: [u32; 2],
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) flammable: bool,
    #[serde(default)]
    pub(crate) fragile: bool,
    #[serde(default)]
    pub(crate) artefact: bool,
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses a scenario from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(contents)?)
    }

    /// Builds the world the scenario describes.
    pub(crate) fn build(&self) -> Result<World, ScenarioError> {
        let rows = u32::try_from(self.map.len()).unwrap_or(u32::MAX);
        let Some(first) = self.map.first() else {
            return Err(ScenarioError::EmptyMap);
        };
        let columns = width(first);
        if columns == 0 {
            return Err(ScenarioError::EmptyMap);
        }

        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(&mut world, Command::ConfigureGrid { rows, columns }, &mut events);
        world::apply(&mut world, Command::SetDepth { depth: self.depth }, &mut events);

        let mut player = None;
        let mut spawns = Vec::new();
        for (row, line) in (0..).zip(&self.map) {
            let found = width(line);
            if found != columns {
                return Err(ScenarioError::RaggedMap {
                    row,
                    expected: columns,
                    found,
                });
            }
            for (column, glyph) in (0..).zip(line.chars()) {
                let cell = CellCoord::new(row, column);
                let terrain = match terrain_for(glyph) {
                    Some(terrain) => terrain,
                    None if glyph == '@' => {
                        if player.replace(cell).is_some() {
                            return Err(ScenarioError::DuplicatePlayer);
                        }
                        TerrainKind::Floor
                    }
                    None => {
                        let Some(spec) = self.creatures.iter().find(|spec| spec.glyph == glyph)
                        else {
                            return Err(ScenarioError::UnknownGlyph { glyph, row, column });
                        };
                        spawns.push((cell, spec));
                        TerrainKind::Floor
                    }
                };
                world::apply(&mut world, Command::SetTerrain { cell, terrain }, &mut events);
            }
        }

        for room in &self.rooms {
            let mut flags = CellFlags::ROOM;
            if room.lit {
                flags.insert(CellFlags::LIT);
            }
            for row in room.top..=room.bottom {
                for column in room.left..=room.right {
                    let cell = CellCoord::new(row, column);
                    submit(&mut world, cell, Command::SetCellFlags { cell, flags, enabled: true })?;
                }
            }
        }

        for item in &self.items {
            let cell = CellCoord::new(item.at[0], item.at[1]);
            let item = FloorItem {
                name: item.name.clone(),
                flammable: item.flammable,
                fragile: item.fragile,
                artefact: item.artefact,
            };
            submit(&mut world, cell, Command::PlaceItem { cell, item })?;
        }

        for (cell, spec) in spawns {
            let race = spec.race()?;
            submit(
                &mut world,
                cell,
                Command::SpawnCreature {
                    race,
                    cell,
                    health: spec.health,
                    alertness: spec.alertness,
                },
            )?;
        }

        if let Some(cell) = player {
            submit(
                &mut world,
                cell,
                Command::PlacePlayer {
                    cell,
                    health: self.player.health,
                    protection: self.player.protection,
                },
            )?;
        }

        if let Some([row, column]) = self.target {
            let target = Some(CellCoord::new(row, column));
            world::apply(&mut world, Command::SetTarget { target }, &mut events);
        }

        log::debug!(
            "built {rows}x{columns} scenario at depth {} with {} creatures",
            self.depth,
            self.creatures.len()
        );
        Ok(world)
    }
}

impl CreatureSpec {
    fn race(&self) -> Result<Race, ScenarioError> {
        let mut flags = RaceFlags::empty();
        for name in &self.flags {
            let Some(flag) = RaceFlags::from_name(&name.to_ascii_lowercase()) else {
                return Err(ScenarioError::UnknownRaceFlag {
                    creature: self.name.clone(),
                    flag: name.clone(),
                });
            };
            flags = flags | flag;
        }
        Ok(Race {
            name: self.name.clone(),
            glyph: self.glyph,
            protection: self.protection,
            will: self.will,
            flags,
        })
    }
}

/// Terrain drawn by a map glyph.
pub(crate) fn terrain_for(glyph: char) -> Option<TerrainKind> {
    let terrain = match glyph {
        '.' => TerrainKind::Floor,
        ':' => TerrainKind::Rubble,
        '#' => TerrainKind::Wall,
        '%' => TerrainKind::Quartz,
        'X' => TerrainKind::PermanentWall,
        '~' => TerrainKind::Chasm,
        '^' => TerrainKind::PitTrap,
        ';' => TerrainKind::Glyph,
        '\'' => TerrainKind::OpenDoor,
        '/' => TerrainKind::BrokenDoor,
        '+' => TerrainKind::ClosedDoor { lock: 0 },
        '*' => TerrainKind::SecretDoor,
        '0' => TerrainKind::Forge,
        '<' => TerrainKind::StairUp,
        '>' => TerrainKind::StairDown,
        _ => return None,
    };
    Some(terrain)
}

/// Map glyph drawing `terrain`.
pub(crate) fn glyph_for(terrain: TerrainKind) -> char {
    match terrain {
        TerrainKind::Floor => '.',
        TerrainKind::Rubble => ':',
        TerrainKind::Wall => '#',
        TerrainKind::Quartz => '%',
        TerrainKind::PermanentWall => 'X',
        TerrainKind::Chasm => '~',
        TerrainKind::PitTrap => '^',
        TerrainKind::Glyph => ';',
        TerrainKind::OpenDoor => '\'',
        TerrainKind::BrokenDoor => '/',
        TerrainKind::ClosedDoor { .. } => '+',
        TerrainKind::SecretDoor => '*',
        TerrainKind::Forge => '0',
        TerrainKind::StairUp => '<',
        TerrainKind::StairDown => '>',
    }
}

fn width(line: &str) -> u32 {
    u32::try_from(line.chars().count()).unwrap_or(u32::MAX)
}

fn submit(world: &mut World, cell: CellCoord, command: Command) -> Result<(), ScenarioError> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    match events.into_iter().find_map(|event| match event {
        Event::CommandRejected { reason } => Some(reason),
        _ => None,
    }) {
        Some(reason) => Err(ScenarioError::Rejected { cell, reason }),
        None => Ok(()),
    }
}
