#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs one Cavefall effect against a scenario.

mod render;
mod scenario;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cavefall_core::{CellCoord, Command, Dice, Direction, EffectKind, EffectSource, Event};
use cavefall_system_chasm_repair::close_chasms;
use cavefall_system_earthquake::{Earthquake, Quake};
use cavefall_system_illumination::{darken_area, light_area};
use cavefall_system_projection::{Cast, Projector};
use cavefall_world::{self as world, query, World};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::scenario::Scenario;

#[derive(Debug, Parser)]
#[command(name = "cavefall", version, about = "Runs a spatial effect against a dungeon scenario")]
struct Cli {
    /// Scenario file describing the level.
    #[arg(long, short)]
    scenario: PathBuf,
    /// Seed for the random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Logs engine decisions unless RUST_LOG says otherwise.
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Shakes the ground around a cell.
    Quake {
        /// Centre of the quake; defaults to the player.
        #[arg(long, value_parser = parse_cell)]
        at: Option<CellCoord>,
        #[arg(long, default_value_t = 3)]
        radius: u32,
        /// Cell that collapses into a pit.
        #[arg(long, value_parser = parse_cell)]
        pit: Option<CellCoord>,
    },
    /// Obliterates everything around a cell.
    Destroy {
        #[arg(long, value_parser = parse_cell)]
        at: Option<CellCoord>,
        #[arg(long, default_value_t = 5)]
        radius: u32,
    },
    /// Fires a bolt from the player.
    Bolt(AimedCast),
    /// Fires a beam from the player.
    Beam(AimedCast),
    /// Fires a ball from the player.
    Ball {
        #[command(flatten)]
        aimed: AimedCast,
        #[arg(long, default_value_t = 2)]
        radius: u32,
        /// Explode at the first creature met instead of the aimed cell.
        #[arg(long)]
        unconfirmed: bool,
    },
    /// Fires a sector from the player.
    Arc {
        #[command(flatten)]
        aimed: AimedCast,
        /// Reach of the arc; zero reaches as far as the player sees.
        #[arg(long, default_value_t = 0)]
        radius: u32,
        #[arg(long, default_value_t = 90, allow_negative_numbers = true)]
        degrees: i32,
    },
    /// Explodes an effect on a cell, hurting the player too.
    Explode {
        #[command(flatten)]
        cast: CastArgs,
        #[arg(long, value_parser = parse_cell)]
        at: CellCoord,
        #[arg(long, default_value_t = 2)]
        radius: u32,
    },
    /// Applies an effect to every creature the player can see.
    Sweep(CastArgs),
    /// Lights the player's surroundings and room.
    Light(AreaArgs),
    /// Darkens the player's surroundings and room.
    Darken(AreaArgs),
    /// Tries to close every chasm in view.
    CloseChasms {
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        power: i32,
    },
}

#[derive(Debug, Args)]
struct CastArgs {
    /// What the effect does.
    #[arg(long, value_enum, default_value_t = Element::Hurt)]
    kind: Element,
    /// Damage dice, written like `3d6`.
    #[arg(long, default_value = "3d6", value_parser = parse_dice)]
    dice: Dice,
    /// Strength of status and terrain effects.
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    power: i32,
}

impl CastArgs {
    fn cast(&self) -> Cast {
        Cast::new(self.kind.into(), self.dice, self.power)
    }
}

#[derive(Debug, Args)]
struct AimedCast {
    #[command(flatten)]
    cast: CastArgs,
    /// Compass direction, or the confirmed target.
    #[arg(long, value_enum, default_value_t = Aim::Target)]
    aim: Aim,
}

#[derive(Debug, Args)]
struct AreaArgs {
    #[arg(long, default_value = "2d8", value_parser = parse_dice)]
    dice: Dice,
    #[arg(long, default_value_t = 2)]
    radius: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Element {
    Hurt,
    Fire,
    Cold,
    Poison,
    Dark,
    Light,
    Slow,
    Sleep,
    Confuse,
    Scare,
    KillWall,
    KillDoor,
    LockDoor,
    KillTrap,
}

impl From<Element> for EffectKind {
    fn from(element: Element) -> Self {
        match element {
            Element::Hurt => EffectKind::Hurt,
            Element::Fire => EffectKind::Fire,
            Element::Cold => EffectKind::Cold,
            Element::Poison => EffectKind::Poison,
            Element::Dark => EffectKind::Darkness,
            Element::Light => EffectKind::Light,
            Element::Slow => EffectKind::Slow,
            Element::Sleep => EffectKind::Sleep,
            Element::Confuse => EffectKind::Confuse,
            Element::Scare => EffectKind::Scare,
            Element::KillWall => EffectKind::KillWall,
            Element::KillDoor => EffectKind::KillDoor,
            Element::LockDoor => EffectKind::LockDoor,
            Element::KillTrap => EffectKind::KillTrap,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Aim {
    Target,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl From<Aim> for Direction {
    fn from(aim: Aim) -> Self {
        match aim {
            Aim::Target => Direction::Target,
            Aim::North => Direction::North,
            Aim::NorthEast => Direction::NorthEast,
            Aim::East => Direction::East,
            Aim::SouthEast => Direction::SouthEast,
            Aim::South => Direction::South,
            Aim::SouthWest => Direction::SouthWest,
            Aim::West => Direction::West,
            Aim::NorthWest => Direction::NorthWest,
        }
    }
}

/// Entry point for the Cavefall command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    let mut world = scenario
        .build()
        .with_context(|| format!("failed to build scenario {}", cli.scenario.display()))?;
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut events = Vec::new();

    let noticed = run(&mut world, cli.action, &mut rng, &mut events)?;
    if events.contains(&Event::ViewUpdateRequested) {
        world::apply(&mut world, Command::RefreshView, &mut events);
    }

    for event in &events {
        match event {
            Event::Message { text } => println!("{text}"),
            Event::CommandRejected { reason } => log::warn!("command rejected: {reason}"),
            other => log::trace!("{other:?}"),
        }
    }
    if !noticed {
        println!("Nothing obvious happens.");
    }
    print!("{}", render::map(&world));
    print!("{}", render::status(&world));
    Ok(())
}

fn run(
    world: &mut World,
    action: Action,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Event>,
) -> Result<bool> {
    let projector = Projector::new();
    let noticed = match action {
        Action::Quake { at, radius, pit } => {
            let center = at_or_player(world, at)?;
            let quake = Quake {
                center,
                radius,
                pit,
                instigator: EffectSource::Player,
            };
            let report = Earthquake::new().handle(world, quake, rng, out);
            !report.surface
        }
        Action::Destroy { at, radius } => {
            let center = at_or_player(world, at)?;
            Earthquake::new().destroy_area(world, center, radius, rng, out)
        }
        Action::Bolt(aimed) => {
            projector.fire_bolt(world, aimed.cast.cast(), aimed.aim.into(), rng, out)
        }
        Action::Beam(aimed) => {
            projector.fire_beam(world, aimed.cast.cast(), aimed.aim.into(), rng, out)
        }
        Action::Ball {
            aimed,
            radius,
            unconfirmed,
        } => projector.fire_ball(
            world,
            aimed.cast.cast(),
            aimed.aim.into(),
            radius,
            !unconfirmed,
            rng,
            out,
        ),
        Action::Arc {
            aimed,
            radius,
            degrees,
        } => projector.fire_arc(
            world,
            aimed.cast.cast(),
            aimed.aim.into(),
            radius,
            degrees,
            rng,
            out,
        ),
        Action::Explode { cast, at, radius } => {
            projector.explosion(world, EffectSource::Environment, at, radius, cast.cast(), rng, out)
        }
        Action::Sweep(cast) => projector.affect_visible_creatures(world, cast.cast(), rng, out),
        Action::Light(area) => light_area(&projector, world, area.dice, area.radius, rng, out),
        Action::Darken(area) => darken_area(&projector, world, area.dice, area.radius, rng, out),
        Action::CloseChasms { power } => close_chasms(world, power, rng, out),
    };
    Ok(noticed)
}

fn at_or_player(world: &World, at: Option<CellCoord>) -> Result<CellCoord> {
    if let Some(cell) = at {
        return Ok(cell);
    }
    match query::player_cell(world) {
        Some(cell) => Ok(cell),
        None => bail!("scenario has no player; pass --at"),
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (row, column) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COLUMN but got '{value}'"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row '{row}': {error}"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column '{column}': {error}"))?;
    Ok(CellCoord::new(row, column))
}

fn parse_dice(value: &str) -> Result<Dice, String> {
    let (count, sides) = value
        .split_once(['d', 'D'])
        .ok_or_else(|| format!("expected dice like 3d6 but got '{value}'"))?;
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid dice count '{count}': {error}"))?;
    let sides = sides
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid dice sides '{sides}': {error}"))?;
    Ok(Dice::new(count, sides))
}
