//! Directional entry points: bolts, beams, balls and arcs cast by the player.

use cavefall_core::{
    CellCoord, Dice, Direction, EffectDescriptor, EffectKind, EffectSource, Event, ProjectFlags,
    MAX_BALL_RADIUS, MAX_RANGE, MAX_SIGHT,
};
use cavefall_world::{chance, combat::CombatRules, query, World};
use rand::RngCore;

use crate::{caster_cell, Cast, Projector};

/// Resolves a symbolic direction into the cell an effect from `origin` aims at.
///
/// [`Direction::Target`] aims at the confirmed target when there is one. The
/// vertical pseudo-directions, and targeting without a target, aim at the
/// origin itself. Compass directions aim up to [`MAX_RANGE`] steps away,
/// shortened so the aim stays on the grid without bending the line.
#[must_use]
pub fn resolve_target(world: &World, origin: CellCoord, direction: Direction) -> CellCoord {
    if direction == Direction::Target {
        return query::target(world).unwrap_or(origin);
    }
    let Some((row_step, column_step)) = direction.delta() else {
        return origin;
    };
    let mut aim = origin;
    for _ in 0..MAX_RANGE {
        let Some(next) = aim.offset(row_step, column_step) else {
            break;
        };
        if !query::contains(world, next) {
            break;
        }
        aim = next;
    }
    aim
}

impl<C: CombatRules> Projector<C> {
    /// Fires a bolt that stops at the first occupant in its way.
    pub fn fire_bolt(
        &self,
        world: &mut World,
        cast: Cast,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        self.project_from_player(world, cast, direction, 0, bolt_flags(), 0, rng, out)
    }

    /// Fires a beam that affects every occupant along its line.
    pub fn fire_beam(
        &self,
        world: &mut World,
        cast: Cast,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        self.project_from_player(world, cast, direction, 0, beam_flags(), 0, rng, out)
    }

    /// Fires a beam with `beam_chance` percent probability, a bolt otherwise.
    pub fn fire_bolt_or_beam(
        &self,
        world: &mut World,
        beam_chance: u32,
        cast: Cast,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        if chance::percent_chance(rng, beam_chance) {
            self.fire_beam(world, cast, direction, rng, out)
        } else {
            self.fire_bolt(world, cast, direction, rng, out)
        }
    }

    /// Fires a ball that explodes where it lands, clamping the radius to
    /// [`MAX_BALL_RADIUS`].
    ///
    /// Unless `confirmed_target` is set, the ball explodes at the first
    /// occupant it meets instead of flying on to the aimed cell.
    #[allow(clippy::too_many_arguments)]
    pub fn fire_ball(
        &self,
        world: &mut World,
        cast: Cast,
        direction: Direction,
        radius: u32,
        confirmed_target: bool,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let radius = radius.min(MAX_BALL_RADIUS);
        let mut flags = ball_flags();
        if !confirmed_target {
            flags |= ProjectFlags::STOP;
        }
        self.project_from_player(world, cast, direction, radius, flags, 0, rng, out)
    }

    /// Fires a sector of `degrees` width spreading `radius` cells from the player.
    ///
    /// A zero radius reaches as far as the player can see. Widths of zero or
    /// less fire a beam of that length; widths of a full circle or more fire
    /// an unconfirmed ball.
    #[allow(clippy::too_many_arguments)]
    pub fn fire_arc(
        &self,
        world: &mut World,
        cast: Cast,
        direction: Direction,
        radius: u32,
        degrees: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let radius = if radius == 0 { MAX_SIGHT } else { radius };
        if degrees <= 0 {
            let flags = beam_flags();
            return self.project_from_player(world, cast, direction, radius, flags, 0, rng, out);
        }
        if degrees >= 360 {
            return self.fire_ball(world, cast, direction, radius, false, rng, out);
        }
        let flags = ProjectFlags::ARC
            | ProjectFlags::BOOM
            | ProjectFlags::GRID
            | ProjectFlags::ITEM
            | ProjectFlags::KILL;
        self.project_from_player(world, cast, direction, radius, flags, degrees, rng, out)
    }

    /// Fires a beam of light that also lights the cells it crosses.
    pub fn light_line(
        &self,
        world: &mut World,
        dice: Dice,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::Light, dice, 0);
        let flags = beam_flags() | ProjectFlags::GRID;
        self.project_from_player(world, cast, direction, 0, flags, 0, rng, out)
    }

    /// Fires a beam that shatters walls, rubble and doors along its line.
    pub fn shatter_line(
        &self,
        world: &mut World,
        power: i32,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::KillWall, Dice::default(), power);
        let flags = beam_flags() | ProjectFlags::GRID;
        self.project_from_player(world, cast, direction, 0, flags, 0, rng, out)
    }

    /// Fires a beam that unlocks, opens or breaks the doors along its line.
    pub fn destroy_door(
        &self,
        world: &mut World,
        power: i32,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::KillDoor, Dice::default(), power);
        self.project_from_player(world, cast, direction, 0, terrain_beam_flags(), 0, rng, out)
    }

    /// Fires a beam that disarms the traps along its line.
    pub fn disarm_trap(
        &self,
        world: &mut World,
        direction: Direction,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::KillTrap, Dice::default(), 0);
        self.project_from_player(world, cast, direction, 0, terrain_beam_flags(), 0, rng, out)
    }

    /// Explodes an effect centred on `center`, hurting everything in range,
    /// the player included.
    #[allow(clippy::too_many_arguments)]
    pub fn explosion(
        &self,
        world: &mut World,
        source: EffectSource,
        center: CellCoord,
        radius: u32,
        cast: Cast,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let flags = ProjectFlags::BOOM
            | ProjectFlags::GRID
            | ProjectFlags::JUMP
            | ProjectFlags::ITEM
            | ProjectFlags::KILL
            | ProjectFlags::PLAY;
        self.project(world, source, Aim::at(center, center), radius, cast, flags, 0, rng, out)
    }

    #[allow(clippy::too_many_arguments)]
    fn project_from_player(
        &self,
        world: &mut World,
        cast: Cast,
        direction: Direction,
        range: u32,
        flags: ProjectFlags,
        degrees: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(origin) = caster_cell(world, EffectSource::Player) else {
            return false;
        };
        let aim = Aim {
            origin,
            target: resolve_target(world, origin, direction),
            heading: Some(direction),
        };
        self.project(
            world,
            EffectSource::Player,
            aim,
            range,
            cast,
            flags,
            degrees,
            rng,
            out,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn project(
        &self,
        world: &mut World,
        source: EffectSource,
        aim: Aim,
        range: u32,
        cast: Cast,
        mut flags: ProjectFlags,
        degrees: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        if cast.kind == EffectKind::KillWall {
            flags |= ProjectFlags::WALL;
        }
        let effect = EffectDescriptor {
            source,
            origin: aim.origin,
            target: aim.target,
            range,
            dice: cast.dice,
            power: cast.power,
            kind: cast.kind,
            affects: flags.affects(),
            uniform: false,
            hidden: flags.is_hidden(),
            heading: aim.heading,
        };
        self.propagate(world, flags.shape(degrees), &effect, rng, out)
            .noticed
    }
}

// Where an effect starts and where it is headed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Aim {
    origin: CellCoord,
    target: CellCoord,
    heading: Option<Direction>,
}

impl Aim {
    pub(crate) const fn at(origin: CellCoord, target: CellCoord) -> Self {
        Self {
            origin,
            target,
            heading: None,
        }
    }
}

fn bolt_flags() -> ProjectFlags {
    ProjectFlags::STOP | ProjectFlags::KILL
}

fn beam_flags() -> ProjectFlags {
    ProjectFlags::BEAM | ProjectFlags::KILL
}

fn ball_flags() -> ProjectFlags {
    ProjectFlags::BOOM | ProjectFlags::GRID | ProjectFlags::ITEM | ProjectFlags::KILL
}

fn terrain_beam_flags() -> ProjectFlags {
    ProjectFlags::BEAM | ProjectFlags::GRID | ProjectFlags::ITEM
}
