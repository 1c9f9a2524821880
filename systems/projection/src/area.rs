//! Effects applied to everything the player can see, without aiming.

use cavefall_core::{
    CellCoord, Dice, EffectKind, EffectSource, Event, ProjectFlags, MAX_RANGE, MAX_SIGHT,
};
use cavefall_world::{combat::CombatRules, query, sight, World};
use rand::RngCore;

use crate::{dispatch::Aim, Cast, Projector};

impl<C: CombatRules> Projector<C> {
    /// Applies `cast` to every creature within range and sight of the player.
    ///
    /// Returns whether any application was noticed.
    pub fn affect_visible_creatures(
        &self,
        world: &mut World,
        cast: Cast,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(origin) = query::player_cell(world) else {
            return false;
        };
        self.affect_creatures_in_view_of(world, EffectSource::Player, origin, cast, rng, out)
    }

    /// Applies `cast` to every creature within range and sight of `origin`.
    ///
    /// A creature standing on `origin` is skipped.
    pub fn affect_creatures_in_view_of(
        &self,
        world: &mut World,
        source: EffectSource,
        origin: CellCoord,
        cast: Cast,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let flags = ProjectFlags::JUMP | ProjectFlags::KILL | ProjectFlags::HIDE;
        let targets: Vec<CellCoord> = query::creatures(world)
            .into_iter()
            .map(|creature| creature.cell)
            .filter(|cell| *cell != origin)
            .filter(|cell| origin.distance(*cell) <= MAX_RANGE)
            .filter(|cell| sight::los(world, origin, *cell))
            .collect();

        let mut noticed = false;
        for target in targets {
            let aim = Aim::at(origin, target);
            noticed |= self.project(world, source, aim, 0, cast, flags, 0, rng, out);
        }
        noticed
    }

    /// Applies `cast` to every cell within sight range and line of sight of
    /// the player, including the terrain, items and creatures there.
    pub fn affect_visible_cells(
        &self,
        world: &mut World,
        cast: Cast,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(origin) = query::player_cell(world) else {
            return false;
        };
        let flags = ProjectFlags::JUMP
            | ProjectFlags::GRID
            | ProjectFlags::ITEM
            | ProjectFlags::KILL
            | ProjectFlags::HIDE;
        let Ok(reach) = i32::try_from(MAX_SIGHT) else {
            return false;
        };

        let mut targets = Vec::new();
        for row in -reach..=reach {
            for column in -reach..=reach {
                let Some(cell) = origin.offset(row, column) else {
                    continue;
                };
                if !query::contains(world, cell) || origin.distance(cell) > MAX_SIGHT {
                    continue;
                }
                if sight::los(world, origin, cell) {
                    targets.push(cell);
                }
            }
        }

        let mut noticed = false;
        for target in targets {
            noticed |= self.project(
                world,
                EffectSource::Player,
                Aim::at(origin, target),
                0,
                cast,
                flags,
                0,
                rng,
                out,
            );
        }
        noticed
    }

    /// Tries to slow every creature the player can see.
    pub fn slow_creatures(
        &self,
        world: &mut World,
        power: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::Slow, Dice::default(), power);
        self.affect_visible_creatures(world, cast, rng, out)
    }

    /// Tries to put every creature the player can see to sleep.
    pub fn sleep_creatures(
        &self,
        world: &mut World,
        power: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::Sleep, Dice::default(), power);
        self.affect_visible_creatures(world, cast, rng, out)
    }

    /// Fills in every pit the player can see.
    pub fn destroy_traps(
        &self,
        world: &mut World,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::KillTrap, Dice::default(), 0);
        self.affect_visible_cells(world, cast, rng, out)
    }

    /// Tries to open every door the player can see.
    pub fn open_doors(
        &self,
        world: &mut World,
        power: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::KillDoor, Dice::default(), power);
        self.affect_visible_cells(world, cast, rng, out)
    }

    /// Tries to lock every closed door the player can see.
    pub fn lock_doors(
        &self,
        world: &mut World,
        power: i32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let cast = Cast::new(EffectKind::LockDoor, Dice::default(), power);
        self.affect_visible_cells(world, cast, rng, out)
    }
}
