#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Permanent lighting and darkening of rooms.
//!
//! Rooms are found with the world's flood fill, contained to cells carrying
//! room membership. Changing the light of a room also stirs the creatures
//! standing in it.

use cavefall_core::{
    CellCoord, CellFlags, Command, CreatureId, Dice, EffectDescriptor, EffectKind, EffectSource,
    Event, OccupantId, ProjectFlags, RaceFlags, ALERTNESS_ALERT,
};
use cavefall_system_projection::Projector;
use cavefall_world::{
    apply, chance,
    combat::CombatRules,
    marking::{self, FillOptions},
    query, World,
};
use rand::RngCore;

/// Dice rolled for the alerting power of a sudden change of light.
pub const ALERTING_DICE: Dice = Dice::new(2, 10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lighting {
    Light,
    Dark,
}

/// Permanently lights the room containing `origin`.
///
/// Creatures in the room become more alert, never less. An origin outside
/// the grid, or outside any room, changes nothing.
pub fn light_room(
    world: &mut World,
    origin: CellCoord,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) {
    change_room(world, origin, Lighting::Light, rng, out);
}

/// Darkens the room containing `origin`, making the player forget its floor.
///
/// Creatures in the room become more alert, never less.
pub fn darken_room(
    world: &mut World,
    origin: CellCoord,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) {
    change_room(world, origin, Lighting::Dark, rng, out);
}

/// Lights the area around the player with a ball of weak light, then the
/// room the player stands in.
///
/// Returns whether the player noticed anything.
pub fn light_area<C: CombatRules>(
    projector: &Projector<C>,
    world: &mut World,
    dice: Dice,
    radius: u32,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) -> bool {
    let Some(player) = query::player(world) else {
        return false;
    };
    if player.blind == 0 {
        say(out, "You are surrounded by a white light.");
    }
    let flags = ProjectFlags::BOOM | ProjectFlags::GRID | ProjectFlags::KILL | ProjectFlags::PASS;
    let burst = Burst {
        kind: EffectKind::Light,
        dice,
        radius,
        flags,
    };
    let _ = burst.fire(projector, world, player.cell, rng, out);
    light_room(world, player.cell, rng, out);
    true
}

/// Darkens the area around the player, then the room the player stands in.
///
/// Returns whether the player noticed anything.
pub fn darken_area<C: CombatRules>(
    projector: &Projector<C>,
    world: &mut World,
    dice: Dice,
    radius: u32,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) -> bool {
    let Some(player) = query::player(world) else {
        return false;
    };
    if player.blind == 0 {
        say(out, "Darkness surrounds you.");
    }
    let burst = Burst {
        kind: EffectKind::Darkness,
        dice,
        radius,
        flags: ProjectFlags::BOOM | ProjectFlags::GRID | ProjectFlags::KILL,
    };
    let _ = burst.fire(projector, world, player.cell, rng, out);
    darken_room(world, player.cell, rng, out);
    true
}

fn change_room(
    world: &mut World,
    origin: CellCoord,
    lighting: Lighting,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) {
    let marked = marking::mark_area(world, origin, FillOptions::room());
    if marked.is_empty() {
        return;
    }

    for cell in marked.iter().copied() {
        match lighting {
            Lighting::Light => set_flags(world, cell, CellFlags::LIT, true, out),
            Lighting::Dark => {
                set_flags(world, cell, CellFlags::LIT, false, out);
                if query::terrain(world, cell).map_or(false, |terrain| terrain.is_boring()) {
                    set_flags(world, cell, CellFlags::SEEN, false, out);
                }
            }
        }
    }

    let cells = marking::clear_marks(world, marked);
    log::debug!("{lighting:?} applied to {} cells from {origin:?}", cells.len());
    out.push(Event::ViewUpdateRequested);
    out.push(Event::MapRedrawRequested);

    for cell in cells {
        if let Some(OccupantId::Creature(id)) = query::occupant(world, cell) {
            disturb(world, id, rng, out);
        }
    }
}

// Raises alertness of a creature that is not yet fully alert, capped at fully alert.
fn disturb(
    world: &mut World,
    id: CreatureId,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) {
    let Some(creature) = query::creature(world, id) else {
        return;
    };
    if creature.alertness >= ALERTNESS_ALERT {
        return;
    }
    let mut power = i32::try_from(chance::roll(rng, ALERTING_DICE)).unwrap_or(0);
    if creature.race.flags.contains(RaceFlags::MINDLESS) {
        power /= 2;
    }
    if creature.race.flags.contains(RaceFlags::SMART) {
        power *= 2;
    }
    let alertness = creature
        .alertness
        .saturating_add(power)
        .min(ALERTNESS_ALERT);
    apply(
        world,
        Command::SetAlertness {
            creature: id,
            alertness,
        },
        out,
    );
}

// Ball of light or darkness centred on the player.
struct Burst {
    kind: EffectKind,
    dice: Dice,
    radius: u32,
    flags: ProjectFlags,
}

impl Burst {
    fn fire<C: CombatRules>(
        &self,
        projector: &Projector<C>,
        world: &mut World,
        center: CellCoord,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        let effect = EffectDescriptor {
            source: EffectSource::Player,
            origin: center,
            target: center,
            range: self.radius,
            dice: self.dice,
            power: 0,
            kind: self.kind,
            affects: self.flags.affects(),
            uniform: false,
            hidden: self.flags.is_hidden(),
            heading: None,
        };
        projector
            .propagate(world, self.flags.shape(0), &effect, rng, out)
            .noticed
    }
}

fn set_flags(
    world: &mut World,
    cell: CellCoord,
    flags: CellFlags,
    enabled: bool,
    out: &mut Vec<Event>,
) {
    apply(
        world,
        Command::SetCellFlags {
            cell,
            flags,
            enabled,
        },
        out,
    );
}

fn say(out: &mut Vec<Event>, text: &str) {
    out.push(Event::Message {
        text: text.to_owned(),
    });
}
