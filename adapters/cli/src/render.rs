//! Plain-text rendering of the world for the terminal.

use std::fmt::Write as _;

use cavefall_core::{CellCoord, OccupantId};
use cavefall_world::{query, World};

use crate::scenario::glyph_for;

const ITEM_GLYPH: char = '&';

/// Draws the whole map, one line per row.
pub(crate) fn map(world: &World) -> String {
    let (rows, columns) = query::dimensions(world);
    let mut out = String::with_capacity(usize::try_from((columns + 1) * rows).unwrap_or(0));
    for row in 0..rows {
        for column in 0..columns {
            out.push(glyph_at(world, CellCoord::new(row, column)));
        }
        out.push('\n');
    }
    out
}

/// Summarises the player and every creature left standing.
pub(crate) fn status(world: &World) -> String {
    let mut out = String::new();
    if let Some(player) = query::player(world) {
        let _ = writeln!(
            out,
            "player at ({}, {}): {}/{} hp, stun {}, blind {}",
            player.cell.row(),
            player.cell.column(),
            player.health,
            player.max_health,
            player.stun,
            player.blind
        );
    }
    for creature in query::creatures(world) {
        let _ = writeln!(
            out,
            "{} '{}' at ({}, {}): {}/{} hp, alertness {}, stun {}",
            creature.race.name,
            creature.race.glyph,
            creature.cell.row(),
            creature.cell.column(),
            creature.health,
            creature.max_health,
            creature.alertness,
            creature.stun
        );
    }
    out
}

fn glyph_at(world: &World, cell: CellCoord) -> char {
    match query::occupant(world, cell) {
        Some(OccupantId::Player) => return '@',
        Some(OccupantId::Creature(id)) => {
            if let Some(creature) = query::creature(world, id) {
                return creature.race.glyph;
            }
        }
        None => {}
    }
    if query::item(world, cell).is_some() {
        return ITEM_GLYPH;
    }
    query::terrain(world, cell).map_or(' ', glyph_for)
}
