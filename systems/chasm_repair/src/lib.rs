#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Closing chasms back into solid floor.

use cavefall_core::{CellCoord, CellFlags, Command, Event, TerrainKind};
use cavefall_world::{
    apply, chance,
    marking::{self, MarkedCells},
    query, World,
};
use rand::RngCore;

/// Base difficulty of closing one chasm cell, raised by each chasm beside it.
pub const CLOSURE_DIFFICULTY: i32 = 20;

/// Attempts to close the chasm at `cell`, marking it in `marked` on success.
///
/// A cell ringed by chasm on all eight sides can never be closed. The cell
/// itself is left untouched so that sibling attempts see the same layout.
pub fn close_chasm(
    world: &mut World,
    cell: CellCoord,
    power: i32,
    rng: &mut dyn RngCore,
    marked: &mut MarkedCells,
) -> bool {
    let adjacent = query::count_adjacent(world, cell, TerrainKind::Chasm);
    if adjacent >= 8 {
        return false;
    }
    let difficulty = CLOSURE_DIFFICULTY + i32::try_from(adjacent).unwrap_or(8);
    if chance::skill_check(rng, power, difficulty) <= 0 {
        return false;
    }
    marking::mark_cell(world, cell, marked)
}

/// Attempts to close every chasm in view of the player.
///
/// Every attempt is judged against the layout before any chasm closes.
/// Returns whether any chasm closed.
pub fn close_chasms(
    world: &mut World,
    power: i32,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) -> bool {
    let (rows, columns) = query::dimensions(world);
    let mut marked = MarkedCells::new();
    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(row, column);
            if query::terrain(world, cell) == Some(TerrainKind::Chasm)
                && query::flags(world, cell).contains(CellFlags::VIEW)
            {
                let _ = close_chasm(world, cell, power, rng, &mut marked);
            }
        }
    }
    if marked.is_empty() {
        return false;
    }

    let cells = marking::clear_marks(world, marked);
    for cell in &cells {
        apply(
            world,
            Command::SetTerrain {
                cell: *cell,
                terrain: TerrainKind::Floor,
            },
            out,
        );
    }
    log::debug!("closed {} chasm cells with power {power}", cells.len());
    out.push(Event::ViewUpdateRequested);
    out.push(Event::MapRedrawRequested);
    true
}
