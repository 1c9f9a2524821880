//! Breadth-first flood fill that tags cells with the transient mark.
//!
//! A fill starts at an origin and spreads to all eight neighbours of every
//! passable cell it reaches. Impassable cells are marked but never spread, so
//! a fill over a room includes the walls around it. The transient mark both
//! guards against revisiting a cell and records membership; callers hand the
//! returned [`MarkedCells`] back to [`clear_marks`] before starting another
//! fill.

use cavefall_core::{CellCoord, CellFlags, MARK_CAPACITY};

use crate::World;

/// Constraints applied while a fill spreads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillOptions {
    /// Only cells belonging to a room may be marked.
    pub contain_to_room: bool,
    /// Largest king-move distance from the origin a marked cell may have.
    ///
    /// `None` and `Some(0)` both leave the fill unbounded.
    pub radius: Option<u32>,
}

impl FillOptions {
    /// Options for a fill that stays inside the origin's room.
    #[must_use]
    pub const fn room() -> Self {
        Self {
            contain_to_room: true,
            radius: None,
        }
    }

    /// Options for a fill bounded by `radius` king moves.
    #[must_use]
    pub const fn within(radius: u32) -> Self {
        Self {
            contain_to_room: false,
            radius: Some(radius),
        }
    }
}

/// Ordered set of cells tagged by one fill.
///
/// The cells keep the transient mark until the set is passed to
/// [`clear_marks`].
#[derive(Debug, Default, PartialEq, Eq)]
#[must_use = "marked cells keep their transient flag until passed to `clear_marks`"]
pub struct MarkedCells {
    cells: Vec<CellCoord>,
}

impl MarkedCells {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of marked cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates the marked cells in the order they were reached.
    pub fn iter(&self) -> impl Iterator<Item = &CellCoord> {
        self.cells.iter()
    }

    /// Reports whether the set holds `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

/// Floods outwards from `origin`, marking every cell the options admit.
///
/// An origin outside the grid, or outside a room when the fill is contained,
/// yields an empty set. The fill silently stops at [`MARK_CAPACITY`] cells.
pub fn mark_area(world: &mut World, origin: CellCoord, options: FillOptions) -> MarkedCells {
    let mut marked = MarkedCells::new();
    let radius = options.radius.filter(|radius| *radius > 0);

    let admits = |world: &World, cell: CellCoord| -> bool {
        let Some(slot) = world.cell(cell) else {
            return false;
        };
        if slot.flags.contains(CellFlags::MARKED) {
            return false;
        }
        if options.contain_to_room && !slot.flags.contains(CellFlags::ROOM) {
            return false;
        }
        radius.map_or(true, |radius| origin.chebyshev_distance(cell) <= radius)
    };

    if admits(&*world, origin) {
        let _ = mark_cell(world, origin, &mut marked);
    }

    let mut next = 0;
    while let Some(&cell) = marked.cells.get(next) {
        next += 1;
        let spreads = world
            .cell(cell)
            .map_or(false, |slot| slot.terrain.is_passable());
        if !spreads {
            continue;
        }
        for neighbor in cell.neighbors() {
            if admits(&*world, neighbor) && !mark_cell(world, neighbor, &mut marked) {
                log::warn!(
                    "flood fill from {origin:?} stopped at {} cells",
                    marked.len()
                );
                return marked;
            }
        }
    }

    log::trace!("flood fill from {origin:?} marked {} cells", marked.len());
    marked
}

/// Marks a single cell and appends it to `marked`.
///
/// Returns `false` without marking when the cell lies outside the grid, is
/// already marked, or the set is full.
pub fn mark_cell(world: &mut World, cell: CellCoord, marked: &mut MarkedCells) -> bool {
    if marked.len() >= MARK_CAPACITY {
        return false;
    }
    let Some(slot) = world.cell_mut(cell) else {
        return false;
    };
    if slot.flags.contains(CellFlags::MARKED) {
        return false;
    }
    slot.flags.insert(CellFlags::MARKED);
    marked.cells.push(cell);
    true
}

/// Removes the transient mark from every cell of the set.
///
/// The cells are handed back so callers can keep working with them once the
/// grid is clean again.
pub fn clear_marks(world: &mut World, marked: MarkedCells) -> Vec<CellCoord> {
    for cell in &marked.cells {
        if let Some(slot) = world.cell_mut(*cell) {
            slot.flags.remove(CellFlags::MARKED);
        }
    }
    marked.cells
}
