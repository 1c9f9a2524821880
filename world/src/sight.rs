//! Digital lines and line of sight across the grid.

use cavefall_core::CellCoord;

use crate::{query, World};

/// Successive cells of the digital line leaving `origin` through `towards`.
///
/// The line does not include its origin and keeps going past `towards`,
/// one cell per step along the major axis. It ends when a coordinate would
/// become negative; callers bound it by range and grid size.
#[derive(Clone, Debug)]
pub struct DigitalLine {
    origin: (i64, i64),
    delta: (i64, i64),
    major: i64,
    step: i64,
}

impl DigitalLine {
    /// Creates a line from `origin` aimed through `towards`.
    ///
    /// A line aimed at its own origin is empty.
    #[must_use]
    pub fn new(origin: CellCoord, towards: CellCoord) -> Self {
        let origin = (i64::from(origin.row()), i64::from(origin.column()));
        let delta = (
            i64::from(towards.row()) - origin.0,
            i64::from(towards.column()) - origin.1,
        );
        Self {
            origin,
            delta,
            major: delta.0.abs().max(delta.1.abs()),
            step: 0,
        }
    }

    /// Number of steps needed to reach the aimed-through cell.
    #[must_use]
    pub fn span(&self) -> u32 {
        u32::try_from(self.major).unwrap_or(u32::MAX)
    }
}

impl Iterator for DigitalLine {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.major == 0 {
            return None;
        }
        self.step += 1;
        let row = self.origin.0 + scaled(self.step, self.delta.0, self.major);
        let column = self.origin.1 + scaled(self.step, self.delta.1, self.major);
        let row = u32::try_from(row).ok()?;
        let column = u32::try_from(column).ok()?;
        Some(CellCoord::new(row, column))
    }
}

// Rounds `step * delta / major` half away from zero.
fn scaled(step: i64, delta: i64, major: i64) -> i64 {
    let numerator = 2 * step * delta;
    let denominator = 2 * major;
    if numerator >= 0 {
        (numerator + major) / denominator
    } else {
        -((-numerator + major) / denominator)
    }
}

/// Reports whether `to` can be seen from `from`.
///
/// Every cell strictly between the two must be passable. The end points
/// themselves may be walls, so walls bordering a visible area are seen.
#[must_use]
pub fn los(world: &World, from: CellCoord, to: CellCoord) -> bool {
    if !query::contains(world, from) || !query::contains(world, to) {
        return false;
    }
    if from.chebyshev_distance(to) <= 1 {
        return true;
    }
    let line = DigitalLine::new(from, to);
    let between = usize::try_from(line.span().saturating_sub(1)).unwrap_or(0);
    line.take(between)
        .all(|cell| query::is_passable(world, cell))
}
