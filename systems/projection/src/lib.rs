#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projection of spell-like effects across the dungeon grid.
//!
//! [`Projector::propagate`] is the single primitive every effect funnels
//! into: it works out which cells an [`EffectShape`] reaches, then applies
//! the effect to terrain, items, creatures and the player in that order. The
//! directional entry points (bolts, beams, balls, arcs) and the area helpers
//! are thin layers that build an [`EffectDescriptor`] and pick a shape.

use std::cmp::Ordering;

use cavefall_core::{
    CellCoord, Dice, Direction, EffectDescriptor, EffectKind, EffectShape, EffectSource, Event,
    OccupantId, MAX_BLAST_CELLS, MAX_RANGE, MAX_SIGHT,
};
use cavefall_world::{
    combat::{CombatRules, StandardCombat},
    query,
    sight::{self, DigitalLine},
    World,
};
use rand::RngCore;

mod area;
mod dispatch;
mod effects;

pub use dispatch::resolve_target;

/// Damage, strength and kind of an effect before it is aimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cast {
    /// Kind of damage or status applied.
    pub kind: EffectKind,
    /// Damage dice at the centre of the effect.
    pub dice: Dice,
    /// Strength pitted against resistance and terrain checks.
    pub power: i32,
}

impl Cast {
    /// Creates a new cast description.
    #[must_use]
    pub const fn new(kind: EffectKind, dice: Dice, power: i32) -> Self {
        Self { kind, dice, power }
    }
}

/// Cell reached by an effect, with its distance from the epicentre.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlastCell {
    /// Reached cell.
    pub cell: CellCoord,
    /// Distance from the epicentre, zero for cells on a line.
    pub distance: u32,
}

/// Cells an effect reaches, nearest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blast {
    epicenter: CellCoord,
    cells: Vec<BlastCell>,
}

impl Blast {
    /// Cell the explosion is centred on, or where a line stopped.
    #[must_use]
    pub fn epicenter(&self) -> CellCoord {
        self.epicenter
    }

    /// Reached cells ordered by distance from the epicentre.
    #[must_use]
    pub fn cells(&self) -> &[BlastCell] {
        &self.cells
    }

    /// Reached coordinates ordered by distance from the epicentre.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().map(|blast| blast.cell)
    }
}

/// Result of propagating one effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Propagation {
    /// Cells the effect reached.
    pub blast: Blast,
    /// Whether the player noticed anything happen.
    pub noticed: bool,
}

/// Propagates effects through the world, consulting `C` for combat formulas.
#[derive(Clone, Debug, Default)]
pub struct Projector<C = StandardCombat> {
    rules: C,
}

impl Projector<StandardCombat> {
    /// Creates a new projector backed by the standard combat formulas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: CombatRules> Projector<C> {
    /// Creates a new projector backed by custom combat formulas.
    #[must_use]
    pub fn with_rules(rules: C) -> Self {
        Self { rules }
    }

    /// Sends an effect across the grid and applies it to everything it reaches.
    ///
    /// Terrain is affected first, then items, then creatures, then the player,
    /// who is affected at most once.
    pub fn propagate(
        &self,
        world: &mut World,
        shape: EffectShape,
        effect: &EffectDescriptor,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> Propagation {
        let blast = blast_cells(world, shape, effect);
        if !effect.hidden && !blast.cells.is_empty() {
            out.push(Event::BlastDrawn {
                cells: blast.coords().collect(),
            });
        }

        let mut noticed = false;
        if effect.affects.terrain {
            for reached in &blast.cells {
                noticed |= effects::affect_terrain(world, effect, reached.cell, rng, out);
            }
        }
        if effect.affects.items {
            for reached in &blast.cells {
                noticed |= effects::affect_item(world, effect, reached.cell, out);
            }
        }
        if effect.affects.creatures {
            for reached in &blast.cells {
                let dice = ring_dice(effect, reached.distance);
                noticed |=
                    effects::affect_creature(&self.rules, world, effect, reached, dice, rng, out);
            }
        }
        if effect.affects.player {
            let hit = blast
                .cells
                .iter()
                .find(|reached| query::occupant(world, reached.cell) == Some(OccupantId::Player));
            if let Some(reached) = hit {
                let dice = ring_dice(effect, reached.distance);
                noticed |= effects::affect_player(&self.rules, world, effect, dice, rng, out);
            }
        }

        log::debug!(
            "{:?} {:?} from {:?} reached {} cells",
            effect.kind,
            shape,
            effect.origin,
            blast.cells.len()
        );
        Propagation { blast, noticed }
    }
}

/// Works out which cells an effect of `shape` reaches, without applying it.
#[must_use]
pub fn blast_cells(world: &World, shape: EffectShape, effect: &EffectDescriptor) -> Blast {
    let passes_walls = effect.affects.passes_walls;
    let mut epicenter = effect.origin;
    let mut cells = Vec::new();

    match shape {
        EffectShape::Point => {
            if query::contains(world, effect.target) {
                cells.push(BlastCell {
                    cell: effect.target,
                    distance: 0,
                });
            }
            return Blast {
                epicenter: effect.target,
                cells,
            };
        }
        EffectShape::Arc { .. } => {}
        EffectShape::Bolt | EffectShape::Beam | EffectShape::Ball { .. } => {
            let rules = match shape {
                EffectShape::Ball { stop_at_occupant } => PathRules {
                    range: MAX_RANGE,
                    stop_at_occupant,
                    stop_at_target: true,
                    passes_walls,
                },
                EffectShape::Bolt => PathRules {
                    range: clamp_range(effect.range),
                    stop_at_occupant: true,
                    stop_at_target: false,
                    passes_walls,
                },
                _ => PathRules {
                    range: clamp_range(effect.range),
                    stop_at_occupant: false,
                    stop_at_target: false,
                    passes_walls,
                },
            };
            let explodes = matches!(shape, EffectShape::Ball { .. });
            for cell in trace_path(world, effect.origin, effect.target, rules) {
                if explodes && !passes_walls && !query::is_passable(world, cell) {
                    break;
                }
                epicenter = cell;
                if shape == EffectShape::Beam {
                    cells.push(BlastCell { cell, distance: 0 });
                }
            }
            if shape != EffectShape::Beam && query::contains(world, epicenter) {
                cells.push(BlastCell {
                    cell: epicenter,
                    distance: 0,
                });
            }
        }
    }

    let sector = match shape {
        EffectShape::Arc { degrees } => Some(Sector::new(effect, degrees)),
        _ => None,
    };
    if matches!(shape, EffectShape::Ball { .. } | EffectShape::Arc { .. }) {
        explode(world, epicenter, effect, sector, &mut cells);
    }

    cells.sort_by(|left, right| left.distance.cmp(&right.distance));
    Blast { epicenter, cells }
}

fn explode(
    world: &World,
    epicenter: CellCoord,
    effect: &EffectDescriptor,
    sector: Option<Sector>,
    cells: &mut Vec<BlastCell>,
) {
    let radius = effect.range.min(MAX_SIGHT);
    let Ok(reach) = i32::try_from(radius) else {
        return;
    };
    let passes_walls = effect.affects.passes_walls;

    let mut reached = Vec::new();
    for row in -reach..=reach {
        for column in -reach..=reach {
            let Some(cell) = epicenter.offset(row, column) else {
                continue;
            };
            if cell == epicenter || !query::contains(world, cell) {
                continue;
            }
            let distance = epicenter.distance(cell);
            if distance > radius {
                continue;
            }
            if !passes_walls {
                if !query::is_passable(world, cell) && !effect.affects.walls {
                    continue;
                }
                if !sight::los(world, epicenter, cell) {
                    continue;
                }
            }
            if let Some(sector) = sector.as_ref() {
                if !sector.contains(cell) {
                    continue;
                }
            }
            reached.push(BlastCell { cell, distance });
        }
    }

    // The cap keeps the nearest cells.
    reached.sort_by_key(|blast| blast.distance);
    reached.truncate(MAX_BLAST_CELLS.saturating_sub(cells.len()));
    cells.append(&mut reached);
}

#[derive(Clone, Copy, Debug)]
struct PathRules {
    range: u32,
    stop_at_occupant: bool,
    stop_at_target: bool,
    passes_walls: bool,
}

// Cells travelled from `origin` towards `target`, the origin excluded.
fn trace_path(
    world: &World,
    origin: CellCoord,
    target: CellCoord,
    rules: PathRules,
) -> Vec<CellCoord> {
    let mut path = Vec::new();
    for cell in DigitalLine::new(origin, target) {
        if !query::contains(world, cell) || origin.distance(cell) > rules.range {
            break;
        }
        path.push(cell);
        if rules.stop_at_target && cell == target {
            break;
        }
        if !rules.passes_walls && !query::is_passable(world, cell) {
            break;
        }
        if rules.stop_at_occupant && query::occupant(world, cell).is_some() {
            break;
        }
    }
    path
}

fn clamp_range(range: u32) -> u32 {
    if range == 0 || range > MAX_RANGE {
        MAX_RANGE
    } else {
        range
    }
}

// Dice left at `distance` from the epicentre; two dice drop per step.
fn ring_dice(effect: &EffectDescriptor, distance: u32) -> Dice {
    if effect.uniform {
        return effect.dice;
    }
    let lost = distance.saturating_mul(2);
    effect.dice.with_count(effect.dice.count().saturating_sub(lost))
}

#[derive(Clone, Copy, Debug)]
struct Sector {
    origin: CellCoord,
    centerline: f64,
    half_width: f64,
}

impl Sector {
    // A compass heading outlives an aim point squeezed onto the origin at the grid edge.
    fn new(effect: &EffectDescriptor, degrees: i32) -> Self {
        let centerline = match effect.heading.and_then(Direction::delta) {
            Some((rows, columns)) => f64::from(rows).atan2(f64::from(columns)).to_degrees(),
            None => bearing(effect.origin, effect.target),
        };
        Self {
            origin: effect.origin,
            centerline,
            half_width: f64::from(degrees) / 2.0 + 3.0,
        }
    }

    fn contains(&self, cell: CellCoord) -> bool {
        let delta = (bearing(self.origin, cell) - self.centerline).abs() % 360.0;
        let delta = if delta > 180.0 { 360.0 - delta } else { delta };
        matches!(delta.partial_cmp(&self.half_width), Some(Ordering::Less))
    }
}

// Bearing in degrees from `from` to `to`, zero pointing east.
fn bearing(from: CellCoord, to: CellCoord) -> f64 {
    let rows = f64::from(to.row()) - f64::from(from.row());
    let columns = f64::from(to.column()) - f64::from(from.column());
    rows.atan2(columns).to_degrees()
}

fn caster_cell(world: &World, source: EffectSource) -> Option<CellCoord> {
    match source {
        EffectSource::Player => query::player_cell(world),
        EffectSource::Creature(id) => query::creature(world, id).map(|creature| creature.cell),
        EffectSource::Environment => None,
    }
}
