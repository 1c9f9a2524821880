#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Earthquakes and the destruction of whole areas of the dungeon.
//!
//! An earthquake pummels everything around its centre with debris that
//! weakens with distance, then reshapes the terrain of the cells left empty.
//! Cells beside chasms are the likeliest to cave in. It can also open a pit
//! under a chosen cell, letting the player dodge aside when there is room to
//! do so.

use cavefall_core::{
    CellCoord, CellFlags, Command, Condition, CreatureId, Dice, EffectDescriptor, EffectKind,
    EffectSource, Event, OccupantId, ProjectFlags, RaceFlags, TerrainKind, ALERTNESS_ALERT,
    ALERTNESS_VERY_ALERT, DEEPEST_ENCOUNTER_DEPTH, MAX_EARTHQUAKE_RADIUS, MAX_SIGHT,
};
use cavefall_system_projection::Projector;
use cavefall_world::{
    apply, chance,
    combat::{CombatRules, StandardCombat},
    query, World,
};
use rand::RngCore;

/// Faces on each debris die.
pub const DEBRIS_SIDES: u32 = 8;

const SURFACE_MESSAGE: &str = "The ground shakes for a moment.";

/// Tuning knobs controlling how hard the ground hits.
#[derive(Clone, Debug)]
pub struct QuakeTuning {
    /// Stun added per point of net debris damage.
    pub stun_per_damage: i32,
    /// Alertness gained by creatures surviving a hit.
    pub alert_bonus: i32,
    /// Damage taken when falling into a freshly opened pit.
    pub pit_fall: Dice,
    /// Dice of blindness inflicted by the flash of a destroyed area.
    pub destruction_blindness: Dice,
    /// Distance from the centre within which every creature hears the quake.
    pub noise_radius: u32,
}

impl Default for QuakeTuning {
    fn default() -> Self {
        Self {
            stun_per_damage: 4,
            alert_bonus: 10,
            pit_fall: Dice::new(2, 4),
            destruction_blindness: Dice::new(4, 4),
            noise_radius: MAX_SIGHT,
        }
    }
}

/// Parameters of one earthquake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quake {
    /// Cell the quake is centred on. It is spared itself.
    pub center: CellCoord,
    /// Reach of the quake, clamped to [`MAX_EARTHQUAKE_RADIUS`].
    pub radius: u32,
    /// Cell that collapses into a pit, if any.
    pub pit: Option<CellCoord>,
    /// Who caused the quake.
    pub instigator: EffectSource,
}

/// What an earthquake did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuakeReport {
    /// The quake struck the surface and only shook the ground.
    pub surface: bool,
    /// Cell the player dodged to from the collapsing pit.
    pub dodged_to: Option<CellCoord>,
    /// The player fell into the freshly opened pit.
    pub fell_into_pit: bool,
    /// Cells whose terrain changed during the sweep.
    pub mutated: Vec<CellCoord>,
}

/// Earthquake system, consulting `C` for protection rolls.
#[derive(Clone, Debug, Default)]
pub struct Earthquake<C = StandardCombat> {
    rules: C,
    tuning: QuakeTuning,
}

impl Earthquake<StandardCombat> {
    /// Creates a new earthquake system with the standard combat formulas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: CombatRules> Earthquake<C> {
    /// Creates a new earthquake system with custom formulas and tuning.
    #[must_use]
    pub fn with_rules(rules: C, tuning: QuakeTuning) -> Self {
        Self { rules, tuning }
    }

    /// Shakes the ground around `quake.center`.
    pub fn handle(
        &self,
        world: &mut World,
        quake: Quake,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> QuakeReport {
        let mut report = QuakeReport::default();
        if query::depth(world) == 0 {
            say(out, SURFACE_MESSAGE);
            report.surface = true;
            return report;
        }

        let radius = quake.radius.min(MAX_EARTHQUAKE_RADIUS);
        let pit = quake.pit.filter(|cell| query::contains(world, *cell));
        if let Some(pit) = pit {
            self.open_pit(world, pit, &mut report, rng, out);
        }
        self.flash(world, quake.instigator, radius, rng, out);

        let Ok(reach) = i32::try_from(radius) else {
            return report;
        };
        for row in -reach..=reach {
            for column in -reach..=reach {
                let Some(cell) = quake.center.offset(row, column) else {
                    continue;
                };
                if cell == quake.center || !query::contains(world, cell) {
                    continue;
                }
                let distance = quake.center.chebyshev_distance(cell);
                if distance > radius {
                    continue;
                }

                let dice = debris_dice(radius, distance);
                let damage = chance::roll(rng, dice);
                let occupant = query::occupant(world, cell);
                match occupant {
                    Some(OccupantId::Player) => self.pummel_player(world, dice, damage, rng, out),
                    Some(OccupantId::Creature(id)) => {
                        self.pummel_creature(world, id, quake.instigator, dice, damage, rng, out);
                    }
                    None => {}
                }

                if occupant.is_some() || query::occupant(world, cell).is_some() {
                    continue;
                }
                if Some(cell) == pit || !chance::percent_chance(rng, damage) {
                    continue;
                }
                if self.collapse(world, cell, rng, out) {
                    report.mutated.push(cell);
                }
            }
        }

        if report.fell_into_pit {
            self.fall_into_pit(world, rng, out);
        }

        self.make_noise(world, quake.center, out);
        out.push(Event::ViewUpdateRequested);
        out.push(Event::MapRedrawRequested);
        out.push(Event::HealthBarRedrawRequested);

        log::debug!(
            "earthquake at {:?} radius {radius} reshaped {} cells",
            quake.center,
            report.mutated.len()
        );
        report
    }

    /// Obliterates everything within `radius` of `center` apart from the
    /// player, leaving fresh rock and floor behind.
    ///
    /// The radius is clamped to [`MAX_SIGHT`]. The roar wakes the creatures
    /// left standing nearby. Returns `false` when the call hit the surface
    /// and only shook the ground.
    pub fn destroy_area(
        &self,
        world: &mut World,
        center: CellCoord,
        radius: u32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        if query::depth(world) == 0 {
            say(out, SURFACE_MESSAGE);
            return false;
        }

        let radius = radius.min(MAX_SIGHT);
        let Ok(reach) = i32::try_from(radius) else {
            return false;
        };
        let mut flash = false;
        for row in -reach..=reach {
            for column in -reach..=reach {
                let Some(cell) = center.offset(row, column) else {
                    continue;
                };
                if !query::contains(world, cell) || center.distance(cell) > radius {
                    continue;
                }
                apply(
                    world,
                    Command::SetCellFlags {
                        cell,
                        flags: CellFlags::ROOM | CellFlags::LIT | CellFlags::SEEN,
                        enabled: false,
                    },
                    out,
                );
                match query::occupant(world, cell) {
                    Some(OccupantId::Player) => {
                        flash = true;
                        continue;
                    }
                    Some(OccupantId::Creature(creature)) if cell != center => {
                        apply(world, Command::RemoveCreature { creature }, out);
                    }
                    _ => {}
                }
                if cell == center || !query::is_mutable(world, cell) {
                    continue;
                }
                apply(world, Command::DestroyItem { cell }, out);
                let terrain = match chance::rand_int(rng, 200) {
                    0..=59 => TerrainKind::Wall,
                    60..=99 => TerrainKind::Quartz,
                    _ => TerrainKind::Floor,
                };
                apply(world, Command::SetTerrain { cell, terrain }, out);
            }
        }

        if flash {
            say(out, "There is a searing blast of light!");
            let turns = chance::roll(rng, self.tuning.destruction_blindness);
            apply(
                world,
                Command::BlindPlayer {
                    turns: i32::try_from(turns).unwrap_or(i32::MAX),
                },
                out,
            );
        }

        self.make_noise(world, center, out);
        out.push(Event::ViewUpdateRequested);
        out.push(Event::MapRedrawRequested);
        out.push(Event::HealthBarRedrawRequested);
        true
    }

    fn open_pit(
        &self,
        world: &mut World,
        pit: CellCoord,
        report: &mut QuakeReport,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) {
        if let Some(player) = query::player_cell(world) {
            let trapped = query::terrain(world, player) == Some(TerrainKind::PitTrap);
            if player == pit {
                let refuge = if trapped {
                    None
                } else {
                    choose_safe_square(world, pit, rng)
                };
                match refuge {
                    Some(refuge) => {
                        apply(
                            world,
                            Command::MoveOccupant {
                                from: pit,
                                to: refuge,
                            },
                            out,
                        );
                        report.dodged_to = Some(refuge);
                    }
                    None => report.fell_into_pit = true,
                }
            }
        }

        if query::is_mutable(world, pit) {
            apply(world, Command::DestroyItem { cell: pit }, out);
            apply(
                world,
                Command::SetTerrain {
                    cell: pit,
                    terrain: TerrainKind::PitTrap,
                },
                out,
            );
        }
    }

    // Shaking ground drawn over the player's surroundings, touching nothing.
    fn flash(
        &self,
        world: &mut World,
        source: EffectSource,
        radius: u32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) {
        let Some(player) = query::player_cell(world) else {
            return;
        };
        let flags = ProjectFlags::BOOM | ProjectFlags::PASS;
        let effect = EffectDescriptor {
            source,
            origin: player,
            target: player,
            range: radius,
            dice: Dice::default(),
            power: 0,
            kind: EffectKind::Earthquake,
            affects: flags.affects(),
            uniform: false,
            hidden: false,
            heading: None,
        };
        let _ = Projector::new().propagate(world, flags.shape(0), &effect, rng, out);
    }

    fn pummel_player(
        &self,
        world: &mut World,
        dice: Dice,
        damage: u32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) {
        say(out, "You are pummeled with debris!");
        let protection = self
            .rules
            .protection_roll(world, OccupantId::Player, EffectKind::Hurt, rng);
        let net = damage.saturating_sub(protection);
        out.push(Event::CombatRoll {
            target: OccupantId::Player,
            dice,
            rolled: damage,
            protection,
            net,
        });
        if net == 0 {
            return;
        }
        let net = i32::try_from(net).unwrap_or(i32::MAX);
        apply(world, Command::DamagePlayer { amount: net }, out);
        apply(
            world,
            Command::StunPlayer {
                amount: net.saturating_mul(self.tuning.stun_per_damage),
            },
            out,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn pummel_creature(
        &self,
        world: &mut World,
        id: CreatureId,
        instigator: EffectSource,
        dice: Dice,
        damage: u32,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) {
        let Some(creature) = query::creature(world, id) else {
            return;
        };
        let target = OccupantId::Creature(id);
        let protection = self
            .rules
            .protection_roll(world, target, EffectKind::Hurt, rng);
        let net = damage.saturating_sub(protection);
        out.push(Event::CombatRoll {
            target,
            dice,
            rolled: damage,
            protection,
            net,
        });
        if net == 0 {
            return;
        }

        let subject = creature.race.subject();
        if creature.visible {
            say(out, &format!("{subject} is hit by falling debris."));
        }
        let net = i32::try_from(net).unwrap_or(i32::MAX);
        apply(
            world,
            Command::DamageCreature {
                creature: id,
                amount: net,
            },
            out,
        );
        if query::creature(world, id).is_none() {
            if creature.visible {
                let text = if instigator == EffectSource::Player {
                    format!("You have killed {}.", creature.race.name)
                } else {
                    format!("{subject} is crushed.")
                };
                say(out, &text);
            }
            return;
        }

        if creature.race.flags.contains(RaceFlags::NO_STUN) {
            log::debug!("{} shrugs off the stun", creature.race.name);
        } else {
            apply(
                world,
                Command::AfflictCreature {
                    creature: id,
                    condition: Condition::Stun,
                    amount: net.saturating_mul(self.tuning.stun_per_damage),
                },
                out,
            );
        }
        let alertness = creature
            .alertness
            .saturating_add(self.tuning.alert_bonus)
            .max(ALERTNESS_VERY_ALERT);
        apply(
            world,
            Command::SetAlertness {
                creature: id,
                alertness,
            },
            out,
        );
    }

    fn collapse(
        &self,
        world: &mut World,
        cell: CellCoord,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) -> bool {
        if !query::is_mutable(world, cell) {
            return false;
        }
        let Some(current) = query::terrain(world, cell) else {
            return false;
        };
        apply(world, Command::DestroyItem { cell }, out);
        let adjacent_chasms = query::count_adjacent(world, cell, TerrainKind::Chasm);
        let next = mutate_terrain(current, adjacent_chasms, rng);
        let deepest = query::depth(world).saturating_add(1) >= DEEPEST_ENCOUNTER_DEPTH;
        if next == TerrainKind::Chasm && deepest {
            return false;
        }
        apply(
            world,
            Command::SetCellFlags {
                cell,
                flags: CellFlags::SEEN,
                enabled: false,
            },
            out,
        );
        if next == current {
            return false;
        }
        apply(world, Command::SetTerrain { cell, terrain: next }, out);
        true
    }

    fn fall_into_pit(&self, world: &mut World, rng: &mut dyn RngCore, out: &mut Vec<Event>) {
        let Some(player) = query::player_cell(world) else {
            return;
        };
        if query::terrain(world, player) != Some(TerrainKind::PitTrap) {
            return;
        }
        say(out, "You fall back into the newly made pit!");
        let damage = chance::roll(rng, self.tuning.pit_fall);
        out.push(Event::CombatRoll {
            target: OccupantId::Player,
            dice: self.tuning.pit_fall,
            rolled: damage,
            protection: 0,
            net: damage,
        });
        apply(
            world,
            Command::DamagePlayer {
                amount: i32::try_from(damage).unwrap_or(i32::MAX),
            },
            out,
        );
    }

    fn make_noise(&self, world: &mut World, center: CellCoord, out: &mut Vec<Event>) {
        for creature in query::creatures(world) {
            if center.distance(creature.cell) > self.tuning.noise_radius {
                continue;
            }
            if creature.alertness < ALERTNESS_ALERT {
                apply(
                    world,
                    Command::SetAlertness {
                        creature: creature.id,
                        alertness: ALERTNESS_ALERT,
                    },
                    out,
                );
            }
        }
    }
}

/// Makes every creature except `except` at least very alert.
pub fn wake_all_creatures(world: &mut World, except: Option<CreatureId>, out: &mut Vec<Event>) {
    for creature in query::creatures(world) {
        if Some(creature.id) == except || creature.alertness >= ALERTNESS_VERY_ALERT {
            continue;
        }
        apply(
            world,
            Command::SetAlertness {
                creature: creature.id,
                alertness: ALERTNESS_VERY_ALERT,
            },
            out,
        );
    }
}

/// Debris dice rolled at `distance` from the centre of a quake of `radius`.
#[must_use]
pub fn debris_dice(radius: u32, distance: u32) -> Dice {
    let count = (radius + 1).saturating_sub(distance);
    Dice::new(count, DEBRIS_SIDES)
}

/// Picks one empty, passable, solid-footed neighbour of `around` uniformly.
///
/// Chasms and pits are no refuge. Returns `None` when no neighbour qualifies.
pub fn choose_safe_square(
    world: &World,
    around: CellCoord,
    rng: &mut dyn RngCore,
) -> Option<CellCoord> {
    let mut chosen = None;
    let mut seen = 0;
    for cell in around.neighbors() {
        let Some(terrain) = query::terrain(world, cell) else {
            continue;
        };
        if !terrain.is_passable()
            || matches!(terrain, TerrainKind::Chasm | TerrainKind::PitTrap)
            || query::occupant(world, cell).is_some()
        {
            continue;
        }
        seen += 1;
        if chance::one_in(rng, seen) {
            chosen = Some(cell);
        }
    }
    chosen
}

/// Rolls the terrain a shaken cell turns into.
///
/// `adjacent_chasms` counts the chasms among the cell's neighbours; the more
/// there are, the likelier floor, rubble and rock cave in.
pub fn mutate_terrain(
    current: TerrainKind,
    adjacent_chasms: usize,
    rng: &mut dyn RngCore,
) -> TerrainKind {
    let adjacent = u32::try_from(adjacent_chasms).unwrap_or(u32::MAX);
    let roll = chance::rand_int(rng, 100);
    match current {
        TerrainKind::Chasm => {
            if !chance::one_in(rng, 10) {
                TerrainKind::Chasm
            } else if roll < 10 {
                TerrainKind::Rubble
            } else if roll < 70 {
                TerrainKind::Wall
            } else {
                TerrainKind::Quartz
            }
        }
        TerrainKind::Rubble => {
            if chance::die(rng, 32) <= adjacent {
                TerrainKind::Chasm
            } else if roll < 40 {
                TerrainKind::Floor
            } else if roll < 70 {
                TerrainKind::Wall
            } else {
                TerrainKind::Quartz
            }
        }
        terrain if terrain.is_passable() => {
            if chance::die(rng, 8) <= adjacent.saturating_add(1) {
                TerrainKind::Chasm
            } else if roll < 40 {
                TerrainKind::Rubble
            } else if roll < 80 {
                TerrainKind::Wall
            } else {
                TerrainKind::Quartz
            }
        }
        _ => {
            if chance::die(rng, 32) <= adjacent {
                TerrainKind::Chasm
            } else if roll < 80 {
                TerrainKind::Rubble
            } else {
                TerrainKind::Floor
            }
        }
    }
}

fn say(out: &mut Vec<Event>, text: &str) {
    out.push(Event::Message {
        text: text.to_owned(),
    });
}

#[cfg(test)]
mod tests {
    use super::{debris_dice, mutate_terrain};
    use cavefall_core::TerrainKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn debris_dice_never_grow_with_distance() {
        for radius in 0..=6 {
            for near in 0..=radius {
                for far in near..=radius {
                    assert!(
                        debris_dice(radius, near).count() >= debris_dice(radius, far).count(),
                        "radius {radius}: {near} vs {far}"
                    );
                }
            }
        }
        assert_eq!(debris_dice(3, 2).count(), 2);
        assert_eq!(debris_dice(3, 2).sides(), 8);
    }

    #[test]
    fn floor_ringed_by_chasms_always_caves_in() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(mutate_terrain(TerrainKind::Floor, 8, &mut rng), TerrainKind::Chasm);
        }
    }

    #[test]
    fn rubble_away_from_chasms_settles() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            let next = mutate_terrain(TerrainKind::Rubble, 0, &mut rng);
            assert!(
                matches!(next, TerrainKind::Floor | TerrainKind::Wall | TerrainKind::Quartz),
                "rubble became {next:?}"
            );
        }
    }

    #[test]
    fn rock_away_from_chasms_crumbles() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let next = mutate_terrain(TerrainKind::Wall, 0, &mut rng);
            assert!(
                matches!(next, TerrainKind::Rubble | TerrainKind::Floor),
                "wall became {next:?}"
            );
        }
    }

    #[test]
    fn rock_beside_chasms_can_cave_in() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let caved = (0..500)
            .filter(|_| mutate_terrain(TerrainKind::Quartz, 8, &mut rng) == TerrainKind::Chasm)
            .count();
        assert!(caved > 0, "an 8-in-32 chance never came up in 500 rolls");
    }

    #[test]
    fn chasms_mostly_stay_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut open = 0;
        for _ in 0..1000 {
            let next = mutate_terrain(TerrainKind::Chasm, 0, &mut rng);
            assert!(matches!(
                next,
                TerrainKind::Chasm | TerrainKind::Rubble | TerrainKind::Wall | TerrainKind::Quartz
            ));
            if next == TerrainKind::Chasm {
                open += 1;
            }
        }
        assert!(open > 800, "only {open} of 1000 chasms stayed open");
    }
}
