//! Seam to the combat-formula layer.
//!
//! The effect systems only need two answers from combat: how much damage an
//! occupant shrugs off, and how its resistances scale damage of a given kind.
//! Hit points are then removed through the world's damage commands.

use cavefall_core::{EffectKind, OccupantId, RaceFlags};
use rand::RngCore;

use crate::{chance, query, World};

/// Damage reduction and resistance formulas consulted by effects.
pub trait CombatRules {
    /// Rolls the damage reduction `target` gets against an effect of `kind`.
    fn protection_roll(
        &self,
        world: &World,
        target: OccupantId,
        kind: EffectKind,
        rng: &mut dyn RngCore,
    ) -> u32;

    /// Scales `damage` of `kind` by the resistances of `target`.
    fn resisted_damage(
        &self,
        world: &World,
        target: OccupantId,
        kind: EffectKind,
        damage: u32,
    ) -> u32;
}

/// Protection rolls straight from the occupant's protection dice, with
/// resistant races taking a third of matching elemental damage.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardCombat;

impl CombatRules for StandardCombat {
    fn protection_roll(
        &self,
        world: &World,
        target: OccupantId,
        _kind: EffectKind,
        rng: &mut dyn RngCore,
    ) -> u32 {
        let dice = match target {
            OccupantId::Player => query::player(world).map(|player| player.protection),
            OccupantId::Creature(id) => {
                query::creature(world, id).map(|creature| creature.race.protection)
            }
        };
        dice.map_or(0, |dice| chance::roll(rng, dice))
    }

    fn resisted_damage(
        &self,
        world: &World,
        target: OccupantId,
        kind: EffectKind,
        damage: u32,
    ) -> u32 {
        let OccupantId::Creature(id) = target else {
            return damage;
        };
        let Some(creature) = query::creature(world, id) else {
            return damage;
        };
        let resistance = match kind {
            EffectKind::Fire => RaceFlags::RES_FIRE,
            EffectKind::Cold => RaceFlags::RES_COLD,
            EffectKind::Poison => RaceFlags::RES_POISON,
            _ => return damage,
        };
        if creature.race.flags.contains(resistance) {
            damage / 3
        } else {
            damage
        }
    }
}
