use cavefall_core::{
    CellCoord, CellFlags, Command, Condition, Dice, EffectDescriptor, EffectKind, EffectSource,
    Event, OccupantId, RaceFlags, TerrainKind, ALERTNESS_ALERT, ALERTNESS_UNWARY,
};
use cavefall_world::{apply, chance, combat::CombatRules, query, World};
use rand::RngCore;

use crate::BlastCell;

const MAX_LOCK: i32 = 7;

pub(crate) fn affect_terrain(
    world: &mut World,
    effect: &EffectDescriptor,
    cell: CellCoord,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) -> bool {
    let Some(terrain) = query::terrain(world, cell) else {
        return false;
    };
    let seen = query::in_view(world, cell);

    match effect.kind {
        EffectKind::KillTrap => {
            if terrain != TerrainKind::PitTrap {
                return false;
            }
            if seen {
                say(out, "The pit is filled in.");
            }
            reshape(world, cell, TerrainKind::Floor, out);
            seen
        }
        EffectKind::KillDoor => match terrain {
            TerrainKind::ClosedDoor { lock } => {
                let margin = chance::skill_check(rng, effect.power, i32::from(lock));
                if margin <= 0 {
                    return false;
                }
                let opened = if margin <= 5 && lock > 0 {
                    if seen {
                        say(out, "You hear a 'click'.");
                    }
                    TerrainKind::ClosedDoor { lock: 0 }
                } else if margin <= 10 {
                    if seen {
                        say(out, "The door swings open.");
                    }
                    TerrainKind::OpenDoor
                } else {
                    if seen {
                        say(out, "The door is torn from its hinges!");
                    }
                    TerrainKind::BrokenDoor
                };
                reshape(world, cell, opened, out);
                seen
            }
            TerrainKind::SecretDoor | TerrainKind::Rubble => {
                if chance::skill_check(rng, effect.power, 0) <= 0 {
                    return false;
                }
                let cleared = if terrain == TerrainKind::Rubble {
                    TerrainKind::Floor
                } else {
                    TerrainKind::OpenDoor
                };
                reshape(world, cell, cleared, out);
                seen
            }
            _ => false,
        },
        EffectKind::KillWall => {
            let shattered = match terrain {
                TerrainKind::Wall | TerrainKind::Quartz => TerrainKind::Rubble,
                TerrainKind::Rubble => TerrainKind::Floor,
                TerrainKind::ClosedDoor { .. } | TerrainKind::SecretDoor => TerrainKind::BrokenDoor,
                _ => return false,
            };
            if chance::skill_check(rng, effect.power, 10) <= 0 {
                return false;
            }
            if seen {
                let text = match shattered {
                    TerrainKind::Rubble => "The wall turns into rubble!",
                    TerrainKind::Floor => "The rubble turns into dust!",
                    _ => "The door is shattered!",
                };
                say(out, text);
            }
            reshape(world, cell, shattered, out);
            seen
        }
        EffectKind::LockDoor => {
            let TerrainKind::ClosedDoor { lock } = terrain else {
                return false;
            };
            let margin = chance::skill_check(rng, effect.power, i32::from(lock));
            let strength = margin.min(MAX_LOCK);
            let Ok(strength) = u8::try_from(strength) else {
                return false;
            };
            if strength <= lock {
                return false;
            }
            reshape(world, cell, TerrainKind::ClosedDoor { lock: strength }, out);
            seen
        }
        EffectKind::Light => {
            if !seen {
                return false;
            }
            set_flags(world, cell, CellFlags::LIT | CellFlags::SEEN, true, out);
            true
        }
        EffectKind::Darkness => {
            set_flags(world, cell, CellFlags::LIT, false, out);
            let beside_player = query::player_cell(world)
                .map_or(false, |player| player.chebyshev_distance(cell) <= 1);
            if terrain.is_boring() && !beside_player {
                set_flags(world, cell, CellFlags::SEEN, false, out);
            }
            seen
        }
        _ => false,
    }
}

pub(crate) fn affect_item(
    world: &mut World,
    effect: &EffectDescriptor,
    cell: CellCoord,
    out: &mut Vec<Event>,
) -> bool {
    let Some(item) = query::item(world, cell) else {
        return false;
    };
    if item.artefact {
        return false;
    }
    let verb = match effect.kind {
        EffectKind::Fire if item.flammable => "burns up",
        EffectKind::Cold if item.fragile => "shatters",
        _ => return false,
    };
    let seen = query::in_view(world, cell);
    if seen {
        say(out, &format!("The {} {verb}!", item.name));
    }
    apply(world, Command::DestroyItem { cell }, out);
    seen
}

pub(crate) fn affect_creature(
    rules: &dyn CombatRules,
    world: &mut World,
    effect: &EffectDescriptor,
    reached: &BlastCell,
    dice: Dice,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) -> bool {
    let Some(OccupantId::Creature(id)) = query::occupant(world, reached.cell) else {
        return false;
    };
    if effect.source == EffectSource::Creature(id) {
        return false;
    }
    let Some(creature) = query::creature(world, id) else {
        return false;
    };
    let visible = creature.visible;
    let subject = creature.race.subject();
    let flags = creature.race.flags;

    let hurts = effect.kind.is_damaging()
        || (effect.kind == EffectKind::Light && flags.contains(RaceFlags::HURT_LIGHT));
    if hurts {
        if dice.is_zero() {
            return false;
        }
        let target = OccupantId::Creature(id);
        let rolled = chance::roll(rng, dice);
        let scaled = rules.resisted_damage(world, target, effect.kind, rolled);
        let protection = rules.protection_roll(world, target, effect.kind, rng);
        let net = scaled.saturating_sub(protection);
        out.push(Event::CombatRoll {
            target,
            dice,
            rolled,
            protection,
            net,
        });
        if net == 0 {
            if visible {
                say(out, &format!("{subject} is unharmed."));
            }
            return visible;
        }
        apply(
            world,
            Command::DamageCreature {
                creature: id,
                amount: i32::try_from(net).unwrap_or(i32::MAX),
            },
            out,
        );
        if query::creature(world, id).is_none() {
            if visible {
                say(out, &format!("{subject} dies."));
            }
        } else {
            if visible {
                say(out, &format!("{subject} {}", pain_phrase(effect.kind)));
            }
            if creature.alertness < ALERTNESS_ALERT {
                apply(
                    world,
                    Command::SetAlertness {
                        creature: id,
                        alertness: ALERTNESS_ALERT,
                    },
                    out,
                );
            }
        }
        return visible;
    }

    let (immunity, condition, phrase) = match effect.kind {
        EffectKind::Slow => (RaceFlags::NO_SLOW, Some(Condition::Slow), "starts moving slower."),
        EffectKind::Confuse => (
            RaceFlags::NO_CONFUSION,
            Some(Condition::Confusion),
            "looks confused.",
        ),
        EffectKind::Scare => (RaceFlags::NO_FEAR, Some(Condition::Fear), "flees in terror!"),
        EffectKind::Sleep => (RaceFlags::NO_SLEEP, None, "falls asleep."),
        _ => return false,
    };
    if flags.contains(immunity) {
        if visible {
            say(out, &format!("{subject} is unaffected."));
        }
        return visible;
    }
    let margin = chance::skill_check(rng, effect.power, creature.race.will);
    if margin <= 0 {
        if visible {
            say(out, &format!("{subject} resists."));
        }
        return visible;
    }
    let command = match condition {
        Some(condition) => Command::AfflictCreature {
            creature: id,
            condition,
            amount: margin.saturating_mul(2),
        },
        None => Command::SetAlertness {
            creature: id,
            alertness: creature
                .alertness
                .min(ALERTNESS_UNWARY.saturating_sub(margin)),
        },
    };
    apply(world, command, out);
    if visible {
        say(out, &format!("{subject} {phrase}"));
    }
    visible
}

pub(crate) fn affect_player(
    rules: &dyn CombatRules,
    world: &mut World,
    effect: &EffectDescriptor,
    dice: Dice,
    rng: &mut dyn RngCore,
    out: &mut Vec<Event>,
) -> bool {
    if !effect.kind.is_damaging() || dice.is_zero() {
        return false;
    }
    let rolled = chance::roll(rng, dice);
    let scaled = rules.resisted_damage(world, OccupantId::Player, effect.kind, rolled);
    let protection = rules.protection_roll(world, OccupantId::Player, effect.kind, rng);
    let net = scaled.saturating_sub(protection);
    let text = match effect.kind {
        EffectKind::Fire => "You are enveloped in flames!",
        EffectKind::Cold => "You are covered in frost!",
        EffectKind::Poison => "You are surrounded by poison!",
        _ => "You are hit!",
    };
    say(out, text);
    out.push(Event::CombatRoll {
        target: OccupantId::Player,
        dice,
        rolled,
        protection,
        net,
    });
    if net > 0 {
        apply(
            world,
            Command::DamagePlayer {
                amount: i32::try_from(net).unwrap_or(i32::MAX),
            },
            out,
        );
    }
    true
}

fn pain_phrase(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::Fire => "is burned.",
        EffectKind::Cold => "is frozen.",
        EffectKind::Poison => "is poisoned.",
        EffectKind::Light => "cringes from the light!",
        _ => "is hit.",
    }
}

fn reshape(world: &mut World, cell: CellCoord, terrain: TerrainKind, out: &mut Vec<Event>) {
    apply(world, Command::SetTerrain { cell, terrain }, out);
    out.push(Event::ViewUpdateRequested);
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
