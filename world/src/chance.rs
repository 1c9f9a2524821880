//! Dice and probability helpers over an injected random source.

use cavefall_core::Dice;
use rand::{Rng, RngCore};

/// Rolls one die, returning a value in `1..=sides`, or zero for a faceless die.
pub fn die(rng: &mut dyn RngCore, sides: u32) -> u32 {
    if sides == 0 {
        0
    } else {
        rng.gen_range(1..=sides)
    }
}

/// Returns a value in `0..bound`, or zero for an empty range.
pub fn rand_int(rng: &mut dyn RngCore, bound: u32) -> u32 {
    if bound == 0 {
        0
    } else {
        rng.gen_range(0..bound)
    }
}

/// Sums a roll of every die in `dice`, saturating at `u32::MAX`.
pub fn roll(rng: &mut dyn RngCore, dice: Dice) -> u32 {
    (0..dice.count()).fold(0, |total: u32, _| total.saturating_add(die(rng, dice.sides())))
}

/// Succeeds with `percent` percent probability. Values of 100 or more always succeed.
pub fn percent_chance(rng: &mut dyn RngCore, percent: u32) -> bool {
    percent >= 100 || rand_int(rng, 100) < percent
}

/// Succeeds with probability `1 / denominator`.
pub fn one_in(rng: &mut dyn RngCore, denominator: u32) -> bool {
    denominator <= 1 || rand_int(rng, denominator) == 0
}

/// Contests `skill` against `difficulty`, each with a d10 added.
///
/// A positive result is a success by that margin.
pub fn skill_check(rng: &mut dyn RngCore, skill: i32, difficulty: i32) -> i32 {
    let skill_total = i64::from(die(rng, 10)) + i64::from(skill);
    let difficulty_total = i64::from(die(rng, 10)) + i64::from(difficulty);
    let margin = skill_total - difficulty_total;
    i32::try_from(margin).unwrap_or(if margin > 0 { i32::MAX } else { i32::MIN })
}
