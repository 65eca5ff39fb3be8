//! Selection utilities for choosing among replacement candidates.
//!
//! - [pick_uniform]: every candidate has probability `1/N`.
//! - [pick_first_triggered]: alternatives are tried in order, each against a fresh
//!   draw, and the first whose chance triggers wins.
//!
//! Pass an RNG that implements [rand::RngCore].
use rand::RngCore;

use crate::random::rand01;
use crate::replacer::WeightedAlternative;

/// Index of a uniformly chosen element of a pool of `len`; `None` for an empty pool.
pub fn uniform_index(len: usize, rng: &mut dyn RngCore) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = (rand01(rng) * len as f32) as usize;
    Some(index.min(len - 1))
}

pub fn pick_uniform<'a, T>(candidates: &'a [T], rng: &mut dyn RngCore) -> Option<&'a T> {
    uniform_index(candidates.len(), rng).map(|i| &candidates[i])
}

pub fn pick_first_triggered<'a>(
    alternatives: &'a [WeightedAlternative],
    rng: &mut dyn RngCore,
) -> Option<&'a WeightedAlternative> {
    alternatives.iter().find(|a| rand01(rng) < a.chance)
}

/// Sum of all alternative chances.
pub fn total_chance(alternatives: &[WeightedAlternative]) -> f32 {
    alternatives.iter().map(|a| a.chance).sum()
}
