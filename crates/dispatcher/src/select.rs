// SPDX-License-Identifier: MIT

//! Weighted-random agent selection.

use cronmesh_core::AgentDescriptor;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Picks one candidate with probability proportional to its weight.
/// Callers are expected to have already filtered out weight-0 (draining)
/// agents; an empty or all-zero-weight slice returns `None`.
pub fn weighted_choice<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[AgentDescriptor],
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let weights: Vec<u32> = candidates.iter().map(|c| c.weight).collect();
    if weights.iter().all(|&w| w == 0) {
        return None;
    }
    let dist = WeightedIndex::new(&weights).ok()?;
    Some(dist.sample(rng))
}

#[cfg(test)]
#[path = "select_tests.rs"]
mod tests;
