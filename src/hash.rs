use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::types::CycleId;

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

/// Derive the RNG seed for one cycle from the orchestrator's base seed.
pub fn cycle_seed(base_seed: u64, offset: u64, cycle: CycleId) -> u64 {
    stable_hash_with(|hasher| {
        base_seed.hash(hasher);
        offset.hash(hasher);
        cycle.hash(hasher);
    })
}
