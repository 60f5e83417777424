use rand::prelude::*;
use tracing::debug;

use crate::constants::sampler::CYCLE_SEED_OFFSET;
use crate::data::CountrySummary;
use crate::errors::PairsError;
use crate::hash::cycle_seed;
use crate::types::CycleId;

#[derive(Debug, Clone)]
/// Small deterministic RNG used for reproducible sampling.
pub(crate) struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Draw `k` items uniformly at random without replacement.
///
/// Each draw picks uniformly among the indices not drawn yet. `all` is only
/// borrowed; the exclusion set is a private index list, so the caller's list
/// (which may be cached and shared) is never reordered or shrunk.
///
/// Output order follows draw order and carries no other guarantee.
pub fn sample<T: Clone, R: Rng>(
    all: &[T],
    k: usize,
    rng: &mut R,
) -> Result<Vec<T>, PairsError> {
    if k > all.len() {
        return Err(PairsError::InvalidArgument(format!(
            "cannot sample {k} items from a list of {}",
            all.len()
        )));
    }
    let mut remaining: Vec<usize> = (0..all.len()).collect();
    let mut picked = Vec::with_capacity(k);
    for _ in 0..k {
        let slot = rng.random_range(0..remaining.len());
        let idx = remaining.swap_remove(slot);
        picked.push(all[idx].clone());
    }
    Ok(picked)
}

/// Seeded country sampler.
///
/// The same `(base_seed, cycle)` always yields the same sample for the same
/// input list, so any cycle can be replayed from its logged seed.
#[derive(Debug, Clone)]
pub struct CountrySampler {
    base_seed: u64,
}

impl CountrySampler {
    /// Create a sampler with an explicit base seed.
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create a sampler from `seed`, drawing a random base seed when absent.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        Self::new(seed.unwrap_or_else(rand::random))
    }

    /// Base seed all cycle seeds derive from.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Sample `k` countries for `cycle`.
    pub fn sample_for_cycle(
        &self,
        all: &[CountrySummary],
        k: usize,
        cycle: CycleId,
    ) -> Result<Vec<CountrySummary>, PairsError> {
        let seed = cycle_seed(self.base_seed, CYCLE_SEED_OFFSET, cycle);
        let mut rng = DeterministicRng::new(seed);
        let picked = sample(all, k, &mut rng)?;
        debug!(
            cycle,
            seed,
            requested = k,
            available = all.len(),
            "sampled countries"
        );
        Ok(picked)
    }
}
