use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::domain::PrizeTier;

/// Source of uniform indices for winner selection.
pub trait RandomSource {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// OS-seeded thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible RNG for rehearsals.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Uniform pick from the pool without the reserved name.
    Random,
    /// Top tier awarded to the reserved name.
    Reserved,
    /// The reserved name was the only candidate left for a lower tier.
    OnlyCandidateLeft,
    /// Top tier drawn after the reserved name already won; only reachable
    /// with a top-tier quota above 1.
    TopTierFallback,
}

impl Selection {
    /// True when no random choice was involved.
    pub fn is_forced(self) -> bool {
        matches!(self, Selection::Reserved | Selection::OnlyCandidateLeft)
    }
}

/// Picks the next winner for `tier` from `remaining`.
///
/// The top tier goes to `reserved` while it is still in the pool. Lower
/// tiers draw from the pool without `reserved`, unless it is the only name
/// left. Returns `None` only for an empty pool.
pub fn choose_winner(
    tier: PrizeTier,
    remaining: &[String],
    reserved: &str,
    random: &mut dyn RandomSource,
) -> Option<(String, Selection)> {
    if remaining.is_empty() {
        return None;
    }

    if tier.is_top() {
        if remaining.iter().any(|name| name.as_str() == reserved) {
            return Some((reserved.to_string(), Selection::Reserved));
        }
        let idx = random.pick(remaining.len());
        return Some((remaining[idx].clone(), Selection::TopTierFallback));
    }

    let pool: Vec<&String> = remaining.iter().filter(|name| name.as_str() != reserved).collect();
    if pool.is_empty() {
        // Only the reserved name is left.
        let idx = random.pick(remaining.len());
        return Some((remaining[idx].clone(), Selection::OnlyCandidateLeft));
    }

    let idx = random.pick(pool.len());
    Some((pool[idx].clone(), Selection::Random))
}
