//! The owned random stream used for object placement.

use rand::distr::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::coord::ChunkCoord;
use crate::seed::derive_chunk_seed;

/// Seeded ChaCha8 stream that counts how many samples it has produced.
///
/// Two streams built from the same seed yield the same sequence on every
/// platform.
#[derive(Clone, Debug)]
pub struct PlacementRng {
    rng: ChaCha8Rng,
    draws: u64,
}

impl PlacementRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Stream for a single chunk, independent of generation order.
    pub fn for_chunk(world_seed: u64, coord: ChunkCoord) -> Self {
        Self::new(derive_chunk_seed(world_seed, coord))
    }

    /// Uniform sample from `[low, high)`.
    ///
    /// An empty, inverted or non-finite range returns `low` without consuming
    /// the stream.
    pub fn next_uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return low;
        }
        self.draws += 1;
        self.rng.random_range(low..high)
    }

    /// Draw one sample from `distribution`.
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        self.draws += 1;
        distribution.sample(&mut self.rng)
    }

    /// Number of samples drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
