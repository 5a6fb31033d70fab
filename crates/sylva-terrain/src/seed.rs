//! Per-chunk seed derivation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::coord::ChunkCoord;

/// Derive a u64 seed for a chunk from the world seed and chunk coordinate.
///
/// Uses SipHash (via std's `DefaultHasher`, fixed keys) to combine the world
/// seed with the chunk coordinate into a well-distributed u64.
pub fn derive_chunk_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    coord.x.hash(&mut hasher);
    coord.z.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_chunk_seed_deterministic() {
        let coord = ChunkCoord::new(42, -7);
        assert_eq!(
            derive_chunk_seed(999, coord),
            derive_chunk_seed(999, coord),
            "Same inputs must produce same derived seed"
        );
    }

    #[test]
    fn test_derive_chunk_seed_different_coords() {
        let a = derive_chunk_seed(42, ChunkCoord::new(0, 0));
        let b = derive_chunk_seed(42, ChunkCoord::new(1, 0));
        let c = derive_chunk_seed(42, ChunkCoord::new(0, 1));
        assert_ne!(a, b, "Adjacent chunks should produce different seeds");
        assert_ne!(a, c);
        assert_ne!(b, c, "Axis must be part of the derivation");
    }

    #[test]
    fn test_derive_chunk_seed_different_world_seeds() {
        let coord = ChunkCoord::new(5, 5);
        assert_ne!(
            derive_chunk_seed(0, coord),
            derive_chunk_seed(1, coord),
            "Different world seeds should produce different chunk seeds"
        );
    }
}
