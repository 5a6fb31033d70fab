//! Procedural terrain: a deterministic height function, chunk heightfields
//! and meshes, and seeded object scatter into a [`ChunkWorld`].

mod async_generation;
mod coord;
mod height_gen;
mod heightfield;
mod placement_rng;
mod seed;
mod terrain;
mod terrain_gen;

#[cfg(test)]
mod test_world;

pub use async_generation::{AsyncHeightfieldGenerator, GeneratedHeightfield};
pub use coord::{ChunkCoord, TERRAIN_INTERVAL, TERRAIN_SIZE, TERRAIN_VERTEX_COUNT};
pub use height_gen::{HeightGen, HeightParams};
pub use heightfield::Heightfield;
pub use placement_rng::PlacementRng;
pub use seed::derive_chunk_seed;
pub use terrain::{TERRAIN_TEXTURE, Terrain, TerrainError, TerrainMesh};
pub use terrain_gen::{ChunkWorld, ScatterRule, TerrainGen, TerrainGenError};
