//! Precomputed chunk heightfields.

use crate::coord::{ChunkCoord, TERRAIN_INTERVAL, TERRAIN_VERTEX_COUNT};
use crate::height_gen::{HeightGen, HeightParams};

/// Heights for every vertex of one chunk, sampled off the owning thread.
///
/// Row-major with z as the row: index `iz * TERRAIN_VERTEX_COUNT + ix`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    coord: ChunkCoord,
    params: HeightParams,
    heights: Vec<f32>,
}

impl Heightfield {
    /// Sample all vertices of `coord` at absolute world positions.
    pub fn sample(height_gen: &HeightGen, coord: ChunkCoord) -> Self {
        let (ox, oz) = coord.origin();
        let mut heights = Vec::with_capacity(TERRAIN_VERTEX_COUNT * TERRAIN_VERTEX_COUNT);
        for iz in 0..TERRAIN_VERTEX_COUNT {
            for ix in 0..TERRAIN_VERTEX_COUNT {
                let x = ox + ix as f64 * TERRAIN_INTERVAL;
                let z = oz + iz as f64 * TERRAIN_INTERVAL;
                heights.push(height_gen.generate_height(x, z) as f32);
            }
        }
        Self {
            coord,
            params: height_gen.params().clone(),
            heights,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Parameters of the height function that produced this field.
    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn get(&self, ix: usize, iz: usize) -> Option<f32> {
        if ix >= TERRAIN_VERTEX_COUNT || iz >= TERRAIN_VERTEX_COUNT {
            return None;
        }
        self.heights.get(iz * TERRAIN_VERTEX_COUNT + ix).copied()
    }
}
