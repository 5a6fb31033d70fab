//! Chunk grid constants and the [`ChunkCoord`] address type.

use std::fmt;

/// Side length of a terrain chunk in world units.
pub const TERRAIN_SIZE: f64 = 64.0;

/// Number of heightfield vertices along one side of a chunk.
pub const TERRAIN_VERTEX_COUNT: usize = 65;

/// Spacing between adjacent heightfield vertices in world units.
pub const TERRAIN_INTERVAL: f64 = TERRAIN_SIZE / (TERRAIN_VERTEX_COUNT - 1) as f64;

/// Integer address of a terrain chunk on the XZ plane.
///
/// Chunk `(x, z)` covers world space `[x * TERRAIN_SIZE, (x + 1) * TERRAIN_SIZE)`
/// on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World-space `(x, z)` of the chunk's minimum corner.
    pub fn origin(self) -> (f64, f64) {
        (self.x as f64 * TERRAIN_SIZE, self.z as f64 * TERRAIN_SIZE)
    }

    /// The chunk whose half-open extent contains world `(x, z)`.
    pub fn containing(x: f64, z: f64) -> Self {
        Self {
            x: (x / TERRAIN_SIZE).floor() as i32,
            z: (z / TERRAIN_SIZE).floor() as i32,
        }
    }

    /// Returns `true` if world `(x, z)` lies inside this chunk's half-open extent.
    pub fn contains(self, x: f64, z: f64) -> bool {
        let (ox, oz) = self.origin();
        x >= ox && x < ox + TERRAIN_SIZE && z >= oz && z < oz + TERRAIN_SIZE
    }

    /// All chunks in the square of the given radius around `self`, row by row
    /// (z outer, x inner).
    pub fn square(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = radius as i32;
        let center = self;
        (-r..=r).flat_map(move |dz| (-r..=r).map(move |dx| ChunkCoord::new(center.x + dx, center.z + dz)))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
