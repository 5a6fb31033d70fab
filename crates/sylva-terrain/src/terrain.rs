//! Chunk-local terrain storage and mesh generation.

use glam::Vec3;
use sylva_assets::{ModelData, ModelVertex, ResourceMgr};
use sylva_materials::MaterialModel;
use thiserror::Error;

use crate::coord::{ChunkCoord, TERRAIN_INTERVAL, TERRAIN_VERTEX_COUNT};
use crate::heightfield::Heightfield;

/// Texture bound to every terrain chunk.
pub const TERRAIN_TEXTURE: &str = "textures/terrain.png";

/// Local coordinates within this distance of a grid line snap onto it.
const GRID_SNAP_EPSILON: f64 = 1e-6;

/// Terrain geometry shares the model vertex layout so it renders through the
/// same path as props.
pub type TerrainMesh = ModelData;

/// Errors raised while writing into a [`Terrain`].
#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    /// A local coordinate does not address a vertex of the chunk grid.
    #[error("local coordinate ({x}, {z}) is not a grid vertex of chunk {chunk}")]
    OutOfBounds { chunk: ChunkCoord, x: f64, z: f64 },

    /// A precomputed heightfield was sampled for a different chunk.
    #[error("heightfield for chunk {found} cannot fill chunk {expected}")]
    HeightfieldMismatch {
        expected: ChunkCoord,
        found: ChunkCoord,
    },
}

/// One chunk's heightfield plus its generated mesh and material.
#[derive(Clone, Debug)]
pub struct Terrain {
    coord: ChunkCoord,
    heights: Vec<f32>,
    mesh: Option<TerrainMesh>,
    material: Option<MaterialModel>,
}

impl Terrain {
    /// Creates a flat (all-zero) chunk with no mesh.
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            heights: vec![0.0; TERRAIN_VERTEX_COUNT * TERRAIN_VERTEX_COUNT],
            mesh: None,
            material: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Stores `height` at the vertex addressed by chunk-local world units.
    ///
    /// `(local_x, local_z)` must land on the grid (multiples of
    /// [`TERRAIN_INTERVAL`] within `[0, TERRAIN_SIZE]`).
    ///
    /// [`TERRAIN_SIZE`]: crate::TERRAIN_SIZE
    pub fn set_terrain_height(
        &mut self,
        local_x: f64,
        local_z: f64,
        height: f32,
    ) -> Result<(), TerrainError> {
        let out_of_bounds = || TerrainError::OutOfBounds {
            chunk: self.coord,
            x: local_x,
            z: local_z,
        };
        let ix = grid_index(local_x).ok_or_else(out_of_bounds)?;
        let iz = grid_index(local_z).ok_or_else(out_of_bounds)?;
        self.heights[iz * TERRAIN_VERTEX_COUNT + ix] = height;
        Ok(())
    }

    /// Height stored at grid vertex `(ix, iz)`.
    pub fn height_at_vertex(&self, ix: usize, iz: usize) -> Option<f32> {
        if ix >= TERRAIN_VERTEX_COUNT || iz >= TERRAIN_VERTEX_COUNT {
            return None;
        }
        Some(self.heights[iz * TERRAIN_VERTEX_COUNT + ix])
    }

    /// Bilinearly interpolated height at chunk-local `(local_x, local_z)`.
    ///
    /// `None` outside `[0, TERRAIN_SIZE]` on either axis.
    ///
    /// [`TERRAIN_SIZE`]: crate::TERRAIN_SIZE
    pub fn height_at(&self, local_x: f64, local_z: f64) -> Option<f32> {
        let last = (TERRAIN_VERTEX_COUNT - 1) as f64;
        let gx = local_x / TERRAIN_INTERVAL;
        let gz = local_z / TERRAIN_INTERVAL;
        if !(0.0..=last).contains(&gx) || !(0.0..=last).contains(&gz) {
            return None;
        }

        let x0 = (gx.floor() as usize).min(TERRAIN_VERTEX_COUNT - 2);
        let z0 = (gz.floor() as usize).min(TERRAIN_VERTEX_COUNT - 2);
        let tx = (gx - x0 as f64) as f32;
        let tz = (gz - z0 as f64) as f32;

        let h00 = self.height_at_vertex(x0, z0)?;
        let h10 = self.height_at_vertex(x0 + 1, z0)?;
        let h01 = self.height_at_vertex(x0, z0 + 1)?;
        let h11 = self.height_at_vertex(x0 + 1, z0 + 1)?;

        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        Some(near + (far - near) * tz)
    }

    /// All vertex heights, row-major with z as the row.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Overwrites the whole heightfield with precomputed samples.
    pub fn copy_heightfield(&mut self, heightfield: &Heightfield) -> Result<(), TerrainError> {
        if heightfield.coord() != self.coord {
            return Err(TerrainError::HeightfieldMismatch {
                expected: self.coord,
                found: heightfield.coord(),
            });
        }
        self.heights.copy_from_slice(heightfield.heights());
        Ok(())
    }

    /// Builds the chunk mesh from the current heights and binds the terrain
    /// texture. Replaces any previous mesh.
    pub fn generate_mesh(&mut self, resources: &mut ResourceMgr) {
        let mesh = build_mesh(&self.heights);
        let name = format!("terrain/{}_{}", self.coord.x, self.coord.z);

        tracing::trace!(
            "built terrain mesh {name}: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.triangle_count()
        );

        let texture = resources.texture(TERRAIN_TEXTURE);
        let model = resources.insert_model(&name, mesh.clone());
        self.material = Some(MaterialModel::new(texture, model, name));
        self.mesh = Some(mesh);
    }

    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.mesh.as_ref()
    }

    pub fn material(&self) -> Option<&MaterialModel> {
        self.material.as_ref()
    }
}

/// Maps a local coordinate to a grid index, or `None` if it is off-grid.
fn grid_index(local: f64) -> Option<usize> {
    let g = local / TERRAIN_INTERVAL;
    let rounded = g.round();
    if !g.is_finite()
        || (g - rounded).abs() > GRID_SNAP_EPSILON
        || rounded < 0.0
        || rounded > (TERRAIN_VERTEX_COUNT - 1) as f64
    {
        return None;
    }
    Some(rounded as usize)
}

/// Two triangles per grid cell, wound so a flat chunk faces +Y. Normals are
/// accumulated from adjacent face normals; UVs repeat once per cell.
fn build_mesh(heights: &[f32]) -> TerrainMesh {
    let n = TERRAIN_VERTEX_COUNT;
    let position = |ix: usize, iz: usize| {
        Vec3::new(
            (ix as f64 * TERRAIN_INTERVAL) as f32,
            heights[iz * n + ix],
            (iz as f64 * TERRAIN_INTERVAL) as f32,
        )
    };

    let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
    let mut normals = vec![Vec3::ZERO; n * n];

    for iz in 0..n - 1 {
        for ix in 0..n - 1 {
            let i0 = iz * n + ix;
            let i1 = i0 + 1;
            let i2 = i0 + n;
            let i3 = i2 + 1;

            let v0 = position(ix, iz);
            let v1 = position(ix + 1, iz);
            let v2 = position(ix, iz + 1);
            let v3 = position(ix + 1, iz + 1);

            let n1 = (v2 - v0).cross(v1 - v0).normalize_or_zero();
            normals[i0] += n1;
            normals[i2] += n1;
            normals[i1] += n1;

            let n2 = (v2 - v1).cross(v3 - v1).normalize_or_zero();
            normals[i1] += n2;
            normals[i2] += n2;
            normals[i3] += n2;

            indices.extend([i0, i2, i1, i1, i2, i3].map(|i| i as u32));
        }
    }

    let mut vertices = Vec::with_capacity(n * n);
    for iz in 0..n {
        for ix in 0..n {
            let p = position(ix, iz);
            let normal = normals[iz * n + ix].normalize_or_zero();
            vertices.push(ModelVertex {
                position: p.to_array(),
                normal: normal.to_array(),
                uv: [ix as f32, iz as f32],
            });
        }
    }

    ModelData { vertices, indices }
}
