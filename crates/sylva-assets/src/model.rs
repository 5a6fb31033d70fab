//! Binary model format (`.smdl`).
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Magic bytes `"SMDL"` |
//! | 4 | 4 | Format version (`u32`, little-endian, currently 1) |
//! | 8 | 4 | Vertex count V (`u32`) |
//! | 12 | V×32 | Vertices: position xyz, normal xyz, uv (8 × `f32`) |
//! | 12+V×32 | 4 | Index count I (`u32`) |
//! | 16+V×32 | I×4 | Triangle indices (`u32`) |

use std::io::Read;

use bytemuck::{Pod, Zeroable};

use crate::binary_reader::BinaryReader;
use crate::resource_mgr::AssetError;

/// Magic bytes identifying the model format.
pub const MODEL_MAGIC: [u8; 4] = *b"SMDL";

/// Current format version.
pub const MODEL_VERSION: u32 = 1;

/// Upper bound on vertex and index counts accepted from a file.
const MAX_ELEMENTS: usize = 1 << 24;

/// Largest up-front reservation made from a header count. Buffers grow past
/// it only as elements are actually read.
const MAX_PREALLOC: usize = 4096;

/// A single model vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Vertex normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

/// Decoded model geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelData {
    /// Vertex buffer.
    pub vertices: Vec<ModelVertex>,
    /// Triangle index buffer.
    pub indices: Vec<u32>,
}

impl ModelData {
    /// Decodes a model from a binary reader.
    pub fn read_from<R: Read>(reader: &mut BinaryReader<R>) -> Result<Self, AssetError> {
        let magic: [u8; 4] = reader.read()?;
        if magic != MODEL_MAGIC {
            return Err(AssetError::InvalidMagic);
        }
        let version = reader.read_u32_le()?;
        if version != MODEL_VERSION {
            return Err(AssetError::UnsupportedVersion(version));
        }

        let vertex_count = bounded_count(reader)?;
        let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOC));
        for _ in 0..vertex_count {
            let mut v = [0.0_f32; 8];
            for c in &mut v {
                *c = reader.read_f32_le()?;
            }
            vertices.push(ModelVertex {
                position: [v[0], v[1], v[2]],
                normal: [v[3], v[4], v[5]],
                uv: [v[6], v[7]],
            });
        }

        let index_count = bounded_count(reader)?;
        let mut indices = Vec::with_capacity(index_count.min(MAX_PREALLOC));
        for _ in 0..index_count {
            let index = reader.read_u32_le()?;
            if index as usize >= vertex_count {
                return Err(AssetError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
            indices.push(index);
        }

        Ok(Self { vertices, indices })
    }

    /// Encodes this model in the `.smdl` layout.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::TooLarge`] if either buffer holds more elements
    /// than a model file may declare.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AssetError> {
        let vertex_count = encoded_count(self.vertices.len())?;
        let index_count = encoded_count(self.indices.len())?;

        let mut buf = Vec::with_capacity(16 + self.vertices.len() * 32 + self.indices.len() * 4);
        buf.extend_from_slice(&MODEL_MAGIC);
        buf.extend_from_slice(&MODEL_VERSION.to_le_bytes());

        buf.extend_from_slice(&vertex_count.to_le_bytes());
        for v in &self.vertices {
            for c in v.position.iter().chain(&v.normal).chain(&v.uv) {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }

        buf.extend_from_slice(&index_count.to_le_bytes());
        for i in &self.indices {
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Ok(buf)
    }

    /// Number of triangles described by the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn bounded_count<R: Read>(reader: &mut BinaryReader<R>) -> Result<usize, AssetError> {
    let count = reader.read_u32_le()? as usize;
    if count > MAX_ELEMENTS {
        return Err(AssetError::TooLarge(count));
    }
    Ok(count)
}

fn encoded_count(len: usize) -> Result<u32, AssetError> {
    if len > MAX_ELEMENTS {
        return Err(AssetError::TooLarge(len));
    }
    u32::try_from(len).map_err(|_| AssetError::TooLarge(len))
}
