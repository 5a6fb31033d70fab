//! Resource manager handing out stable handles for textures and models.
//!
//! Requesting a resource only registers its path and returns a handle; the
//! file is read the first time the handle is fetched and cached afterwards.
//! This lets entity construction recipes reference models long before any
//! geometry is needed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::binary_reader::{BinaryReadError, BinaryReader};
use crate::model::ModelData;
use crate::texture::TextureData;

/// Errors returned while loading or decoding assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Binary read failure (I/O or truncated data).
    #[error("read error: {0}")]
    Read(#[from] BinaryReadError),

    /// Image decoding failure.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The model file does not start with the expected magic bytes.
    #[error("invalid model magic bytes")]
    InvalidMagic,

    /// The model file version is not supported by this build.
    #[error("unsupported model version: {0}")]
    UnsupportedVersion(u32),

    /// A vertex or index count exceeds the accepted maximum.
    #[error("element count too large: {0}")]
    TooLarge(usize),

    /// An index references a vertex past the end of the vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value.
        index: u32,
        /// Number of vertices in the model.
        vertex_count: usize,
    },

    /// The handle was not issued by this manager.
    #[error("unknown resource handle")]
    UnknownHandle,
}

/// Handle to a texture registered with a [`ResourceMgr`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Handle to a model registered with a [`ResourceMgr`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(pub u32);

struct Slot<T> {
    path: String,
    data: Option<T>,
}

/// Registry of texture and model resources rooted at an asset directory.
///
/// Paths are relative to the root and deduplicated: requesting the same path
/// twice yields the same handle.
pub struct ResourceMgr {
    root: PathBuf,
    textures: Vec<Slot<TextureData>>,
    texture_ids: HashMap<String, TextureHandle>,
    models: Vec<Slot<ModelData>>,
    model_ids: HashMap<String, ModelHandle>,
}

impl ResourceMgr {
    /// Creates an empty manager resolving paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: Vec::new(),
            texture_ids: HashMap::new(),
            models: Vec::new(),
            model_ids: HashMap::new(),
        }
    }

    /// Asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the handle for a texture path, registering it if new.
    pub fn texture(&mut self, path: &str) -> TextureHandle {
        if let Some(&handle) = self.texture_ids.get(path) {
            return handle;
        }
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(Slot {
            path: path.to_string(),
            data: None,
        });
        self.texture_ids.insert(path.to_string(), handle);
        tracing::trace!("registered texture {path} as {handle:?}");
        handle
    }

    /// Returns the handle for a model path, registering it if new.
    pub fn model(&mut self, path: &str) -> ModelHandle {
        if let Some(&handle) = self.model_ids.get(path) {
            return handle;
        }
        let handle = ModelHandle(self.models.len() as u32);
        self.models.push(Slot {
            path: path.to_string(),
            data: None,
        });
        self.model_ids.insert(path.to_string(), handle);
        tracing::trace!("registered model {path} as {handle:?}");
        handle
    }

    /// Registers geometry built at runtime under `path`, replacing any cached
    /// data. The model is resident immediately and never read from disk.
    pub fn insert_model(&mut self, path: &str, data: ModelData) -> ModelHandle {
        let handle = self.model(path);
        if let Some(slot) = self.models.get_mut(handle.0 as usize) {
            slot.data = Some(data);
        }
        handle
    }

    /// Registered path of a texture.
    pub fn texture_path(&self, handle: TextureHandle) -> Option<&str> {
        self.textures.get(handle.0 as usize).map(|s| s.path.as_str())
    }

    /// Registered path of a model.
    pub fn model_path(&self, handle: ModelHandle) -> Option<&str> {
        self.models.get(handle.0 as usize).map(|s| s.path.as_str())
    }

    /// Returns the texture pixels, decoding the file on first use.
    pub fn fetch_texture(&mut self, handle: TextureHandle) -> Result<&TextureData, AssetError> {
        let root = &self.root;
        let slot = self
            .textures
            .get_mut(handle.0 as usize)
            .ok_or(AssetError::UnknownHandle)?;
        if slot.data.is_none() {
            let data = TextureData::load(&root.join(&slot.path))?;
            tracing::debug!(
                "loaded texture {} ({}x{})",
                slot.path,
                data.width,
                data.height
            );
            slot.data = Some(data);
        }
        slot.data.as_ref().ok_or(AssetError::UnknownHandle)
    }

    /// Returns the model geometry, decoding the file on first use.
    pub fn fetch_model(&mut self, handle: ModelHandle) -> Result<&ModelData, AssetError> {
        let root = &self.root;
        let slot = self
            .models
            .get_mut(handle.0 as usize)
            .ok_or(AssetError::UnknownHandle)?;
        if slot.data.is_none() {
            let mut reader = BinaryReader::open(root.join(&slot.path))?;
            let data = ModelData::read_from(&mut reader)?;
            tracing::debug!(
                "loaded model {} ({} triangles)",
                slot.path,
                data.triangle_count()
            );
            slot.data = Some(data);
        }
        slot.data.as_ref().ok_or(AssetError::UnknownHandle)
    }

    /// Returns `true` if the texture's pixels are resident.
    pub fn is_texture_loaded(&self, handle: TextureHandle) -> bool {
        self.textures
            .get(handle.0 as usize)
            .is_some_and(|s| s.data.is_some())
    }

    /// Returns `true` if the model's geometry is resident.
    pub fn is_model_loaded(&self, handle: ModelHandle) -> bool {
        self.models
            .get(handle.0 as usize)
            .is_some_and(|s| s.data.is_some())
    }

    /// Number of registered textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of registered models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
