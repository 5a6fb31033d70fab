//! Asset plumbing: typed binary reads, model/texture decoding, and the
//! [`ResourceMgr`] that hands out resource handles and fetches their data on demand.

mod binary_reader;
mod model;
mod resource_mgr;
mod texture;

pub use binary_reader::{BinaryReadError, BinaryReader};
pub use model::{MODEL_MAGIC, MODEL_VERSION, ModelData, ModelVertex};
pub use resource_mgr::{AssetError, ModelHandle, ResourceMgr, TextureHandle};
pub use texture::TextureData;
