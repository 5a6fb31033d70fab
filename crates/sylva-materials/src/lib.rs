//! Material system: the per-model surface properties and the identity rules
//! the renderer uses to batch instances sharing a [`MaterialModel`].

mod batch;
mod material;

pub use batch::MaterialBatches;
pub use material::{MaterialModel, MaterialModelProperties};
