//! The game world terrain generation writes into, and the driver that fills
//! it chunk by chunk.
//!
//! [`World`] owns the `bevy_ecs` storage for placed objects and the loaded
//! terrain chunks. [`WorldGenerator`] turns configuration into generated
//! chunks, optionally sampling heightfields on worker threads.

mod generator;
mod world;

pub use generator::{GenerationReport, WorldGenError, WorldGenerator, height_params, scatter_rules};
pub use sylva_config::ScatterMode;
pub use world::{Placement, World};
