//! Entity-side building blocks: the core components placed objects carry and
//! the name-keyed [`EntityRegistry`] of construction recipes.
//!
//! Storage itself is a plain [`bevy_ecs::world::World`]; this crate only
//! decides what a "fern" or an "axe" looks like once it has been spawned.

mod components;
mod constructor;
mod registry;

pub use components::{Name, Pickup, Position, Renderable, Scale};
pub use constructor::{EntityConstructor, PickupConstructor, PropConstructor};
pub use registry::{AXE, EVERGREEN_TREE, EntityRegistry, FERN, RegistryError};
