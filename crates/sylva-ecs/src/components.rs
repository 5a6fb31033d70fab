//! Core ECS components shared by placed world objects.

use bevy_ecs::prelude::*;
use glam::DVec3;
use sylva_materials::MaterialModel;

/// World-space position of the entity's anchor point (its base).
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct Position(pub DVec3);

impl Position {
    /// Creates a new [`Position`] from world-space coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }
}

/// Uniform scale factor. 1.0 is the default (no scaling). Non-uniform
/// scale is not supported.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Scale(pub f32);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Name of the construction recipe the entity was built from.
#[derive(Component, Clone, Debug, PartialEq, Eq, Default)]
pub struct Name(pub String);

impl Name {
    /// Creates a new [`Name`] from anything that converts to `String`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// The textured model the renderer draws for this entity.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Renderable(pub MaterialModel);

/// Marks an entity the player can pick up.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Pickup {
    /// Inventory item granted on pickup.
    pub item: String,
}
