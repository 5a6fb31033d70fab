//! Entity construction recipes.

use bevy_ecs::world::EntityWorldMut;
use sylva_materials::MaterialModel;

use crate::components::{Name, Pickup, Renderable};

/// Installs type-specific components on a freshly spawned entity.
///
/// Implementations must not despawn the entity; callers position it after
/// construction returns.
pub trait EntityConstructor: Send + Sync {
    /// Initialise `entity`.
    fn construct(&self, entity: &mut EntityWorldMut<'_>);
}

/// Static scenery: a name plus the model to draw.
#[derive(Clone, Debug)]
pub struct PropConstructor {
    name: String,
    material: MaterialModel,
}

impl PropConstructor {
    /// Creates a recipe for scenery drawn with `material`.
    pub fn new(name: impl Into<String>, material: MaterialModel) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }

    /// The material installed on constructed entities.
    pub fn material(&self) -> &MaterialModel {
        &self.material
    }
}

impl EntityConstructor for PropConstructor {
    fn construct(&self, entity: &mut EntityWorldMut<'_>) {
        entity.insert((Name::new(self.name.clone()), Renderable(self.material.clone())));
    }
}

/// A prop that can also be picked up as an inventory item.
#[derive(Clone, Debug)]
pub struct PickupConstructor {
    prop: PropConstructor,
    item: String,
}

impl PickupConstructor {
    /// Creates a recipe for a pickup granting `item`.
    pub fn new(name: impl Into<String>, material: MaterialModel, item: impl Into<String>) -> Self {
        Self {
            prop: PropConstructor::new(name, material),
            item: item.into(),
        }
    }
}

impl EntityConstructor for PickupConstructor {
    fn construct(&self, entity: &mut EntityWorldMut<'_>) {
        self.prop.construct(entity);
        entity.insert(Pickup {
            item: self.item.clone(),
        });
    }
}
