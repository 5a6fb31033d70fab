//! Name-keyed registry of [`EntityConstructor`] recipes.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use sylva_assets::ResourceMgr;
use sylva_materials::MaterialModel;
use thiserror::Error;

use crate::constructor::{EntityConstructor, PickupConstructor, PropConstructor};

/// Recipe name for evergreen trees.
pub const EVERGREEN_TREE: &str = "evergreen_tree";
/// Recipe name for ferns.
pub const FERN: &str = "fern";
/// Recipe name for axes lying on the ground.
pub const AXE: &str = "axe";

/// Errors returned by [`EntityRegistry`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No constructor is registered under this name.
    #[error("no entity constructor named {0:?}")]
    NotFound(String),
    /// A constructor with the same name has already been registered.
    #[error("duplicate entity constructor name: {0}")]
    DuplicateName(String),
}

/// Maps recipe names to construction strategies.
///
/// Populated at startup; generation code only reads from it.
#[derive(Resource, Default)]
pub struct EntityRegistry {
    constructors: HashMap<String, Box<dyn EntityConstructor>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in world objects: evergreen trees,
    /// ferns (rendered double-sided) and axes (pickups with a specular map).
    ///
    /// Only registers resource paths with `resources`; nothing is loaded.
    pub fn with_defaults(resources: &mut ResourceMgr) -> Self {
        let mut registry = Self::new();

        let tree = MaterialModel::new(
            resources.texture("textures/evergreen_tree.png"),
            resources.model("models/evergreen_tree.smdl"),
            EVERGREEN_TREE,
        );

        let mut fern = MaterialModel::new(
            resources.texture("textures/fern.png"),
            resources.model("models/fern.smdl"),
            FERN,
        );
        fern.properties.fully_render = true;

        let mut axe = MaterialModel::new(
            resources.texture("textures/axe.png"),
            resources.model("models/axe.smdl"),
            AXE,
        );
        axe.use_specular_map(resources.texture("textures/axe_specular.png"));
        axe.properties.shine_distance_damper = 10.0;
        axe.properties.reflectivity = 0.5;

        // Names are distinct literals, registration cannot collide.
        let defaults: [(&str, Box<dyn EntityConstructor>); 3] = [
            (EVERGREEN_TREE, Box::new(PropConstructor::new(EVERGREEN_TREE, tree))),
            (FERN, Box::new(PropConstructor::new(FERN, fern))),
            (AXE, Box::new(PickupConstructor::new(AXE, axe, "axe"))),
        ];
        for (name, ctor) in defaults {
            registry.constructors.insert(name.to_string(), ctor);
        }
        registry
    }

    /// Registers a constructor under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if `name` is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: impl EntityConstructor + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.constructors.insert(name, Box::new(constructor));
        Ok(())
    }

    /// Looks up the constructor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unregistered names.
    pub fn get_constructor(&self, name: &str) -> Result<&dyn EntityConstructor, RegistryError> {
        self.constructors
            .get(name)
            .map(|c| &**c)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered constructors.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
