//! Core material types: [`MaterialModelProperties`] and [`MaterialModel`].

use std::hash::{Hash, Hasher};

use sylva_assets::{ModelHandle, TextureHandle};

// ---------------------------------------------------------------------------
// MaterialModelProperties
// ---------------------------------------------------------------------------

/// Lighting and culling properties shared by every instance of a model.
///
/// Floats compare by bit pattern (with `-0.0` folded into `0.0`) so that
/// equality and hashing agree and the type can key a `HashMap`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialModelProperties {
    /// Optional specular map texture.
    pub specular_map: Option<TextureHandle>,
    /// Render both faces (foliage, thin geometry).
    pub fully_render: bool,
    /// Specular falloff exponent.
    pub shine_distance_damper: f32,
    /// Specular reflectivity.
    pub reflectivity: f32,
}

impl MaterialModelProperties {
    /// Returns `true` if a specular map is bound.
    pub fn has_specular_map(&self) -> bool {
        self.specular_map.is_some()
    }
}

fn canonical_bits(f: f32) -> u32 {
    if f == 0.0 { 0 } else { f.to_bits() }
}

impl PartialEq for MaterialModelProperties {
    fn eq(&self, other: &Self) -> bool {
        self.specular_map == other.specular_map
            && self.fully_render == other.fully_render
            && canonical_bits(self.shine_distance_damper)
                == canonical_bits(other.shine_distance_damper)
            && canonical_bits(self.reflectivity) == canonical_bits(other.reflectivity)
    }
}

impl Eq for MaterialModelProperties {}

impl Hash for MaterialModelProperties {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.specular_map.hash(state);
        self.fully_render.hash(state);
        canonical_bits(self.shine_distance_damper).hash(state);
        canonical_bits(self.reflectivity).hash(state);
    }
}

// ---------------------------------------------------------------------------
// MaterialModel
// ---------------------------------------------------------------------------

/// A textured model plus its surface properties.
///
/// Identity is `(name, texture, properties)`: the name identifies the model
/// file, so two instances with the same name always share geometry.
#[derive(Clone, Debug)]
pub struct MaterialModel {
    texture: TextureHandle,
    model: ModelHandle,
    name: String,
    /// Surface properties.
    pub properties: MaterialModelProperties,
}

impl MaterialModel {
    /// Creates a material model with default properties.
    pub fn new(texture: TextureHandle, model: ModelHandle, name: impl Into<String>) -> Self {
        Self {
            texture,
            model,
            name: name.into(),
            properties: MaterialModelProperties::default(),
        }
    }

    /// Binds a specular map.
    pub fn use_specular_map(&mut self, specular_map: TextureHandle) {
        self.properties.specular_map = Some(specular_map);
    }

    /// Returns `true` if a specular map is bound.
    pub fn has_specular_map(&self) -> bool {
        self.properties.has_specular_map()
    }

    /// Bound specular map, if any.
    pub fn specular_map(&self) -> Option<TextureHandle> {
        self.properties.specular_map
    }

    /// Diffuse texture.
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Geometry handle.
    pub fn model(&self) -> ModelHandle {
        self.model
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for MaterialModel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.texture == other.texture
            && self.properties == other.properties
    }
}

impl Eq for MaterialModel {}

impl Hash for MaterialModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.texture.hash(state);
        self.properties.hash(state);
    }
}
