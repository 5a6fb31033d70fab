//! Grouping of renderable instances by [`MaterialModel`].

use std::collections::HashMap;

use crate::material::MaterialModel;

/// Instances grouped so each [`MaterialModel`] is bound once per frame.
#[derive(Debug)]
pub struct MaterialBatches<T> {
    batches: HashMap<MaterialModel, Vec<T>>,
}

impl<T> Default for MaterialBatches<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MaterialBatches<T> {
    /// Create an empty set of batches.
    pub fn new() -> Self {
        Self {
            batches: HashMap::new(),
        }
    }

    /// Add an instance to the batch for `material`.
    pub fn push(&mut self, material: &MaterialModel, instance: T) {
        match self.batches.get_mut(material) {
            Some(list) => list.push(instance),
            None => {
                self.batches.insert(material.clone(), vec![instance]);
            }
        }
    }

    /// Instances sharing `material`.
    pub fn get(&self, material: &MaterialModel) -> &[T] {
        self.batches.get(material).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(material, instances)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&MaterialModel, &[T])> {
        self.batches.iter().map(|(m, v)| (m, v.as_slice()))
    }

    /// Number of distinct materials (one bind each).
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total number of instances across all batches.
    pub fn instance_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// Returns `true` if no instance has been added.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
