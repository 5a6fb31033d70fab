//! Minimal [`ChunkWorld`] for unit tests.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use glam::DVec3;
use sylva_assets::ResourceMgr;
use sylva_ecs::{Name, Position, Scale};

use crate::coord::ChunkCoord;
use crate::terrain::Terrain;
use crate::terrain_gen::ChunkWorld;

#[derive(Default)]
pub(crate) struct TestWorld {
    pub ecs: World,
    terrains: HashMap<ChunkCoord, Terrain>,
}

impl TestWorld {
    pub fn entity_count(&self) -> u32 {
        self.ecs.entities().len()
    }

    pub fn terrain(&self, coord: ChunkCoord) -> Option<&Terrain> {
        self.terrains.get(&coord)
    }

    pub fn terrain_count(&self) -> usize {
        self.terrains.len()
    }

    /// `(name, position, scale)` in spawn order.
    pub fn placements(&mut self) -> Vec<(String, DVec3, f32)> {
        let mut query = self.ecs.query::<(Entity, &Name, &Position, &Scale)>();
        let mut rows: Vec<_> = query
            .iter(&self.ecs)
            .map(|(e, name, pos, scale)| (e, (name.0.clone(), pos.0, scale.0)))
            .collect();
        rows.sort_by_key(|(e, _)| *e);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

impl ChunkWorld for TestWorld {
    fn add_entity(&mut self) -> EntityWorldMut<'_> {
        self.ecs.spawn_empty()
    }

    fn add_terrain(&mut self, _resources: &mut ResourceMgr, coord: ChunkCoord) -> &mut Terrain {
        let terrain = self.terrains.entry(coord).or_insert_with(|| Terrain::new(coord));
        *terrain = Terrain::new(coord);
        terrain
    }
}
