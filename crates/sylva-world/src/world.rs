//! Entity and terrain storage.

use bevy_ecs::prelude::{Entity, EntityWorldMut};
use bevy_ecs::world::World as EcsWorld;
use glam::DVec3;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use sylva_assets::ResourceMgr;
use sylva_ecs::{Name, Position, Renderable, Scale};
use sylva_materials::MaterialBatches;
use sylva_terrain::{ChunkCoord, ChunkWorld, Terrain};

/// A positioned object as seen by tools and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub entity: Entity,
    /// Constructor name, empty if the entity has no [`Name`].
    pub name: String,
    pub position: DVec3,
    pub scale: f32,
}

/// Placed objects plus the terrain chunks they stand on.
#[derive(Default)]
pub struct World {
    ecs: EcsWorld,
    terrains: HashMap<ChunkCoord, Terrain>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> u32 {
        self.ecs.entities().len()
    }

    pub fn terrain(&self, coord: ChunkCoord) -> Option<&Terrain> {
        self.terrains.get(&coord)
    }

    pub fn terrain_count(&self) -> usize {
        self.terrains.len()
    }

    /// Loaded chunk coordinates in ascending order.
    pub fn chunks(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.terrains.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Every entity carrying a [`Position`] and [`Scale`], in spawn order.
    pub fn placements(&mut self) -> Vec<Placement> {
        let mut query = self
            .ecs
            .query::<(Entity, Option<&Name>, &Position, &Scale)>();
        let mut placements: Vec<Placement> = query
            .iter(&self.ecs)
            .map(|(entity, name, position, scale)| Placement {
                entity,
                name: name.map(|n| n.0.clone()).unwrap_or_default(),
                position: position.0,
                scale: scale.0,
            })
            .collect();
        placements.sort_by_key(|p| p.entity);
        placements
    }

    /// Renderable entities grouped by material, one group per bind.
    pub fn render_batches(&mut self) -> MaterialBatches<Entity> {
        let mut batches = MaterialBatches::new();
        let mut query = self.ecs.query::<(Entity, &Renderable)>();
        let mut rows: Vec<_> = query.iter(&self.ecs).collect();
        rows.sort_by_key(|(entity, _)| *entity);
        for (entity, renderable) in rows {
            batches.push(&renderable.0, entity);
        }
        batches
    }

    /// Interpolated terrain height at world `(x, z)`, if that chunk is loaded.
    pub fn surface_height(&self, x: f64, z: f64) -> Option<f64> {
        let coord = ChunkCoord::containing(x, z);
        let (ox, oz) = coord.origin();
        self.terrains
            .get(&coord)?
            .height_at(x - ox, z - oz)
            .map(f64::from)
    }

    pub fn ecs(&self) -> &EcsWorld {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut EcsWorld {
        &mut self.ecs
    }
}

impl ChunkWorld for World {
    fn add_entity(&mut self) -> EntityWorldMut<'_> {
        self.ecs.spawn_empty()
    }

    fn add_terrain(&mut self, _resources: &mut ResourceMgr, coord: ChunkCoord) -> &mut Terrain {
        match self.terrains.entry(coord) {
            Entry::Occupied(entry) => {
                tracing::warn!(chunk = %coord, "replacing already generated terrain chunk");
                let terrain = entry.into_mut();
                *terrain = Terrain::new(coord);
                terrain
            }
            Entry::Vacant(entry) => entry.insert(Terrain::new(coord)),
        }
    }
}
