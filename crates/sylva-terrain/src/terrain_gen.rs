//! Chunk generation: heightfield sampling, meshing and seeded object scatter.

use bevy_ecs::world::EntityWorldMut;
use rand::distr::Uniform;
use sylva_assets::ResourceMgr;
use sylva_ecs::{
    AXE, EVERGREEN_TREE, EntityConstructor, EntityRegistry, FERN, Position, RegistryError, Scale,
};
use thiserror::Error;

use crate::coord::{ChunkCoord, TERRAIN_INTERVAL, TERRAIN_SIZE, TERRAIN_VERTEX_COUNT};
use crate::height_gen::{HeightGen, HeightParams};
use crate::heightfield::Heightfield;
use crate::placement_rng::PlacementRng;
use crate::terrain::{Terrain, TerrainError};

// ---------------------------------------------------------------------------
// World contract
// ---------------------------------------------------------------------------

/// The slice of a game world that chunk generation writes into.
pub trait ChunkWorld {
    /// Spawns an empty entity and hands it back for construction.
    fn add_entity(&mut self) -> EntityWorldMut<'_>;

    /// Creates the terrain for `coord` and returns it for filling.
    fn add_terrain(&mut self, resources: &mut ResourceMgr, coord: ChunkCoord) -> &mut Terrain;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by [`TerrainGen::generate`].
///
/// Generation is not atomic: when a scatter rule fails, the terrain and the
/// entities of earlier rules stay in the world.
#[derive(Debug, Error)]
pub enum TerrainGenError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),

    /// A precomputed heightfield came from a different height function.
    #[error("heightfield for chunk {0} was sampled with different height parameters")]
    ParamsMismatch(ChunkCoord),
}

// ---------------------------------------------------------------------------
// Scatter rules
// ---------------------------------------------------------------------------

/// One round of object scatter: `count` objects built by `constructor`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterRule {
    pub constructor: String,
    pub count: u32,
    pub y_offset: f64,
    pub scale: f32,
}

impl ScatterRule {
    pub fn new(constructor: impl Into<String>, count: u32, y_offset: f64, scale: f32) -> Self {
        Self {
            constructor: constructor.into(),
            count,
            y_offset,
            scale,
        }
    }

    /// Five trees, twenty-five ferns and two axes per chunk.
    pub fn defaults() -> Vec<ScatterRule> {
        vec![
            ScatterRule::new(EVERGREEN_TREE, 5, 0.0, 4.0),
            ScatterRule::new(FERN, 25, 0.0, 3.0),
            ScatterRule::new(AXE, 2, 0.0, 2.0),
        ]
    }
}

// ---------------------------------------------------------------------------
// TerrainGen
// ---------------------------------------------------------------------------

/// Generates terrain chunks and scatters objects over them.
///
/// Every chunk generated by one instance draws from the same placement
/// stream, so the objects of a chunk depend on which chunks were generated
/// before it. Use [`TerrainGen::for_chunk`] for order-independent placement.
pub struct TerrainGen {
    height_gen: HeightGen,
    rng: PlacementRng,
    local_offset: Uniform<f64>,
    zero_to_one: Uniform<f64>,
    scatter: Vec<ScatterRule>,
}

impl TerrainGen {
    /// Height function and placement stream both seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_params(HeightParams::with_seed(seed))
    }

    /// Custom height parameters; the placement stream uses `params.seed`.
    pub fn with_params(params: HeightParams) -> Self {
        let rng = PlacementRng::new(params.seed);
        Self {
            height_gen: HeightGen::with_params(params),
            rng,
            local_offset: unit_range(0.0, TERRAIN_SIZE),
            zero_to_one: unit_range(0.0, 1.0),
            scatter: ScatterRule::defaults(),
        }
    }

    /// Heights from `world_seed`, placements from a stream owned by `coord`.
    pub fn for_chunk(world_seed: u64, coord: ChunkCoord) -> Self {
        Self::new(world_seed).with_placement_rng(PlacementRng::for_chunk(world_seed, coord))
    }

    /// Replaces the scatter rounds run by [`generate`](Self::generate).
    pub fn with_scatter(mut self, rules: Vec<ScatterRule>) -> Self {
        self.scatter = rules;
        self
    }

    /// Replaces the placement stream.
    pub fn with_placement_rng(mut self, rng: PlacementRng) -> Self {
        self.rng = rng;
        self
    }

    /// Terrain height at world `(pos_x, pos_z)`.
    pub fn get_terrain_height(&self, pos_x: f64, pos_z: f64) -> f64 {
        self.height_gen.generate_height(pos_x, pos_z)
    }

    pub fn height_gen(&self) -> &HeightGen {
        &self.height_gen
    }

    pub fn scatter_rules(&self) -> &[ScatterRule] {
        &self.scatter
    }

    /// Samples drawn from the placement stream so far.
    pub fn placement_draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Uniform `[0, 1)` distribution kept for probability-gated placement.
    /// Generation never draws from it.
    pub fn zero_to_one(&self) -> &Uniform<f64> {
        &self.zero_to_one
    }

    /// Places `count` objects at random positions inside chunk
    /// `(chunk_x, chunk_z)`, resting at terrain height plus `y_offset`.
    ///
    /// Each object consumes two samples (x, then z).
    #[allow(clippy::too_many_arguments)]
    pub fn add_objects<W: ChunkWorld + ?Sized>(
        &mut self,
        world: &mut W,
        chunk_x: i32,
        chunk_z: i32,
        count: u32,
        y_offset: f64,
        scale: f32,
        constructor: &dyn EntityConstructor,
    ) {
        let (origin_x, origin_z) = ChunkCoord::new(chunk_x, chunk_z).origin();

        for _ in 0..count {
            let local_x = self.rng.sample(&self.local_offset);
            let local_z = self.rng.sample(&self.local_offset);
            let x = below(origin_x + local_x, origin_x + TERRAIN_SIZE);
            let z = below(origin_z + local_z, origin_z + TERRAIN_SIZE);
            let y = self.get_terrain_height(x, z) + y_offset;

            let mut entity = world.add_entity();
            constructor.construct(&mut entity);
            entity.insert((Scale(scale), Position::new(x, y, z)));
        }
    }

    /// Generates chunk `(chunk_x, chunk_z)`: terrain heights, mesh, then one
    /// scatter round per rule.
    ///
    /// # Errors
    ///
    /// Fails with [`TerrainGenError::Registry`] when a rule names an unknown
    /// constructor. Rounds before it have already placed their objects.
    pub fn generate<W: ChunkWorld + ?Sized>(
        &mut self,
        world: &mut W,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        chunk_x: i32,
        chunk_z: i32,
    ) -> Result<(), TerrainGenError> {
        let coord = ChunkCoord::new(chunk_x, chunk_z);
        let (origin_x, origin_z) = coord.origin();

        let terrain = world.add_terrain(resources, coord);
        for ix in 0..TERRAIN_VERTEX_COUNT {
            for iz in 0..TERRAIN_VERTEX_COUNT {
                let pos_x = ix as f64 * TERRAIN_INTERVAL;
                let pos_z = iz as f64 * TERRAIN_INTERVAL;
                let height = self.get_terrain_height(origin_x + pos_x, origin_z + pos_z);
                terrain.set_terrain_height(pos_x, pos_z, height as f32)?;
            }
        }
        terrain.generate_mesh(resources);

        self.scatter_objects(world, registry, coord)
    }

    /// Like [`generate`](Self::generate), but fills the terrain from a
    /// heightfield sampled ahead of time.
    pub fn generate_from_heightfield<W: ChunkWorld + ?Sized>(
        &mut self,
        world: &mut W,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        heightfield: &Heightfield,
    ) -> Result<(), TerrainGenError> {
        let coord = heightfield.coord();
        if heightfield.params() != self.height_gen.params() {
            return Err(TerrainGenError::ParamsMismatch(coord));
        }

        let terrain = world.add_terrain(resources, coord);
        terrain.copy_heightfield(heightfield)?;
        terrain.generate_mesh(resources);

        self.scatter_objects(world, registry, coord)
    }

    fn scatter_objects<W: ChunkWorld + ?Sized>(
        &mut self,
        world: &mut W,
        registry: &EntityRegistry,
        coord: ChunkCoord,
    ) -> Result<(), TerrainGenError> {
        let draws_before = self.rng.draws();
        let rules = self.scatter.clone();
        for rule in &rules {
            let constructor = registry.get_constructor(&rule.constructor)?;
            self.add_objects(
                world,
                coord.x,
                coord.z,
                rule.count,
                rule.y_offset,
                rule.scale,
                constructor,
            );
        }
        tracing::debug!(
            chunk = %coord,
            objects = (self.rng.draws() - draws_before) / 2,
            "generated terrain chunk"
        );
        Ok(())
    }
}

/// `value`, or the largest float strictly below `limit` if rounding pushed it
/// onto or past the limit.
fn below(value: f64, limit: f64) -> f64 {
    if value < limit {
        return value;
    }
    let bits = limit.to_bits();
    if limit > 0.0 {
        f64::from_bits(bits - 1)
    } else if limit < 0.0 {
        f64::from_bits(bits + 1)
    } else {
        -f64::from_bits(1)
    }
}

/// Uniform over `[low, high)` for constant, finite `low < high`.
fn unit_range(low: f64, high: f64) -> Uniform<f64> {
    match Uniform::new(low, high) {
        Ok(dist) => dist,
        Err(_) => unreachable!("constant range [{low}, {high}) is valid"),
    }
}
