//! Config-driven chunk generation.

use std::time::{Duration, Instant};

use sylva_assets::ResourceMgr;
use sylva_config::{Config, ScatterMode};
use sylva_ecs::EntityRegistry;
use sylva_terrain::{
    AsyncHeightfieldGenerator, ChunkCoord, HeightParams, Heightfield, PlacementRng, ScatterRule,
    TerrainGen, TerrainGenError,
};
use thiserror::Error;

use crate::world::World;

/// Upper bound on waiting for one batch of worker heightfields.
const HEIGHTFIELD_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors raised while generating several chunks.
#[derive(Debug, Error)]
pub enum WorldGenError {
    #[error(transparent)]
    Generate(#[from] TerrainGenError),

    /// Heightfield worker threads could not be started.
    #[error("failed to start heightfield workers: {0}")]
    Workers(#[from] std::io::Error),

    /// Workers did not deliver every requested heightfield in time.
    #[error("{missing} heightfields were not delivered in time")]
    Timeout { missing: usize },
}

/// Summary of a [`WorldGenerator::generate_chunks`] run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationReport {
    pub chunks: usize,
    /// Entities spawned by this run.
    pub entities: u32,
    pub elapsed: Duration,
}

/// Height parameters described by `config`.
pub fn height_params(config: &Config) -> HeightParams {
    let t = &config.terrain;
    HeightParams {
        seed: config.world.seed,
        octaves: t.octaves,
        lacunarity: t.lacunarity,
        persistence: t.persistence,
        base_frequency: t.base_frequency,
        amplitude: t.amplitude,
        min_height: t.min_height,
        max_height: t.max_height,
    }
}

/// Scatter rounds described by `config`, in order.
pub fn scatter_rules(config: &Config) -> Vec<ScatterRule> {
    config
        .scatter
        .iter()
        .map(|r| ScatterRule::new(r.constructor.clone(), r.count, r.y_offset, r.scale))
        .collect()
}

/// Generates chunks into a [`World`] according to a [`ScatterMode`].
///
/// In [`ScatterMode::Sequential`] one [`TerrainGen`] serves every chunk, so
/// placements depend on generation order. [`ScatterMode::PerChunk`] gives
/// each chunk its own placement stream.
pub struct WorldGenerator {
    params: HeightParams,
    rules: Vec<ScatterRule>,
    mode: ScatterMode,
    parallel: bool,
    shared: TerrainGen,
}

impl WorldGenerator {
    pub fn new(params: HeightParams, rules: Vec<ScatterRule>, mode: ScatterMode) -> Self {
        let shared = TerrainGen::with_params(params.clone()).with_scatter(rules.clone());
        Self {
            params,
            rules,
            mode,
            parallel: false,
            shared,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(height_params(config), scatter_rules(config), config.world.scatter_mode)
            .with_parallel(config.world.parallel_heightfields)
    }

    /// Sample heightfields on worker threads in [`generate_chunks`](Self::generate_chunks).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn mode(&self) -> ScatterMode {
        self.mode
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    /// Generates a single chunk on the calling thread.
    pub fn generate_chunk(
        &mut self,
        world: &mut World,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        coord: ChunkCoord,
    ) -> Result<(), TerrainGenError> {
        match self.mode {
            ScatterMode::Sequential => {
                self.shared
                    .generate(world, resources, registry, coord.x, coord.z)
            }
            ScatterMode::PerChunk => {
                self.chunk_generator(coord)
                    .generate(world, resources, registry, coord.x, coord.z)
            }
        }
    }

    /// Generates the square of chunks of `radius` around `center`.
    pub fn generate_area(
        &mut self,
        world: &mut World,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        center: ChunkCoord,
        radius: u32,
    ) -> Result<GenerationReport, WorldGenError> {
        let coords: Vec<_> = center.square(radius).collect();
        self.generate_chunks(world, resources, registry, &coords)
    }

    /// Generates `coords` in order. Parallel runs produce the same world as
    /// sequential ones: heightfields are applied in submission order.
    pub fn generate_chunks(
        &mut self,
        world: &mut World,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        coords: &[ChunkCoord],
    ) -> Result<GenerationReport, WorldGenError> {
        let start = Instant::now();
        let entities_before = world.entity_count();

        if self.parallel {
            self.generate_parallel(world, resources, registry, coords)?;
        } else {
            for &coord in coords {
                self.generate_chunk(world, resources, registry, coord)?;
            }
        }

        let report = GenerationReport {
            chunks: coords.len(),
            entities: world.entity_count() - entities_before,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            chunks = report.chunks,
            entities = report.entities,
            parallel = self.parallel,
            mode = ?self.mode,
            "generated {} chunks in {:.1?}",
            report.chunks,
            report.elapsed
        );
        Ok(report)
    }

    fn generate_parallel(
        &mut self,
        world: &mut World,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        coords: &[ChunkCoord],
    ) -> Result<(), WorldGenError> {
        let mut pool = AsyncHeightfieldGenerator::with_defaults(self.params.clone())?;
        let mut applied = 0;
        let mut pending = coords.iter().copied();
        let mut next = pending.next();

        while let Some(coord) = next {
            if pool.submit(coord).is_ok() {
                next = pending.next();
                continue;
            }
            // Queue full: apply everything submitted so far, then retry.
            let batch = pool.finish(HEIGHTFIELD_TIMEOUT);
            if batch.is_empty() {
                return Err(WorldGenError::Timeout {
                    missing: coords.len() - applied,
                });
            }
            for result in batch {
                self.apply_heightfield(world, resources, registry, &result.heightfield)?;
                applied += 1;
            }
        }

        for result in pool.finish(HEIGHTFIELD_TIMEOUT) {
            self.apply_heightfield(world, resources, registry, &result.heightfield)?;
            applied += 1;
        }

        if applied < coords.len() {
            return Err(WorldGenError::Timeout {
                missing: coords.len() - applied,
            });
        }
        Ok(())
    }

    fn apply_heightfield(
        &mut self,
        world: &mut World,
        resources: &mut ResourceMgr,
        registry: &EntityRegistry,
        heightfield: &Heightfield,
    ) -> Result<(), TerrainGenError> {
        match self.mode {
            ScatterMode::Sequential => {
                self.shared
                    .generate_from_heightfield(world, resources, registry, heightfield)
            }
            ScatterMode::PerChunk => self
                .chunk_generator(heightfield.coord())
                .generate_from_heightfield(world, resources, registry, heightfield),
        }
    }

    fn chunk_generator(&self, coord: ChunkCoord) -> TerrainGen {
        TerrainGen::with_params(self.params.clone())
            .with_scatter(self.rules.clone())
            .with_placement_rng(PlacementRng::for_chunk(self.params.seed, coord))
    }
}
