//! Generates a square of terrain chunks around the origin and reports what
//! was placed.

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::Parser;
use sylva_assets::ResourceMgr;
use sylva_config::{CliArgs, Config};
use sylva_ecs::EntityRegistry;
use sylva_terrain::ChunkCoord;
use sylva_world::{World, WorldGenerator};
use tracing::{debug, error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(Config::default_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    sylva_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::from(2);
    }

    let mut resources = ResourceMgr::new(&config.assets.root);
    let registry = EntityRegistry::with_defaults(&mut resources);
    let mut world = World::new();
    let mut generator = WorldGenerator::from_config(&config);

    info!(
        seed = config.world.seed,
        radius = config.world.chunk_radius,
        mode = ?config.world.scatter_mode,
        constructors = ?registry.names(),
        "generating world"
    );

    let report = match generator.generate_area(
        &mut world,
        &mut resources,
        &registry,
        ChunkCoord::default(),
        config.world.chunk_radius,
    ) {
        Ok(report) => report,
        Err(e) => {
            error!("world generation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    report_placements(&mut world);
    report_terrain(&world);
    preload_assets(&mut world, &mut resources);

    info!(
        "{} chunks, {} entities in {:.1?}",
        report.chunks, report.entities, report.elapsed
    );
    ExitCode::SUCCESS
}

/// Logs how many objects of each kind were placed.
fn report_placements(world: &mut World) {
    let placements = world.placements();
    let mut per_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for p in &placements {
        *per_kind.entry(p.name.as_str()).or_default() += 1;
    }
    for (name, count) in &per_kind {
        info!("{count:>5} x {name}");
    }
    for p in placements.iter().take(5) {
        debug!(
            "{} at ({:.2}, {:.2}, {:.2}) scale {}",
            p.name, p.position.x, p.position.y, p.position.z, p.scale
        );
    }
}

fn report_terrain(world: &World) {
    let triangles: usize = world
        .chunks()
        .into_iter()
        .filter_map(|c| world.terrain(c)?.mesh().map(|m| m.triangle_count()))
        .sum();
    info!(
        "{} terrain chunks, {} triangles",
        world.terrain_count(),
        triangles
    );
    if let Some(h) = world.surface_height(0.0, 0.0) {
        info!("surface height at origin: {h:.3}");
    }
}

/// Fetches the geometry and textures of every render batch. Missing files
/// are reported, not fatal.
fn preload_assets(world: &mut World, resources: &mut ResourceMgr) {
    let batches = world.render_batches();
    info!("{} render batches", batches.batch_count());

    let mut missing = 0;
    for (material, instances) in batches.iter() {
        debug!("batch {}: {} instances", material.name(), instances.len());
        if let Err(e) = resources.fetch_model(material.model()) {
            warn!("model for {} unavailable: {e}", material.name());
            missing += 1;
        }
        if let Err(e) = resources.fetch_texture(material.texture()) {
            warn!("texture for {} unavailable: {e}", material.name());
            missing += 1;
        }
    }
    if missing > 0 {
        warn!(
            "{missing} assets missing under {}",
            resources.root().display()
        );
    }
}
