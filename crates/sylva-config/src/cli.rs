//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ScatterMode};

/// Sylva command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "sylva", about = "Procedural terrain and object scatter")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Chunks generated in each direction around the origin.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Placement stream sharing between chunks.
    #[arg(long, value_enum)]
    pub scatter_mode: Option<ScatterMode>,

    /// Sample heightfields on worker threads.
    #[arg(long)]
    pub parallel: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Asset root directory.
    #[arg(long)]
    pub assets: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(radius) = args.radius {
            self.world.chunk_radius = radius;
        }
        if let Some(mode) = args.scatter_mode {
            self.world.scatter_mode = mode;
        }
        if let Some(parallel) = args.parallel {
            self.world.parallel_heightfields = parallel;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref root) = args.assets {
            self.assets.root = root.clone();
        }
    }
}
