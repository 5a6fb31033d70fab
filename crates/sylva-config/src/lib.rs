//! Configuration for Sylva.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Every section defaults field by field, so partial files stay valid.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetsConfig, Config, DebugConfig, ScatterMode, ScatterRuleConfig, TerrainConfig, WorldConfig,
};
pub use error::ConfigError;
