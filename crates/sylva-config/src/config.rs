//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World generation settings.
    pub world: WorldConfig,
    /// Height function parameters.
    pub terrain: TerrainConfig,
    /// Object scatter rounds run for every chunk, in order.
    pub scatter: Vec<ScatterRuleConfig>,
    /// Asset location.
    pub assets: AssetsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How the placement stream is shared between chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ScatterMode {
    /// One stream for the whole world; chunk order changes placements.
    #[default]
    Sequential,
    /// One stream per chunk derived from the world seed; order-independent.
    PerChunk,
}

/// World generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. Fixes terrain shape and object placement.
    pub seed: u64,
    /// Chunks generated in each direction around the origin chunk.
    pub chunk_radius: u32,
    /// Placement stream sharing.
    pub scatter_mode: ScatterMode,
    /// Sample heightfields on worker threads.
    pub parallel_heightfields: bool,
}

/// Height function configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Noise octaves.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency of the first octave.
    pub base_frequency: f64,
    /// Amplitude of the first octave.
    pub amplitude: f64,
    /// Lowest terrain height.
    pub min_height: f64,
    /// Highest terrain height.
    pub max_height: f64,
}

/// One scatter round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterRuleConfig {
    /// Registered constructor name.
    pub constructor: String,
    /// Objects placed per chunk.
    pub count: u32,
    /// Height above the terrain surface.
    pub y_offset: f64,
    /// Uniform scale.
    pub scale: f32,
}

/// Asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Root directory for textures and models.
    pub root: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            terrain: TerrainConfig::default(),
            scatter: ScatterRuleConfig::defaults(),
            assets: AssetsConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            chunk_radius: 1,
            scatter_mode: ScatterMode::Sequential,
            parallel_heightfields: false,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.01,
            amplitude: 1.0,
            min_height: -8.0,
            max_height: 24.0,
        }
    }
}

impl Default for ScatterRuleConfig {
    fn default() -> Self {
        Self {
            constructor: String::new(),
            count: 0,
            y_offset: 0.0,
            scale: 1.0,
        }
    }
}

impl ScatterRuleConfig {
    fn rule(constructor: &str, count: u32, scale: f32) -> Self {
        Self {
            constructor: constructor.to_string(),
            count,
            y_offset: 0.0,
            scale,
        }
    }

    /// Trees, ferns and axes.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::rule("evergreen_tree", 5, 4.0),
            Self::rule("fern", 25, 3.0),
            Self::rule("axe", 2, 2.0),
        ]
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for Sylva, or `./sylva` where the platform
    /// has none.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sylva")
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Rejects settings that would make generation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        let finite = [
            t.lacunarity,
            t.persistence,
            t.base_frequency,
            t.amplitude,
            t.min_height,
            t.max_height,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "terrain",
                reason: "parameters must be finite",
            });
        }
        if t.min_height > t.max_height {
            return Err(ConfigError::Invalid {
                field: "terrain.min_height",
                reason: "must not exceed max_height",
            });
        }
        for rule in &self.scatter {
            if rule.constructor.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "scatter.constructor",
                    reason: "must name a registered constructor",
                });
            }
            if !rule.y_offset.is_finite() || !rule.scale.is_finite() || rule.scale <= 0.0 {
                return Err(ConfigError::Invalid {
                    field: "scatter.scale",
                    reason: "scale must be positive and offsets finite",
                });
            }
        }
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dir_is_named_for_the_app() {
        assert!(Config::default_dir().ends_with("sylva"));
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("seed: 42"));
        assert!(ron_str.contains("scatter_mode: Sequential"));
        assert!(ron_str.contains("\"evergreen_tree\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.world.scatter_mode = ScatterMode::PerChunk;
        config.world.seed = u64::MAX;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_scatter_quotas() {
        let scatter = Config::default().scatter;
        let quotas: Vec<_> = scatter
            .iter()
            .map(|r| (r.constructor.as_str(), r.count, r.scale))
            .collect();
        assert_eq!(
            quotas,
            vec![("evergreen_tree", 5, 4.0), ("fern", 25, 3.0), ("axe", 2, 2.0)]
        );
        assert!(scatter.iter().all(|r| r.y_offset == 0.0));
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `terrain` and `scatter` sections entirely
        let ron_str = "(world: (seed: 7), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.chunk_radius, 1);
        assert_eq!(config.terrain, TerrainConfig::default());
        assert_eq!(config.scatter, ScatterRuleConfig::defaults());
    }

    #[test]
    fn test_explicit_empty_scatter_kept() {
        let config: Config = ron::from_str("(scatter: [])").unwrap();
        assert!(config.scatter.is_empty());
    }

    #[test]
    fn test_partial_scatter_rule_uses_defaults() {
        let config: Config = ron::from_str("(scatter: [(constructor: \"fern\", count: 3)])").unwrap();
        assert_eq!(config.scatter.len(), 1);
        assert_eq!(config.scatter[0].scale, 1.0);
        assert_eq!(config.scatter[0].y_offset, 0.0);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        // RON with #[serde(default)] and deny_unknown_fields not set should accept this
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.seed = 1234;
        config.world.parallel_heightfields = true;
        config.assets.root = "/srv/assets".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.terrain.octaves = 8;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().terrain.octaves, 8);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_height_band() {
        let mut config = Config::default();
        config.terrain.min_height = 30.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "terrain.min_height",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_scatter_rules() {
        let mut config = Config::default();
        config.scatter.push(ScatterRuleConfig::default());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scatter[1].scale = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_comments_preserved() {
        let ron_str = "// This is a comment\n(\n  // Another comment\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
