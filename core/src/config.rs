//! Process-wide configuration.
//!
//! RULE: Set once at process start (explicitly via `init`, or lazily from
//! the bundled data directory on first `global()` call). Never mutated
//! afterwards.

use crate::error::{EntityError, EntityResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ENTITY_DATA_DIR";

/// Data directory bundled with this crate.
pub const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

const CONFIG_FILE_NAME: &str = "config.json";

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    /// Source used by `Entity::new()`.
    pub entity_default:  PathBuf,
    pub entity_template: PathBuf,
    pub entity_demo:     PathBuf,
    pub entity_demo_mat: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Reference year assumed when a source does not state one.
    pub present_ref_year: i32,
    pub paths:            DataPaths,
}

impl Config {
    /// Load from `<data_dir>/config.json`. Relative paths are resolved
    /// against `data_dir`.
    /// In tests, use Config::default_test().
    pub fn load(data_dir: impl AsRef<Path>) -> EntityResult<Self> {
        let data_dir = data_dir.as_ref();
        let path = data_dir.join(CONFIG_FILE_NAME);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.paths.resolve_against(data_dir);
        Ok(config)
    }

    /// Built-in defaults pointing at the bundled data directory.
    pub fn default_test() -> Self {
        let mut paths = DataPaths {
            entity_default:  PathBuf::from("system/entity_template.xlsx"),
            entity_template: PathBuf::from("system/entity_template.xlsx"),
            entity_demo:     PathBuf::from("demo/demo_today.xlsx"),
            entity_demo_mat: PathBuf::from("demo/demo_today.mat"),
        };
        paths.resolve_against(Path::new(BUNDLED_DATA_DIR));
        Self { present_ref_year: 2016, paths }
    }
}

impl DataPaths {
    fn resolve_against(&mut self, dir: &Path) {
        for path in [
            &mut self.entity_default,
            &mut self.entity_template,
            &mut self.entity_demo,
            &mut self.entity_demo_mat,
        ] {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

/// Install the process-wide configuration. Fails if one is already set.
pub fn init(config: Config) -> EntityResult<()> {
    CONFIG.set(config).map_err(|_| {
        EntityError::Other(anyhow::anyhow!("configuration already initialized"))
    })
}

/// The process-wide configuration, loading it on first use.
pub fn global() -> &'static Config {
    CONFIG.get_or_init(|| {
        let data_dir = std::env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(BUNDLED_DATA_DIR));
        match Config::load(&data_dir) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using built-in configuration: {e}");
                Config::default_test()
            }
        }
    })
}
