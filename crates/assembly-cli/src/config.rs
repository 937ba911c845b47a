//! Planner configuration.
//!
//! Holds the dataset location, default depth limits and output options.
//! Configuration can be loaded from and saved to a TOML file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use assembly_planner::{DEFAULT_EXPLORE_DEPTH, DEFAULT_FLOW_DEPTH, DEFAULT_TREE_DEPTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Configuration file name.
const CONFIG_FILE: &str = "assembly.toml";

/// Largest depth any builder accepts from configuration or flags.
pub const MAX_DEPTH: u32 = 32;

/// Errors reading a config file that exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be opened or read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// File is not valid TOML or has a field of the wrong type
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

/// Planner configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Production dataset (JSON)
    pub dataset_path: PathBuf,
    /// Recipe levels expanded by `tree`
    pub tree_max_depth: usize,
    /// Recipe levels expanded by `flow`
    pub flow_max_depth: usize,
    /// Item hops explored by `explore`
    pub explore_depth: usize,
    /// Pretty-print JSON output
    pub pretty_json: bool,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/recipes.json"),
            tree_max_depth: DEFAULT_TREE_DEPTH,
            flow_max_depth: DEFAULT_FLOW_DEPTH,
            explore_depth: DEFAULT_EXPLORE_DEPTH,
            pretty_json: true,
            log_filter: "assembly=info".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the default file location.
    ///
    /// See [`PlannerConfig::load_from`].
    pub fn load() -> (Self, Option<ConfigError>) {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns defaults if the file doesn't exist. If it exists but cannot be
    /// read or parsed, the defaults are returned together with the failure so
    /// the caller can report it once logging is up.
    pub fn load_from<P: AsRef<Path>>(path: P) -> (Self, Option<ConfigError>) {
        match Self::try_load_from(path) {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load configuration from a specific path, `None` if the file doesn't exist.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let mut contents = String::new();
        fs::File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        if let Some(config_dir) = dirs_config_path() {
            config_dir.join("assembly").join(CONFIG_FILE)
        } else {
            PathBuf::from(CONFIG_FILE)
        }
    }

    /// Clamp depth limits to sensible ranges.
    pub fn validate(&mut self) {
        let max = MAX_DEPTH as usize;
        self.tree_max_depth = self.tree_max_depth.clamp(1, max);
        self.flow_max_depth = self.flow_max_depth.clamp(1, max);
        self.explore_depth = self.explore_depth.min(max);
        if self.log_filter.trim().is_empty() {
            self.log_filter = Self::default().log_filter;
        }
    }
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.tree_max_depth, 5);
        assert_eq!(config.flow_max_depth, 3);
        assert_eq!(config.explore_depth, 2);
        assert!(config.pretty_json);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PlannerConfig::default();
        config.tree_max_depth = 0;
        config.flow_max_depth = 1000;
        config.explore_depth = 99;
        config.log_filter = "  ".to_string();

        config.validate();

        assert_eq!(config.tree_max_depth, 1);
        assert_eq!(config.flow_max_depth, 32);
        assert_eq!(config.explore_depth, 32);
        assert_eq!(config.log_filter, "assembly=info");
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("assembly.toml");

        let mut config = PlannerConfig::default();
        config.dataset_path = PathBuf::from("/srv/data/space-age.json");
        config.flow_max_depth = 6;
        config.pretty_json = false;

        config.save_to(&config_path).expect("Failed to save config");

        let (loaded, error) = PlannerConfig::load_from(&config_path);
        assert!(error.is_none());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_partial_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("assembly.toml");
        fs::write(&config_path, "tree_max_depth = 9\n").expect("write");

        let (loaded, error) = PlannerConfig::load_from(&config_path);
        assert!(error.is_none());
        assert_eq!(loaded.tree_max_depth, 9);
        assert_eq!(loaded.flow_max_depth, DEFAULT_FLOW_DEPTH);
    }

    #[test]
    fn test_config_load_missing_file() {
        let (config, error) = PlannerConfig::load_from("/nonexistent/path/assembly.toml");
        assert!(error.is_none());
        assert_eq!(config, PlannerConfig::default());
        assert!(matches!(
            PlannerConfig::try_load_from("/nonexistent/path/assembly.toml"),
            Ok(None)
        ));
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("assembly.toml");
        fs::write(&config_path, "tree_max_depth = \"deep\"").expect("write");

        let (config, error) = PlannerConfig::load_from(&config_path);
        assert_eq!(config, PlannerConfig::default());

        let error = error.expect("invalid file reports an error");
        assert!(matches!(error, ConfigError::Parse { .. }));
        let message = error.to_string();
        assert!(message.starts_with("Failed to parse config file"));
        assert!(message.contains("assembly.toml"));
    }
}
