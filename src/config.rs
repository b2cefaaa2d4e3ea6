//! Configuration management for the validation engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (page-validator.toml)
//! - Environment variables (PAGE_VALIDATOR__*)
//!
//! ## Example config file (page-validator.toml):
//! ```toml
//! [cache]
//! capacity = 1000
//!
//! [suggestions]
//! threshold = 0.6
//! max_suggestions = 3
//!
//! [registry]
//! components = "config/components.json"
//! slots = "config/slots.toml"
//!
//! [logging]
//! filter = "page_schema_validator=info"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::similarity::SimilarityMatcher;

/// Main configuration for the validation engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// "Did you mean" settings
    #[serde(default)]
    pub suggestions: SimilarityMatcher,

    /// Registry sources
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Log filter used by the binaries
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached results
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Where registries are loaded from; unset means the built-in tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Component registry file (.json or .toml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<PathBuf>,

    /// Slot registry file (.json or .toml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "page-validator.toml",
            ".page-validator.toml",
            "config/page-validator.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        let project_dirs = directories::ProjectDirs::from("dev", "lowcode", "page-validator");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("page-validator.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PAGE_VALIDATOR__CACHE__CAPACITY=500 etc.
        builder = builder.add_source(
            Environment::with_prefix("PAGE_VALIDATOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
