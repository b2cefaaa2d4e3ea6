//! Error types for the validation engine
//!
//! Validation failures are data ([`crate::ValidationError`]); the variants here
//! cover registry loading and configuration faults only.

use thiserror::Error;

/// Result type for engine construction and registry loading
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Registry and engine setup errors
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Duplicate component type in registry: {0}")]
    DuplicateComponent(String),

    #[error("Duplicate property '{property}' declared for component {component}")]
    DuplicateProperty { component: String, property: String },

    #[error("Required property '{property}' is not declared for component {component}")]
    UndeclaredRequired { component: String, property: String },

    #[error("Duplicate slot '{slot}' declared for component {component}")]
    DuplicateSlot { component: String, slot: String },

    #[error("Invalid pattern for slot {component}.{slot}: {source}")]
    InvalidPattern {
        component: String,
        slot: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unsupported registry format: {0}")]
    UnsupportedFormat(String),

    #[error("Embedded registry file missing: {0}")]
    MissingEmbedded(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
