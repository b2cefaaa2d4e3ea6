//! Page Schema Validator
//!
//! Validates component trees produced by page-generation models before they
//! reach a renderer. Trees are checked against a registry of component
//! contracts; results are cached by tree content.
//!
//! ## Features
//!
//! - **Structural validation**: unknown types, required and unknown properties,
//!   property type mismatches and slot node checks, all with tree paths
//! - **Suggestions**: "did you mean" candidates from normalized edit distance
//! - **Result cache**: content-addressed, bounded, insertion-order eviction
//! - **Named slots**: a separate surface checking slot maps against a slot registry
//! - **Instrumentation**: per-node debug traces and aggregate performance counters
//!
//! ## Example
//!
//! ```no_run
//! use page_schema_validator::{ComponentNode, ValidationEngine};
//!
//! let engine = ValidationEngine::builtin()?;
//! let tree = ComponentNode::new("Card").with_prop("title", "Orders");
//! let result = engine.validate(&tree, false);
//! assert!(result.valid);
//! # Ok::<(), page_schema_validator::ValidatorError>(())
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through `tracing` on three targets: [`LOG_RUNTIME`] (walk
//! progress and errors), [`LOG_PERFORMANCE`] (timings) and [`LOG_CACHE`]
//! (hits, misses, evictions).

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod result;
pub mod schema;
pub mod similarity;
pub mod slots;
pub mod validator;

pub use cache::{CacheKey, ResultCache};
pub use config::ValidatorConfig;
pub use engine::ValidationEngine;
pub use error::{Result, ValidatorError};
pub use registry::{ComponentContract, ComponentRegistry, PropertyContract};
pub use result::{
    CacheStats, DebugInfo, ErrorCode, NodeTrace, PerformanceInfo, PerformanceStats,
    ValidationError, ValidationResult,
};
pub use schema::{ComponentNode, PropValue, ValueType, SLOT_TYPE};
pub use similarity::{similarity, SimilarityMatcher};
pub use slots::{SlotRegistry, SlotValidationError, SlotValidator};
pub use validator::StructuralValidator;

/// Log target for validation progress and errors
pub const LOG_RUNTIME: &str = "page_schema_validator::runtime";

/// Log target for timing output
pub const LOG_PERFORMANCE: &str = "page_schema_validator::performance";

/// Log target for cache activity
pub const LOG_CACHE: &str = "page_schema_validator::cache";
