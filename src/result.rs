//! Validation result types
//!
//! Everything here is plain data: results are cached and handed back to
//! callers unchanged on a cache hit.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Error Codes
// =============================================================================

/// Machine-readable category of a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Node type is not in the component registry
    UnknownComponent,
    /// A required property is absent
    MissingProperty,
    /// A property is not declared by the component contract
    UnknownProperty,
    /// A property value has the wrong primitive kind
    InvalidPropertyType,
    /// Slot node without a name
    SlotMissingName,
    /// Slot node without content
    SlotEmpty,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownComponent => "UNKNOWN_COMPONENT",
            Self::MissingProperty => "MISSING_PROPERTY",
            Self::UnknownProperty => "UNKNOWN_PROPERTY",
            Self::InvalidPropertyType => "INVALID_PROPERTY_TYPE",
            Self::SlotMissingName => "SLOT_MISSING_NAME",
            Self::SlotEmpty => "SLOT_EMPTY",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single problem found in a component tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Traversal steps from the root, e.g. `["children[0]", "properties.title"]`
    pub path: Vec<String>,
    pub message: String,
    /// Type of the node the error belongs to
    pub component_type: String,
    pub code: ErrorCode,
    /// Advisory "did you mean" candidates; never affect validity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ValidationError {
    pub fn new(
        code: ErrorCode,
        path: Vec<String>,
        component_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            message: message.into(),
            component_type: component_type.into(),
            code,
            suggestions: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    /// Path joined with `.`; `<root>` for the tree root
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {} ({})",
            self.code,
            self.message,
            self.path_string(),
            self.component_type
        )?;
        if let Some(suggestions) = self.suggestions.as_ref().filter(|s| !s.is_empty()) {
            write!(f, "; did you mean: {}", suggestions.join(", "))?;
        }
        Ok(())
    }
}

// =============================================================================
// Result
// =============================================================================

/// Timing and size of one (uncached) validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInfo {
    pub duration_micros: f64,
    pub nodes_checked: usize,
}

/// Per-node record produced in debug mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTrace {
    pub component_type: String,
    pub path: Vec<String>,
    pub duration_micros: f64,
    pub child_count: usize,
    /// Errors at this node, including those of its descendants
    pub errors: Vec<ValidationError>,
}

/// Cache counters captured when a result was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub trace: Vec<NodeTrace>,
    pub cache_stats: CacheStats,
}

/// Outcome of validating one component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub performance: PerformanceInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Errors with the given code
    pub fn errors_with_code(&self, code: ErrorCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }
}

/// Aggregate counters reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub cache_size: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Mean duration of uncached validations; zero when there were none
    pub average_validation_micros: f64,
}
