//! Error types for cv-core

use thiserror::Error;

/// Core error type for Caravan
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Empty name where a warehouse name is required
    #[error("[E003] Empty name: {context}")]
    EmptyName { context: String },

    /// E004: Circular dependency detected
    #[error("[E004] Circular reference chain detected: {cycles}")]
    CircularDependency { cycles: String },

    /// E005: Sequencing postcondition failure
    ///
    /// The computed order did not cover every warehouse in the graph. This
    /// indicates a logic or data inconsistency rather than an ordinary
    /// cycle, which is reported as [E004] before sequencing begins.
    #[error("[E005] Processing order incomplete; unresolved warehouses: {unresolved}")]
    UnresolvedOrder { unresolved: String },

    /// E006: IO error
    #[error("[E006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E007: Config/YAML parse error
    #[error("[E007] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
