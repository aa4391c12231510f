//! Error types for cv-tools

use thiserror::Error;

/// External tool operation errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// T001: external tool exited non-zero
    #[error("[T001] {tool} failed with status {status}: {stderr}")]
    CommandFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    /// T002: external tool could not be launched
    #[error("[T002] Failed to launch {tool}: {source}")]
    SpawnFailed {
        tool: String,
        source: std::io::Error,
    },

    /// T003: catalog query failed for a warehouse
    #[error("[T003] Catalog query failed for {warehouse}: {message}")]
    Catalog { warehouse: String, message: String },

    /// T004: expected artifact missing after a tool run
    #[error("[T004] Expected artifact not found at {path}")]
    MissingArtifact { path: String },

    /// T005: long-running operation did not finish within its budget
    #[error("[T005] {operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// T006: remote operation reported failure
    #[error("[T006] {operation} failed: {message}")]
    OperationFailed { operation: String, message: String },

    /// T007: malformed tool output
    #[error("[T007] Could not parse output from {tool}: {message}")]
    MalformedOutput { tool: String, message: String },

    /// T008: IO error
    #[error("[T008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ToolError
pub type ToolResult<T> = Result<T, ToolError>;
