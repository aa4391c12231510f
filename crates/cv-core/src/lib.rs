//! cv-core - Core library for Caravan
//!
//! This crate provides shared types, configuration parsing, the warehouse
//! dependency graph (cycle detection and sequencing), object classification,
//! and the per-invocation run context used across all Caravan components.

pub mod classification;
pub mod config;
pub mod error;
pub mod graph;
pub mod run_context;
pub mod warehouse_name;

pub use classification::{classify, ObjectCategory, ObjectScript, RawObject};
pub use config::{EndpointConfig, MigrationConfig, PollConfig, ToolsConfig};
pub use error::{CoreError, CoreResult};
pub use graph::{Cycle, DependencyGraph};
pub use run_context::RunContext;
pub use warehouse_name::WarehouseName;
