//! cv-tools - External collaborator boundaries for Caravan
//!
//! This crate provides the trait definitions for the catalog, extraction,
//! build, and deploy tools, the process-spawning implementation of those
//! traits, and the catalog-driven dependency graph discovery.

pub mod discovery;
pub mod error;
pub mod poll;
pub mod process;
pub mod snapshot;
pub mod traits;

pub use discovery::build_graph;
pub use error::{ToolError, ToolResult};
pub use process::CliToolchain;
pub use snapshot::{read_snapshot, Snapshot};
pub use traits::{CatalogClient, Deployer, ItemKind, PackageBuilder, SchemaExtractor};
