//! External collaborator trait definitions
//!
//! Implementations must be Send + Sync for async operation. The pipeline
//! only ever awaits these sequentially; the traits exist so the
//! orchestrator can be exercised against in-memory stand-ins.

use crate::error::ToolResult;
use async_trait::async_trait;
use cv_core::WarehouseName;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Kind of item a name resolves to in the remote catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A writable warehouse
    Warehouse,

    /// A read-only virtualized endpoint; base tables are withheld when
    /// deploying to one
    VirtualizedEndpoint,
}

/// Remote catalog service
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Distinct warehouses referenced cross-warehouse by any object inside
    /// `warehouse`.
    async fn referenced_warehouses(
        &self,
        warehouse: &WarehouseName,
    ) -> ToolResult<BTreeSet<WarehouseName>>;

    /// Resolve the catalog item kind of a target item.
    async fn item_kind(&self, item: &WarehouseName) -> ToolResult<ItemKind>;

    /// Trigger a metadata refresh for `warehouse` on the target and wait
    /// for the remote operation to finish.
    async fn refresh_metadata(&self, warehouse: &WarehouseName) -> ToolResult<()>;
}

/// Physical schema extraction into a portable snapshot package
#[async_trait]
pub trait SchemaExtractor: Send + Sync {
    /// Extract a snapshot of `warehouse` to `dest`. Side effect only; the
    /// snapshot is read back separately.
    async fn extract(&self, warehouse: &WarehouseName, dest: &Path) -> ToolResult<()>;
}

/// Compilation of a classified source tree into a deployable artifact
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    /// Build `source_dir` into `artifact`, declaring one deployment
    /// variable per name in `variables` and resolving references against
    /// the dependency artifacts in `references`.
    async fn build(
        &self,
        source_dir: &Path,
        artifact: &Path,
        variables: &[String],
        references: &[PathBuf],
    ) -> ToolResult<()>;
}

/// Application of a compiled artifact to a target item
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Deploy `artifact` to `item` on the target, binding one value per
    /// deployment variable. With `exclude_tables` set, base table objects
    /// are withheld (virtualized read endpoints).
    async fn deploy(
        &self,
        artifact: &Path,
        item: &WarehouseName,
        variables: &BTreeMap<String, String>,
        exclude_tables: bool,
    ) -> ToolResult<()>;
}
