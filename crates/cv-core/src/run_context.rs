//! Per-invocation run context and artifact layout
//!
//! One timestamp is shared by every warehouse in an invocation so that all
//! artifacts land under a single run directory. The context is an explicit
//! value handed to each stage — there is no process-wide run state.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreResult;
use crate::warehouse_name::WarehouseName;

/// Context for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Run identifier, e.g. `20260806_142501`
    pub run_id: String,

    /// Root directory holding every artifact of this run
    pub root: PathBuf,

    /// When the run began
    pub started_at: DateTime<Utc>,

    /// Re-extract even when a cached snapshot already exists
    pub force_refresh: bool,
}

impl RunContext {
    /// Create a run context under `output_dir`, stamping the run directory
    /// with the current time.
    pub fn create(output_dir: &Path, force_refresh: bool) -> CoreResult<Self> {
        let started_at = Utc::now();
        let run_id = started_at.format("%Y%m%d_%H%M%S").to_string();
        Self::with_run_id(output_dir, run_id, started_at, force_refresh)
    }

    /// Create a run context with an explicit run id, e.g. to re-enter an
    /// existing run directory.
    pub fn with_run_id(
        output_dir: &Path,
        run_id: impl Into<String>,
        started_at: DateTime<Utc>,
        force_refresh: bool,
    ) -> CoreResult<Self> {
        let run_id = run_id.into();
        let root = output_dir.join(&run_id);
        fs::create_dir_all(&root)?;
        Ok(Self {
            run_id,
            root,
            started_at,
            force_refresh,
        })
    }

    /// Path of a warehouse's extracted snapshot package
    pub fn snapshot_path(&self, warehouse: &WarehouseName) -> PathBuf {
        self.root.join(format!("{warehouse}.snapshot.json"))
    }

    /// Per-warehouse directory
    pub fn warehouse_dir(&self, warehouse: &WarehouseName) -> PathBuf {
        self.root.join(warehouse.as_str())
    }

    /// Buildable source tree for a warehouse
    pub fn source_dir(&self, warehouse: &WarehouseName) -> PathBuf {
        self.warehouse_dir(warehouse).join("src")
    }

    /// Holding area for a warehouse's security objects
    pub fn security_dir(&self, warehouse: &WarehouseName) -> PathBuf {
        self.warehouse_dir(warehouse).join("Security")
    }

    /// Path of a warehouse's compiled deployable artifact
    pub fn artifact_path(&self, warehouse: &WarehouseName) -> PathBuf {
        self.warehouse_dir(warehouse)
            .join(format!("{warehouse}.bundle"))
    }

    /// Path of a warehouse's required-variables manifest
    pub fn variables_path(&self, warehouse: &WarehouseName) -> PathBuf {
        self.warehouse_dir(warehouse).join("variables.json")
    }

    /// Path of the run summary written at the end of the pipeline
    pub fn summary_path(&self) -> PathBuf {
        self.root.join("run_summary.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_makes_run_directory() {
        let dir = tempdir().unwrap();
        let ctx = RunContext::create(dir.path(), false).unwrap();

        assert!(ctx.root.is_dir());
        assert!(ctx.root.starts_with(dir.path()));
        assert_eq!(ctx.run_id.len(), "20260806_142501".len());
    }

    #[test]
    fn test_artifact_layout_is_keyed_by_warehouse() {
        let dir = tempdir().unwrap();
        let ctx =
            RunContext::with_run_id(dir.path(), "20260101_000000", Utc::now(), false).unwrap();
        let sales = WarehouseName::new("Sales");

        assert_eq!(
            ctx.snapshot_path(&sales),
            ctx.root.join("Sales.snapshot.json")
        );
        assert_eq!(ctx.source_dir(&sales), ctx.root.join("Sales").join("src"));
        assert_eq!(
            ctx.artifact_path(&sales),
            ctx.root.join("Sales").join("Sales.bundle")
        );
        assert_eq!(
            ctx.variables_path(&sales),
            ctx.root.join("Sales").join("variables.json")
        );
    }

    #[test]
    fn test_with_run_id_reenters_existing_directory() {
        let dir = tempdir().unwrap();
        let first =
            RunContext::with_run_id(dir.path(), "20260101_000000", Utc::now(), false).unwrap();
        let second =
            RunContext::with_run_id(dir.path(), "20260101_000000", Utc::now(), true).unwrap();

        assert_eq!(first.root, second.root);
        assert!(second.force_refresh);
    }
}
