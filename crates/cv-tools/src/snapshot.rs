//! Snapshot package reading
//!
//! The extraction tool writes one JSON snapshot per warehouse: the
//! warehouse name plus the flat list of object scripts. This is the only
//! data the core consumes from the extraction boundary.

use crate::error::ToolResult;
use cv_core::RawObject;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An extracted schema snapshot package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Warehouse the snapshot was extracted from
    pub warehouse: String,

    /// Every extracted object script
    pub objects: Vec<RawObject>,
}

/// Read a snapshot package from disk.
pub fn read_snapshot(path: &Path) -> ToolResult<Snapshot> {
    let content = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_snapshot_round_trip() {
        let snapshot = Snapshot {
            warehouse: "Sales".into(),
            objects: vec![RawObject {
                schema: "dbo".into(),
                name: "Orders".into(),
                object_type: "Table".into(),
                definition: "CREATE TABLE dbo.Orders (id INT)".into(),
                parent_table: None,
            }],
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&snapshot).unwrap().as_bytes())
            .unwrap();

        let loaded = read_snapshot(file.path()).unwrap();
        assert_eq!(loaded.warehouse, "Sales");
        assert_eq!(loaded.objects.len(), 1);
        assert_eq!(loaded.objects[0].name, "Orders");
    }

    #[test]
    fn test_read_snapshot_missing_file() {
        let result = read_snapshot(Path::new("/nonexistent/x.snapshot.json"));
        assert!(matches!(result.unwrap_err(), crate::ToolError::Io(_)));
    }
}
