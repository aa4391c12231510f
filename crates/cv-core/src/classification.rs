//! Extracted-object classification and folder routing
//!
//! Extraction yields a flat list of object scripts; classification decides
//! where each one lands in the per-warehouse source tree: base tables (with
//! their constraints appended), security principals routed to a holding
//! area, and everything else routed by object-type folder.

use serde::{Deserialize, Serialize};

/// One schema object as emitted by the extraction tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObject {
    /// Schema the object belongs to
    pub schema: String,

    /// Object name
    pub name: String,

    /// Object type as reported by the extraction tool, e.g. `Table`,
    /// `View`, `ForeignKeyConstraint`, `User`
    pub object_type: String,

    /// Full definition script
    pub definition: String,

    /// Owning table, for constraint objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_table: Option<String>,
}

/// Routing category for an extracted object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectCategory {
    /// Base table definition
    Table,

    /// Table constraint; appended to its parent table's script
    Constraint,

    /// Security principal or grant; routed to the holding area, never built
    Security,

    /// Any other object, routed by folder
    Routable { folder: &'static str },
}

impl ObjectCategory {
    /// Folder name this category routes to within a schema directory
    pub fn folder(&self) -> &'static str {
        match self {
            ObjectCategory::Table => "Tables",
            ObjectCategory::Constraint => "Constraints",
            ObjectCategory::Security => "Security",
            ObjectCategory::Routable { folder } => folder,
        }
    }

    /// Whether objects of this category go into the buildable source tree
    pub fn is_buildable(&self) -> bool {
        !matches!(self, ObjectCategory::Security)
    }
}

/// Classify an object type string into its routing category.
///
/// Type names are matched case-insensitively; unknown types route to a
/// `Misc` folder rather than failing, so an extraction tool that grows new
/// object types degrades gracefully.
pub fn classify(object_type: &str) -> ObjectCategory {
    match object_type.to_ascii_lowercase().as_str() {
        "table" => ObjectCategory::Table,
        "primarykeyconstraint" | "foreignkeyconstraint" | "checkconstraint"
        | "defaultconstraint" | "uniqueconstraint" => ObjectCategory::Constraint,
        "user" | "role" | "rolemembership" | "permission" | "login" => ObjectCategory::Security,
        "view" => ObjectCategory::Routable { folder: "Views" },
        "storedprocedure" => ObjectCategory::Routable {
            folder: "StoredProcedures",
        },
        "scalarfunction" | "tablevaluedfunction" => ObjectCategory::Routable {
            folder: "Functions",
        },
        "schema" => ObjectCategory::Routable { folder: "Schemas" },
        _ => ObjectCategory::Routable { folder: "Misc" },
    }
}

/// An object script after classification and rewriting.
///
/// Created once per extracted object per run and never mutated afterwards;
/// the packaging step owns the written-out files.
#[derive(Debug, Clone)]
pub struct ObjectScript {
    /// Schema the object belongs to
    pub schema: String,

    /// Object name
    pub name: String,

    /// Routing category
    pub category: ObjectCategory,

    /// Definition text after cross-warehouse reference rewriting
    pub definition: String,

    /// Owning table, for constraint objects
    pub parent_table: Option<String>,

    /// Foreign warehouses whose references were substituted in this script
    pub references: Vec<String>,
}

impl ObjectScript {
    /// Build an [`ObjectScript`] from a raw object, its rewritten
    /// definition, and the warehouses discovered in it.
    pub fn from_raw(raw: RawObject, definition: String, references: Vec<String>) -> Self {
        let category = classify(&raw.object_type);
        Self {
            schema: raw.schema,
            name: raw.name,
            category,
            definition,
            parent_table: raw.parent_table,
            references,
        }
    }
}

#[cfg(test)]
#[path = "classification_test.rs"]
mod tests;
