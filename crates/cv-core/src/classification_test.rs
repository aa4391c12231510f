use super::*;

#[test]
fn test_table_classification() {
    assert_eq!(classify("Table"), ObjectCategory::Table);
    assert_eq!(classify("TABLE"), ObjectCategory::Table);
}

#[test]
fn test_constraint_classification() {
    for t in [
        "PrimaryKeyConstraint",
        "ForeignKeyConstraint",
        "CheckConstraint",
        "DefaultConstraint",
        "UniqueConstraint",
    ] {
        assert_eq!(classify(t), ObjectCategory::Constraint, "type {t}");
    }
}

#[test]
fn test_security_classification() {
    for t in ["User", "Role", "RoleMembership", "Permission", "Login"] {
        let category = classify(t);
        assert_eq!(category, ObjectCategory::Security, "type {t}");
        assert!(!category.is_buildable());
    }
}

#[test]
fn test_routable_folders() {
    assert_eq!(classify("View").folder(), "Views");
    assert_eq!(classify("StoredProcedure").folder(), "StoredProcedures");
    assert_eq!(classify("ScalarFunction").folder(), "Functions");
    assert_eq!(classify("TableValuedFunction").folder(), "Functions");
    assert_eq!(classify("Schema").folder(), "Schemas");
}

#[test]
fn test_unknown_type_routes_to_misc() {
    let category = classify("ExternalDataSource");
    assert_eq!(category, ObjectCategory::Routable { folder: "Misc" });
    assert!(category.is_buildable());
}

#[test]
fn test_object_script_from_raw() {
    let raw = RawObject {
        schema: "dbo".into(),
        name: "FK_Orders_Customers".into(),
        object_type: "ForeignKeyConstraint".into(),
        definition: "ALTER TABLE ...".into(),
        parent_table: Some("Orders".into()),
    };

    let script = ObjectScript::from_raw(raw, "ALTER TABLE ...".into(), vec!["Sales".into()]);
    assert_eq!(script.category, ObjectCategory::Constraint);
    assert_eq!(script.parent_table.as_deref(), Some("Orders"));
    assert_eq!(script.references, vec!["Sales".to_string()]);
}

#[test]
fn test_raw_object_deserialize_without_parent() {
    let json = r#"{"schema":"dbo","name":"Orders","object_type":"Table","definition":"CREATE TABLE ..."}"#;
    let raw: RawObject = serde_json::from_str(json).unwrap();
    assert!(raw.parent_table.is_none());
}
