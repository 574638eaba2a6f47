//! Persister flows against the recording executor
//!
//! Covers transaction boundaries, alternate key checks, relationship delete actions
//! and loading objects back from rows.

use sea_query::Value;
use tablemap::test_helpers::shapes::{self, class_table};
use tablemap::test_helpers::RecordingExecutor;
use tablemap::{
    BusinessObject, ClassDef, ClassDefRegistry, Criteria, DeleteAction, KeyDef, MapError,
    MappingConfig, PersistError, Persister, PrimaryKeyDef, PropDef, PropType, Row, SqlMapper,
    SuperClassDef,
};
use uuid::Uuid;

fn row(values: &[(&str, Value)]) -> Row {
    values
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ============================================================================
// Save
// ============================================================================

#[test]
fn test_save_new_object_inserts_in_one_transaction() {
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut circle = BusinessObject::new(class_table::circle());
    circle.set_value("ShapeName", "MyShape").unwrap();
    circle.set_value("Radius", 10i64).unwrap();
    persister.save(&mut circle).unwrap();

    assert_eq!(
        executor.log(),
        [
            "BEGIN",
            "INSERT INTO Shape (ShapeID, ShapeName) VALUES (?Param0, ?Param1)",
            "INSERT INTO Circle (CircleID, Radius, ShapeID) VALUES (?Param0, ?Param1, ?Param2)",
            "COMMIT",
        ]
    );
    assert!(!circle.is_new());
    assert!(!circle.is_dirty());
}

#[test]
fn test_save_clean_object_runs_nothing() {
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut circle = BusinessObject::new(class_table::circle());
    persister.save(&mut circle).unwrap();
    executor.clear();

    persister.save(&mut circle).unwrap();
    assert!(executor.log().is_empty());

    circle.set_value("Radius", 4i64).unwrap();
    persister.save(&mut circle).unwrap();
    assert_eq!(executor.log().len(), 3);
    assert!(executor.log()[1].starts_with("UPDATE Circle SET"));
}

#[test]
fn test_failed_statement_rolls_back_and_keeps_state() {
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    executor.fail_on("INSERT INTO Circle");
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut circle = BusinessObject::new(class_table::circle());
    circle.set_value("Radius", 10i64).unwrap();
    let err = persister.save(&mut circle).unwrap_err();

    assert!(matches!(err, PersistError::Exec(_)));
    assert_eq!(executor.log().last().map(String::as_str), Some("ROLLBACK"));
    assert!(circle.is_new());
    assert!(circle.is_dirty());
}

#[test]
fn test_update_matching_no_row_is_record_not_found() {
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut circle = BusinessObject::new(class_table::circle());
    circle.mark_persisted();
    circle.set_value("Radius", 3i64).unwrap();
    executor.push_affected(0);

    let err = persister.save(&mut circle).unwrap_err();
    assert!(matches!(err, PersistError::RecordNotFound { ref class, .. } if class == "Circle"));
    assert!(circle.is_dirty());
}

#[test]
fn test_invalid_object_is_not_saved() {
    let class = ClassDef::builder("Account", "Account")
        .property(PropDef::new("AccountID", PropType::Guid))
        .property(PropDef::new("Code", PropType::String).compulsory())
        .primary_key(PrimaryKeyDef::object_id("AccountID"))
        .build_arc()
        .unwrap();
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut account = BusinessObject::new(class);
    let err = persister.save(&mut account).unwrap_err();
    assert!(matches!(err, PersistError::Object(_)));
    assert!(executor.log().is_empty());
}

#[test]
fn test_duplicate_alternate_key_blocks_insert() {
    let class = ClassDef::builder("Account", "Account")
        .property(PropDef::new("AccountID", PropType::Guid))
        .property(PropDef::new("Code", PropType::String))
        .primary_key(PrimaryKeyDef::object_id("AccountID"))
        .key(KeyDef::new("UniqueCode", ["Code"]))
        .build_arc()
        .unwrap();
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    executor.push_count(1);
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut account = BusinessObject::new(class);
    account.set_value("Code", "ACC-1").unwrap();
    let err = persister.save(&mut account).unwrap_err();

    assert_eq!(
        err,
        PersistError::DuplicateKey {
            class: "Account".to_string(),
            key: "UniqueCode".to_string(),
        }
    );
    assert_eq!(
        executor.log(),
        ["SELECT COUNT(*) FROM Account WHERE Code = ?Param0"]
    );

    persister.save(&mut account).unwrap();
    assert!(!account.is_new());
}

#[test]
fn test_inherited_key_is_checked_across_ancestor_rows() {
    let shape = ClassDef::builder("Shape", "Shape")
        .property(PropDef::new("ShapeID", PropType::Guid))
        .property(PropDef::new("ShapeName", PropType::String))
        .primary_key(PrimaryKeyDef::object_id("ShapeID"))
        .key(KeyDef::new("UniqueName", ["ShapeName"]))
        .build_arc()
        .unwrap();
    let circle = ClassDef::builder("Circle", "Circle")
        .property(PropDef::new("CircleID", PropType::Guid))
        .property(PropDef::new("Radius", PropType::Integer))
        .primary_key(PrimaryKeyDef::object_id("CircleID"))
        .super_class(SuperClassDef::class_table(shape))
        .build_arc()
        .unwrap();
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    executor.push_count(1);
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut object = BusinessObject::new(circle);
    object.set_value("ShapeName", "Taken").unwrap();
    let err = persister.save(&mut object).unwrap_err();

    assert_eq!(
        err,
        PersistError::DuplicateKey {
            class: "Circle".to_string(),
            key: "UniqueName".to_string(),
        }
    );
    assert_eq!(
        executor.log(),
        ["SELECT COUNT(*) FROM Shape WHERE ShapeName = ?Param0"]
    );
}

// ============================================================================
// Delete
// ============================================================================

fn saved_drawing(registry: &ClassDefRegistry) -> BusinessObject {
    let mut drawing = BusinessObject::new(registry.require("Drawing").unwrap());
    drawing.set_value("Title", "Plan").unwrap();
    drawing.mark_persisted();
    drawing
}

#[test]
fn test_delete_prevented_by_related_rows() {
    let registry = shapes::drawing_registry(DeleteAction::Prevent);
    let executor = RecordingExecutor::new();
    executor.push_count(2);
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut drawing = saved_drawing(&registry);
    let err = persister.delete(&mut drawing).unwrap_err();

    assert_eq!(
        err,
        PersistError::Map(MapError::DeletePrevented {
            class: "Drawing".to_string(),
            relationship: "Sketches".to_string(),
        })
    );
    assert_eq!(
        executor.log(),
        [
            "BEGIN",
            "SELECT COUNT(*) FROM Sketch WHERE DrawingID = ?Param0",
            "ROLLBACK",
        ]
    );
    assert!(!drawing.is_deleted());
}

#[test]
fn test_delete_dereferences_before_owner_rows() {
    let registry = shapes::drawing_registry(DeleteAction::Dereference);
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut drawing = saved_drawing(&registry);
    persister.delete(&mut drawing).unwrap();

    assert_eq!(
        executor.log(),
        [
            "BEGIN",
            "UPDATE Sketch SET DrawingID = ?Param0 WHERE DrawingID = ?Param1",
            "DELETE FROM Drawing WHERE DrawingID = ?Param0",
            "COMMIT",
        ]
    );
    assert!(drawing.is_deleted());
}

#[test]
fn test_delete_related_cascades_first() {
    let registry = shapes::drawing_registry(DeleteAction::DeleteRelated);
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut drawing = saved_drawing(&registry);
    let drawing_id = Value::from(drawing.object_id().unwrap());
    let sketch_id = Uuid::new_v4();
    executor.push_rows(vec![row(&[
        ("SketchID", Value::from(sketch_id)),
        ("DrawingID", drawing_id),
        ("Title", Value::from("Front")),
        ("Position", Value::BigInt(Some(1))),
    ])]);

    persister.delete(&mut drawing).unwrap();

    let log = executor.log();
    assert_eq!(log[0], "BEGIN");
    assert!(log[1].starts_with("SELECT Sketch.DrawingID"));
    assert_eq!(log[2], "DELETE FROM Sketch WHERE SketchID = ?Param0");
    assert_eq!(log[3], "DELETE FROM Drawing WHERE DrawingID = ?Param0");
    assert_eq!(log[4], "COMMIT");
    assert_eq!(executor.statements()[1].params(), [Value::from(sketch_id)]);
}

#[test]
fn test_deleting_new_object_runs_nothing() {
    let registry = shapes::drawing_registry(DeleteAction::Prevent);
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut drawing = BusinessObject::new(registry.require("Drawing").unwrap());
    persister.delete(&mut drawing).unwrap();
    assert!(drawing.is_deleted());
    assert!(executor.log().is_empty());
    assert!(matches!(
        persister.delete(&mut drawing),
        Err(PersistError::AlreadyDeleted(_))
    ));
}

// ============================================================================
// Load
// ============================================================================

#[test]
fn test_load_builds_clean_objects_from_rows() {
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    let id = Uuid::new_v4();
    executor.push_rows(vec![row(&[
        ("CircleID", Value::from(id)),
        ("ShapeID", Value::from(id)),
        ("Radius", Value::Int(Some(7))),
        ("ShapeName", Value::from("Loaded")),
    ])]);
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let class = class_table::circle();
    let loaded = persister
        .load_one(&class, &Criteria::eq("CircleID", id))
        .unwrap()
        .unwrap();

    assert_eq!(loaded.object_id(), Some(id));
    assert!(!loaded.is_new());
    assert!(!loaded.is_dirty());
    assert_eq!(loaded.value("Radius").unwrap(), Value::BigInt(Some(7)));
    assert_eq!(
        executor.sql(),
        ["SELECT Circle.CircleID, Circle.Radius, Shape.ShapeID, Shape.ShapeName FROM Circle, Shape \
          WHERE Shape.ShapeID = Circle.ShapeID AND CircleID = ?Param0"]
    );
}

#[test]
fn test_load_related_caches_kept_reference() {
    let registry = shapes::drawing_registry(DeleteAction::DoNothing);
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::default(), &registry, &executor);

    let mut drawing = saved_drawing(&registry);
    let drawing_id = Value::from(drawing.object_id().unwrap());
    executor.push_rows(vec![
        row(&[
            ("SketchID", Value::from(Uuid::new_v4())),
            ("DrawingID", drawing_id.clone()),
            ("Title", Value::from("Front")),
            ("Position", Value::BigInt(Some(1))),
        ]),
        row(&[
            ("SketchID", Value::from(Uuid::new_v4())),
            ("DrawingID", drawing_id),
            ("Title", Value::from("Side")),
            ("Position", Value::BigInt(Some(2))),
        ]),
    ]);

    let sketches = persister.load_related(&mut drawing, "Sketches").unwrap();
    assert_eq!(sketches.len(), 2);
    assert_eq!(drawing.related("Sketches").map(<[_]>::len), Some(2));
    assert!(executor.sql()[0].ends_with("ORDER BY Sketch.Position ASC"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_mapper_from_config_uses_dollar_placeholders() {
    let config = MappingConfig::from_toml_str("[mapping]\nparam_style = \"dollar\"\n").unwrap();
    let registry = ClassDefRegistry::new();
    let executor = RecordingExecutor::new();
    let persister = Persister::new(SqlMapper::from_config(&config), &registry, &executor);

    let mut circle = BusinessObject::new(class_table::circle());
    persister.save(&mut circle).unwrap();
    assert_eq!(
        executor.sql(),
        [
            "INSERT INTO Shape (ShapeID, ShapeName) VALUES ($1, $2)",
            "INSERT INTO Circle (CircleID, Radius, ShapeID) VALUES ($1, $2, $3)",
        ]
    );
}
