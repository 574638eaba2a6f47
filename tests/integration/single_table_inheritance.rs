//! Statement generation for single-table inheritance
//!
//! Circle rows live in the Shape table under Shape's key; Circle's own key column
//! does not exist in storage.

use sea_query::Value;
use tablemap::test_helpers::shapes::{class_table, single_table};
use tablemap::{
    BusinessObject, ClassDef, Criteria, DefinitionError, NoRelatedObjects, PrimaryKeyDef, PropDef,
    PropType, SqlMapper, SuperClassDef,
};

#[test]
fn test_insert_uses_root_table_without_subclass_key() {
    let mut circle = BusinessObject::new(single_table::circle());
    circle.set_value("ShapeName", "MyShape").unwrap();
    circle.set_value("Radius", 10i64).unwrap();

    let inserts = SqlMapper::default().build_insert(&circle).unwrap();
    assert_eq!(
        inserts.sql(),
        ["INSERT INTO Shape (Radius, ShapeID, ShapeName) VALUES (?Param0, ?Param1, ?Param2)"]
    );
    assert_eq!(
        inserts.get(0).unwrap().params(),
        [
            Value::BigInt(Some(10)),
            Value::from(circle.object_id().unwrap()),
            Value::from("MyShape"),
        ]
    );
    assert!(matches!(
        circle.value("CircleID"),
        Err(tablemap::ObjectError::UnknownProperty { .. })
    ));
}

#[test]
fn test_every_operation_references_only_root_table() {
    let mut circle = BusinessObject::new(single_table::circle_with_discriminator());
    let mapper = SqlMapper::default();
    let insert = mapper.build_insert(&circle).unwrap();
    circle.mark_persisted();
    circle.set_value("ShapeName", "Renamed").unwrap();
    let update = mapper.build_update(&circle).unwrap();
    let delete = mapper.build_delete(&circle, &NoRelatedObjects).unwrap();
    let select = mapper.build_select(circle.class_def(), None).unwrap();

    for sql in insert.sql().into_iter().chain(update.sql()).chain(delete.sql()) {
        assert!(sql.contains(" Shape "), "{sql}");
        assert!(!sql.contains("Circle"), "{sql}");
    }
    assert_eq!(update.len(), 1);
    assert_eq!(
        select.sql(),
        "SELECT Shape.Radius, Shape.ShapeID, Shape.ShapeName FROM Shape WHERE Shape.ShapeType = ?Param0"
    );
}

#[test]
fn test_select_discriminator_precedes_criteria() {
    let def = single_table::circle_with_discriminator();
    let criteria = Criteria::eq("Radius", 5i64);
    let select = SqlMapper::default().build_select(&def, Some(&criteria)).unwrap();
    assert!(select
        .sql()
        .ends_with("WHERE Shape.ShapeType = ?Param0 AND Radius = ?Param1"));
    assert_eq!(select.params(), [Value::from("Circle"), Value::BigInt(Some(5))]);
}

#[test]
fn test_single_table_below_class_table_is_rejected() {
    let sphere = ClassDef::builder("Sphere", "Sphere")
        .property(PropDef::new("SphereID", PropType::Guid))
        .property(PropDef::new("Volume", PropType::Double))
        .primary_key(PrimaryKeyDef::object_id("SphereID"))
        .super_class(SuperClassDef::single_table(class_table::circle(), None))
        .build();
    assert!(matches!(
        sphere,
        Err(DefinitionError::MixedInheritance { .. })
    ));
}
