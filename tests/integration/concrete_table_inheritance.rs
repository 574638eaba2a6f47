//! Statement generation for concrete-table inheritance
//!
//! Circle stores a full flattened row (inherited Shape columns included) in its own
//! table.

use sea_query::Value;
use tablemap::mapping::effective_properties;
use tablemap::test_helpers::shapes::concrete_table;
use tablemap::{BusinessObject, Criteria, NoRelatedObjects, SqlMapper};

#[test]
fn test_insert_column_list_is_full_effective_set() {
    let mut circle = BusinessObject::new(concrete_table::circle());
    circle.set_value("ShapeName", "MyShape").unwrap();
    circle.set_value("Radius", 10i64).unwrap();

    let inserts = SqlMapper::default().build_insert(&circle).unwrap();
    assert_eq!(
        inserts.sql(),
        ["INSERT INTO Circle (CircleID, Radius, ShapeID, ShapeName) VALUES (?Param0, ?Param1, ?Param2, ?Param3)"]
    );

    let mut names: Vec<&str> = effective_properties(circle.class_def())
        .iter()
        .map(|p| p.name())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["CircleID", "Radius", "ShapeID", "ShapeName"]);

    let id = Value::from(circle.object_id().unwrap());
    let params = inserts.get(0).unwrap().params();
    assert_eq!(params[0], id);
    assert_eq!(params[2], id);
}

#[test]
fn test_update_and_delete_reference_own_table() {
    let mut circle = BusinessObject::new(concrete_table::circle());
    circle.mark_persisted();
    circle.set_value("ShapeName", "Inherited column").unwrap();

    let mapper = SqlMapper::default();
    assert_eq!(
        mapper.build_update(&circle).unwrap().sql(),
        ["UPDATE Circle SET CircleID = ?Param0, Radius = ?Param1, ShapeID = ?Param2, ShapeName = ?Param3 WHERE CircleID = ?Param4"]
    );
    assert_eq!(
        mapper.build_delete(&circle, &NoRelatedObjects).unwrap().sql(),
        ["DELETE FROM Circle WHERE CircleID = ?Param0"]
    );
}

#[test]
fn test_select_single_table_no_joins() {
    let def = concrete_table::circle();
    let criteria = Criteria::eq("ShapeName", "MyShape");
    let select = SqlMapper::default().build_select(&def, Some(&criteria)).unwrap();
    assert_eq!(
        select.sql(),
        "SELECT Circle.CircleID, Circle.Radius, Circle.ShapeID, Circle.ShapeName FROM Circle WHERE ShapeName = ?Param0"
    );
}
