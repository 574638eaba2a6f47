//! Statement generation for class-table inheritance
//!
//! Hierarchy: FilledCircle -> Circle -> Shape, one table per class, every level keyed
//! by the shared object ID.

use sea_query::Value;
use tablemap::test_helpers::shapes::class_table;
use tablemap::{
    BusinessObject, ClassDef, Criteria, DefinitionError, NoRelatedObjects, PrimaryKeyDef, PropDef,
    PropType, SqlMapper, SuperClassDef,
};

// ============================================================================
// INSERT
// ============================================================================

#[test]
fn test_insert_two_levels_root_first_with_shared_id() {
    let mut circle = BusinessObject::new(class_table::circle());
    circle.set_value("ShapeName", "MyShape").unwrap();
    circle.set_value("Radius", 10i64).unwrap();

    let inserts = SqlMapper::default().build_insert(&circle).unwrap();
    assert_eq!(
        inserts.sql(),
        [
            "INSERT INTO Shape (ShapeID, ShapeName) VALUES (?Param0, ?Param1)",
            "INSERT INTO Circle (CircleID, Radius, ShapeID) VALUES (?Param0, ?Param1, ?Param2)",
        ]
    );

    let id = Value::from(circle.object_id().unwrap());
    let shape_params = inserts.get(0).unwrap().params();
    let circle_params = inserts.get(1).unwrap().params();
    assert_eq!(shape_params, [id.clone(), Value::from("MyShape")]);
    assert_eq!(circle_params, [id.clone(), Value::BigInt(Some(10)), id]);
}

#[test]
fn test_insert_three_levels_produces_one_statement_per_table() {
    let filled = BusinessObject::new(class_table::filled_circle());
    let inserts = SqlMapper::default().build_insert(&filled).unwrap();
    let tables: Vec<&str> = inserts
        .iter()
        .map(|s| s.sql().split_whitespace().nth(2).unwrap())
        .collect();
    assert_eq!(tables, ["Shape", "Circle", "FilledCircle"]);
    assert_eq!(
        inserts.get(2).unwrap().sql(),
        "INSERT INTO FilledCircle (CircleID, Colour, FilledCircleID) VALUES (?Param0, ?Param1, ?Param2)"
    );
}

#[test]
fn test_generation_is_order_stable() {
    let mut filled = BusinessObject::new(class_table::filled_circle());
    filled.set_value("Colour", "Red").unwrap();
    let mapper = SqlMapper::default();
    assert_eq!(
        mapper.build_insert(&filled).unwrap(),
        mapper.build_insert(&filled).unwrap()
    );
    let def = class_table::filled_circle();
    assert_eq!(
        mapper.build_select(&def, None).unwrap(),
        mapper.build_select(&def, None).unwrap()
    );
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn test_partial_update_touches_only_dirty_level() {
    let mut circle = BusinessObject::new(class_table::circle());
    circle.set_value("ShapeName", "MyShape").unwrap();
    circle.set_value("Radius", 10i64).unwrap();
    circle.mark_persisted();

    let mapper = SqlMapper::default();
    assert!(mapper.build_update(&circle).unwrap().is_empty());

    circle.set_value("Radius", 20i64).unwrap();
    let updates = mapper.build_update(&circle).unwrap();
    assert_eq!(updates.len(), 1);
    assert!(updates.get(0).unwrap().sql().starts_with("UPDATE Circle SET"));
}

#[test]
fn test_setting_value_back_clears_update() {
    let mut circle = BusinessObject::new(class_table::circle());
    circle.set_value("Radius", 10i64).unwrap();
    circle.mark_persisted();
    circle.set_value("Radius", 11i64).unwrap();
    circle.set_value("Radius", 10i64).unwrap();
    assert!(SqlMapper::default().build_update(&circle).unwrap().is_empty());
}

// ============================================================================
// DELETE
// ============================================================================

#[test]
fn test_delete_three_levels_leaf_first() {
    let mut filled = BusinessObject::new(class_table::filled_circle());
    filled.mark_persisted();
    let deletes = SqlMapper::default()
        .build_delete(&filled, &NoRelatedObjects)
        .unwrap();
    assert_eq!(
        deletes.sql(),
        [
            "DELETE FROM FilledCircle WHERE FilledCircleID = ?Param0",
            "DELETE FROM Circle WHERE CircleID = ?Param0",
            "DELETE FROM Shape WHERE ShapeID = ?Param0",
        ]
    );
}

// ============================================================================
// SELECT
// ============================================================================

#[test]
fn test_select_three_levels_by_object_id() {
    let def = class_table::filled_circle();
    let filled = BusinessObject::new(def.clone());
    let criteria = Criteria::for_primary_key(&filled).unwrap();
    let select = SqlMapper::default().build_select(&def, Some(&criteria)).unwrap();
    assert_eq!(
        select.sql(),
        "SELECT Circle.CircleID, FilledCircle.Colour, FilledCircle.FilledCircleID, Circle.Radius, \
         Shape.ShapeID, Shape.ShapeName FROM FilledCircle, Circle, Shape \
         WHERE Circle.CircleID = FilledCircle.CircleID AND Shape.ShapeID = Circle.ShapeID \
         AND FilledCircleID = ?Param0"
    );
    assert_eq!(select.params(), [Value::from(filled.object_id().unwrap())]);
}

#[test]
fn test_select_joins_n_minus_one_levels() {
    let def = class_table::filled_circle();
    let select = SqlMapper::default().build_select(&def, None).unwrap();
    let where_clause = select.sql().split(" WHERE ").nth(1).unwrap();
    assert_eq!(where_clause.split(" AND ").count(), 2);
}

// ============================================================================
// DEFINITION CHECKS
// ============================================================================

#[test]
fn test_subclass_redeclaring_inherited_property_is_rejected() {
    let circle = ClassDef::builder("Circle", "Circle")
        .property(PropDef::new("CircleID", PropType::Guid))
        .property(PropDef::new("ShapeName", PropType::String))
        .primary_key(PrimaryKeyDef::object_id("CircleID"))
        .super_class(SuperClassDef::class_table(class_table::shape()))
        .build();
    assert_eq!(
        circle.unwrap_err(),
        DefinitionError::DuplicateProperty {
            class: "Circle".to_string(),
            property: "ShapeName".to_string(),
        }
    );
}
