//! # Tablemap
//!
//! Inheritance-aware object-relational mapping engine.
//!
//! Class definitions describe a class's properties, keys, relationships and its
//! place in an inheritance chain (class-table, concrete-table or single-table).
//! [`SqlMapper`] turns business objects of those classes into ordered,
//! parameterized INSERT, UPDATE, DELETE and SELECT statements; [`Persister`] runs
//! them through any [`StatementExecutor`].
//!
//! ```
//! use tablemap::{BusinessObject, ClassDef, PrimaryKeyDef, PropDef, PropType, SqlMapper, SuperClassDef};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let shape = ClassDef::builder("Shape", "Shape")
//!     .property(PropDef::new("ShapeID", PropType::Guid))
//!     .property(PropDef::new("ShapeName", PropType::String))
//!     .primary_key(PrimaryKeyDef::object_id("ShapeID"))
//!     .build_arc()?;
//! let circle = ClassDef::builder("Circle", "Circle")
//!     .property(PropDef::new("CircleID", PropType::Guid))
//!     .property(PropDef::new("Radius", PropType::Integer))
//!     .primary_key(PrimaryKeyDef::object_id("CircleID"))
//!     .super_class(SuperClassDef::class_table(shape))
//!     .build_arc()?;
//!
//! let mut object = BusinessObject::new(circle);
//! object.set_value("ShapeName", "MyShape")?;
//! object.set_value("Radius", 10i64)?;
//!
//! let inserts = SqlMapper::default().build_insert(&object)?;
//! assert_eq!(
//!     inserts.sql(),
//!     [
//!         "INSERT INTO Shape (ShapeID, ShapeName) VALUES (?Param0, ?Param1)",
//!         "INSERT INTO Circle (CircleID, Radius, ShapeID) VALUES (?Param0, ?Param1, ?Param2)",
//!     ]
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod executor;
pub mod mapping;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod object;
pub mod persist;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::MappingConfig;
pub use definition::{
    Cardinality, ClassDef, ClassDefBuilder, ClassDefRegistry, DefaultValue, DeleteAction,
    InheritanceStrategy, KeyDef, OrderBy, PrimaryKeyDef, PropDef, PropRule, PropType,
    ReadWriteRule, RelKeyPair, RelationshipDef, SortDirection, SuperClassDef,
};
pub use error::{DefinitionError, MapError, ObjectError};
pub use executor::{ExecError, Row, StatementExecutor};
pub use mapping::{
    Criteria, NoRelatedObjects, Op, OrderCriteria, ParamStyle, RelationshipProbe, SqlFormatter,
    SqlMapper, SqlStatement, SqlStatementCollection,
};
pub use object::BusinessObject;
pub use persist::{PersistError, Persister};
