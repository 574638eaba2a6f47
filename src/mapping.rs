//! Inheritance-aware SQL generation.
//!
//! [`SqlMapper`] turns a [`BusinessObject`](crate::object::BusinessObject) into ordered,
//! parameterized statements:
//!
//! | operation | class-table inheritance        | single / concrete table |
//! |-----------|--------------------------------|-------------------------|
//! | INSERT    | one per table, root first      | one                     |
//! | UPDATE    | one per dirty table, root first| one if anything dirty   |
//! | DELETE    | one per table, leaf first      | one                     |
//! | SELECT    | one, joining every table       | one                     |
//!
//! Column lists are always sorted by property name.

pub mod chain;
pub mod criteria;
mod delete;
pub mod formatter;
mod insert;
pub mod mapper;
mod related;
mod select;
pub mod statement;
mod update;

pub use chain::{effective_properties, storage_chain, TableLevel};
pub use criteria::{Criteria, Op, OrderCriteria};
pub use formatter::{ParamStyle, SqlFormatter};
pub use mapper::{NoRelatedObjects, RelationshipProbe, SqlMapper};
pub use statement::{SqlStatement, SqlStatementCollection};
