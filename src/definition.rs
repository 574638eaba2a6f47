//! Class definition model.
//!
//! Immutable descriptors of a class's storage shape: properties, primary and
//! alternate keys, relationships, and the superclass link that places a class in an
//! inheritance chain. A loader builds these once; the mapping engine only reads them.

pub mod class;
pub mod inheritance;
pub mod key;
pub mod prop;
pub mod registry;
pub mod relationship;
pub mod rule;

pub use class::{ClassDef, ClassDefBuilder};
pub use inheritance::{InheritanceStrategy, SuperClassDef};
pub use key::{KeyDef, PrimaryKeyDef};
pub use prop::{DefaultValue, PropDef, PropType, ReadWriteRule};
pub use registry::ClassDefRegistry;
pub use relationship::{Cardinality, DeleteAction, OrderBy, RelKeyPair, RelationshipDef, SortDirection};
pub use rule::PropRule;
