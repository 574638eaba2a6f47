//! Error types for class definitions, instances and statement generation.
//!
//! Errors are grouped by the layer that detects them:
//!
//! - [`DefinitionError`] - a class definition graph is inconsistent. Raised while the
//!   graph is built, never while SQL is generated.
//! - [`ObjectError`] - an instance was asked to hold a value it cannot hold.
//! - [`MapError`] - statement generation refused to proceed (for example a delete
//!   blocked by a `Prevent` relationship).

use std::fmt;

/// Configuration errors raised while a class definition graph is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// A key, relationship, discriminator or primary key names a property that is not
    /// part of the class's effective property set
    UnknownProperty {
        class: String,
        property: String,
        context: String,
    },
    /// A class that needs its own key (root, class-table or concrete-table level) has none
    MissingPrimaryKey(String),
    /// The same property name is declared twice along one inheritance chain
    DuplicateProperty { class: String, property: String },
    /// Two properties of one chain are mapped onto the same column name
    DuplicateColumn {
        class: String,
        column: String,
        properties: (String, String),
    },
    /// A single-table discriminator column is also a mapped property column
    DiscriminatorCollision { class: String, column: String },
    /// A class with the same name is already registered
    DuplicateClass(String),
    /// A class name could not be resolved in the registry
    UnknownClass(String),
    /// A single-table link sits below a link of another strategy
    MixedInheritance {
        class: String,
        ancestor: String,
        strategy: String,
    },
    /// An object-ID primary key is not a single unique-identifier property
    InvalidObjectId { class: String, reason: String },
    /// A default value cannot be parsed or coerced into the property's value kind
    InvalidDefault { property: String, reason: String },
    /// A validation rule does not fit the property's value kind
    InvalidRule { property: String, reason: String },
    /// A relationship definition is malformed
    InvalidRelationship {
        class: String,
        relationship: String,
        reason: String,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::UnknownProperty {
                class,
                property,
                context,
            } => write!(
                f,
                "Class '{class}' references unknown property '{property}' in {context}"
            ),
            DefinitionError::MissingPrimaryKey(class) => {
                write!(f, "Class '{class}' has no primary key definition")
            }
            DefinitionError::DuplicateProperty { class, property } => write!(
                f,
                "Property '{property}' is declared more than once in the inheritance chain of '{class}'"
            ),
            DefinitionError::DuplicateColumn {
                class,
                column,
                properties: (first, second),
            } => write!(
                f,
                "Properties '{first}' and '{second}' of class '{class}' both map to column '{column}'"
            ),
            DefinitionError::DiscriminatorCollision { class, column } => write!(
                f,
                "Discriminator column '{column}' of class '{class}' is already mapped to a property"
            ),
            DefinitionError::DuplicateClass(class) => {
                write!(f, "Class '{class}' is already registered")
            }
            DefinitionError::UnknownClass(class) => {
                write!(f, "Class '{class}' is not registered")
            }
            DefinitionError::MixedInheritance {
                class,
                ancestor,
                strategy,
            } => write!(
                f,
                "Class '{class}' uses single-table inheritance but ancestor '{ancestor}' \
                 is mapped with {strategy}; single-table inheritance must extend to the root"
            ),
            DefinitionError::InvalidObjectId { class, reason } => {
                write!(f, "Invalid object ID key on class '{class}': {reason}")
            }
            DefinitionError::InvalidDefault { property, reason } => {
                write!(f, "Invalid default value for property '{property}': {reason}")
            }
            DefinitionError::InvalidRule { property, reason } => {
                write!(f, "Invalid rule for property '{property}': {reason}")
            }
            DefinitionError::InvalidRelationship {
                class,
                relationship,
                reason,
            } => write!(
                f,
                "Invalid relationship '{relationship}' on class '{class}': {reason}"
            ),
        }
    }
}

impl std::error::Error for DefinitionError {}

/// Errors raised by a business object when reading or writing property values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The class has no property with this name
    UnknownProperty { class: String, property: String },
    /// The value kind does not match the property's declared kind
    InvalidValueType {
        property: String,
        expected: String,
        actual: String,
    },
    /// The property's read-write rule forbids this write
    ReadOnly { property: String, rule: String },
    /// One or more compulsory or rule checks failed
    Invalid(Vec<String>),
    /// A row handed to the object is missing a mapped column
    MissingColumn { class: String, column: String },
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectError::UnknownProperty { class, property } => {
                write!(f, "Class '{class}' has no property '{property}'")
            }
            ObjectError::InvalidValueType {
                property,
                expected,
                actual,
            } => write!(
                f,
                "Invalid value type for property {property}: expected {expected}, got {actual}"
            ),
            ObjectError::ReadOnly { property, rule } => {
                write!(f, "Property '{property}' cannot be written ({rule})")
            }
            ObjectError::Invalid(messages) => {
                write!(f, "Object is not valid: {}", messages.join("; "))
            }
            ObjectError::MissingColumn { class, column } => {
                write!(f, "Row for class '{class}' has no column '{column}'")
            }
        }
    }
}

impl std::error::Error for ObjectError {}

/// Errors raised by the SQL mapping engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The definition graph is inconsistent
    Definition(DefinitionError),
    /// Reading a value off the instance failed
    Object(ObjectError),
    /// A `Prevent` relationship still has related objects
    DeletePrevented { class: String, relationship: String },
    /// The class has no relationship with this name
    UnknownRelationship { class: String, relationship: String },
    /// A key property needed for the statement has no value
    MissingKeyValue { class: String, property: String },
    /// The relationship probe could not answer
    Probe(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Definition(e) => write!(f, "Definition error: {e}"),
            MapError::Object(e) => write!(f, "Object error: {e}"),
            MapError::DeletePrevented {
                class,
                relationship,
            } => write!(
                f,
                "Cannot delete '{class}': relationship '{relationship}' still has related objects"
            ),
            MapError::UnknownRelationship {
                class,
                relationship,
            } => write!(f, "Class '{class}' has no relationship '{relationship}'"),
            MapError::MissingKeyValue { class, property } => {
                write!(f, "Key property '{property}' of '{class}' has no value")
            }
            MapError::Probe(msg) => write!(f, "Relationship probe failed: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<DefinitionError> for MapError {
    fn from(error: DefinitionError) -> Self {
        MapError::Definition(error)
    }
}

impl From<ObjectError> for MapError {
    fn from(error: ObjectError) -> Self {
        MapError::Object(error)
    }
}
