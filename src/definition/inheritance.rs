//! Superclass links and the table-inheritance strategies they carry.

use crate::definition::class::ClassDef;
use std::fmt;
use std::sync::Arc;

/// How a subclass is stored relative to its superclass
///
/// Each variant carries only the data its strategy needs, so a discriminator can
/// only ever be attached to single-table inheritance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InheritanceStrategy {
    /// One table per class level, joined on the shared identity
    ClassTable,
    /// The subclass table holds a flattened row of inherited and own columns
    ConcreteTable,
    /// The subclass shares its superclass's table
    SingleTable {
        /// Column tagging each row with its concrete class name
        discriminator: Option<String>,
    },
}

impl InheritanceStrategy {
    pub fn is_single_table(&self) -> bool {
        matches!(self, InheritanceStrategy::SingleTable { .. })
    }

    pub fn is_class_table(&self) -> bool {
        matches!(self, InheritanceStrategy::ClassTable)
    }

    pub fn is_concrete_table(&self) -> bool {
        matches!(self, InheritanceStrategy::ConcreteTable)
    }
}

impl fmt::Display for InheritanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InheritanceStrategy::ClassTable => f.write_str("class-table inheritance"),
            InheritanceStrategy::ConcreteTable => f.write_str("concrete-table inheritance"),
            InheritanceStrategy::SingleTable { .. } => f.write_str("single-table inheritance"),
        }
    }
}

/// Link from a class to its superclass
#[derive(Debug, Clone)]
pub struct SuperClassDef {
    parent: Arc<ClassDef>,
    strategy: InheritanceStrategy,
}

impl SuperClassDef {
    pub fn new(parent: Arc<ClassDef>, strategy: InheritanceStrategy) -> Self {
        Self { parent, strategy }
    }

    pub fn class_table(parent: Arc<ClassDef>) -> Self {
        Self::new(parent, InheritanceStrategy::ClassTable)
    }

    pub fn concrete_table(parent: Arc<ClassDef>) -> Self {
        Self::new(parent, InheritanceStrategy::ConcreteTable)
    }

    pub fn single_table(parent: Arc<ClassDef>, discriminator: Option<&str>) -> Self {
        Self::new(
            parent,
            InheritanceStrategy::SingleTable {
                discriminator: discriminator.map(str::to_string),
            },
        )
    }

    pub fn parent(&self) -> &ClassDef {
        &self.parent
    }

    pub fn parent_arc(&self) -> &Arc<ClassDef> {
        &self.parent
    }

    pub fn strategy(&self) -> &InheritanceStrategy {
        &self.strategy
    }

    /// Discriminator column, if this is a single-table link that declares one
    pub fn discriminator(&self) -> Option<&str> {
        match &self.strategy {
            InheritanceStrategy::SingleTable { discriminator } => discriminator.as_deref(),
            _ => None,
        }
    }
}
