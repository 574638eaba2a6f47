//! The statement builder and its relationship probe seam.
//!
//! `SqlMapper` is pure: it reads a class definition and an instance and returns
//! statements. The per-operation builders live in the sibling `insert`, `update`,
//! `delete`, `select` and `related` modules as further `impl SqlMapper` blocks.

use super::formatter::SqlFormatter;
use crate::config::MappingConfig;
use crate::definition::relationship::RelationshipDef;
use crate::error::MapError;
use crate::object::BusinessObject;

/// Builds parameterized statements for business objects
#[derive(Debug, Clone, Default)]
pub struct SqlMapper {
    pub(crate) formatter: SqlFormatter,
}

impl SqlMapper {
    pub fn new(formatter: SqlFormatter) -> Self {
        Self { formatter }
    }

    pub fn from_config(config: &MappingConfig) -> Self {
        Self::new(config.formatter())
    }

    pub fn formatter(&self) -> &SqlFormatter {
        &self.formatter
    }
}

/// Answers whether an owner still has related rows for a relationship
///
/// Consulted for `Prevent` relationships before a delete is built. The mapper never
/// performs this I/O itself.
pub trait RelationshipProbe {
    fn has_related(&self, owner: &BusinessObject, relationship: &RelationshipDef) -> Result<bool, MapError>;
}

impl<F> RelationshipProbe for F
where
    F: Fn(&BusinessObject, &RelationshipDef) -> bool,
{
    fn has_related(&self, owner: &BusinessObject, relationship: &RelationshipDef) -> Result<bool, MapError> {
        Ok(self(owner, relationship))
    }
}

/// Probe for callers that have already cleared every relationship
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelatedObjects;

impl RelationshipProbe for NoRelatedObjects {
    fn has_related(&self, _owner: &BusinessObject, _relationship: &RelationshipDef) -> Result<bool, MapError> {
        Ok(false)
    }
}
