//! Search conditions and ordering for generated SELECT statements.
//!
//! Criteria name properties, not columns. They are resolved against the storage
//! chain of the class being selected: a column is qualified with its table only
//! when the same column name occurs in more than one table of the chain.

use super::chain::TableLevel;
use super::formatter::SqlFormatter;
use super::statement::SqlStatement;
use crate::definition::class::ClassDef;
use crate::definition::prop::{is_null, PropDef};
use crate::definition::relationship::{OrderBy, SortDirection};
use crate::error::{DefinitionError, MapError};
use crate::object::BusinessObject;
use sea_query::Value;
use std::collections::HashMap;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "LIKE",
        }
    }
}

/// A search condition over the properties of a class
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Compare { field: String, op: Op, value: Value },
    IsNull(String),
    IsNotNull(String),
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
    Not(Box<Criteria>),
}

impl Criteria {
    pub fn compare(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Criteria::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Op::Eq, value)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Criteria::IsNull(field.into())
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Criteria::IsNotNull(field.into())
    }

    /// Conjunction of `parts`; a single part is returned as is
    pub fn all(mut parts: Vec<Criteria>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Criteria::And(parts)
        }
    }

    pub fn and(self, other: Criteria) -> Self {
        match self {
            Criteria::And(mut parts) => {
                parts.push(other);
                Criteria::And(parts)
            }
            first => Criteria::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Criteria) -> Self {
        match self {
            Criteria::Or(mut parts) => {
                parts.push(other);
                Criteria::Or(parts)
            }
            first => Criteria::Or(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Criteria::Not(Box::new(self))
    }

    /// Match the stored row of `object` by the persisted values of its primary key
    ///
    /// # Errors
    ///
    /// `MapError::MissingKeyValue` if a key property has no persisted value.
    pub fn for_primary_key(object: &BusinessObject) -> Result<Criteria, MapError> {
        Self::for_key_of(object, object.class_def())
    }

    /// Like [`for_primary_key`](Self::for_primary_key), using the primary key of
    /// `class`, which must be `object`'s class or one of its ancestors
    pub(crate) fn for_key_of(object: &BusinessObject, class: &ClassDef) -> Result<Criteria, MapError> {
        let key = class.primary_key();
        let mut parts = Vec::with_capacity(key.properties().len());
        for name in key.properties() {
            let value = object.persisted_value(name)?;
            if is_null(&value) {
                return Err(MapError::MissingKeyValue {
                    class: object.class_name().to_string(),
                    property: name.clone(),
                });
            }
            parts.push(Criteria::eq(name.as_str(), value));
        }
        Ok(Criteria::all(parts))
    }

    pub(crate) fn render(
        &self,
        columns: &ColumnResolver<'_>,
        statement: &mut SqlStatement,
    ) -> Result<(), MapError> {
        match self {
            Criteria::Compare { field, op, value } => {
                let column = columns.resolve(field)?;
                statement.push_str(&column);
                match op {
                    Op::Eq if is_null(value) => statement.push_str(" IS NULL"),
                    Op::Ne if is_null(value) => statement.push_str(" IS NOT NULL"),
                    _ => {
                        statement.push_str(" ");
                        statement.push_str(op.as_sql());
                        statement.push_str(" ");
                        statement.push_param(columns.formatter(), value.clone());
                    }
                }
            }
            Criteria::IsNull(field) => {
                statement.push_str(&columns.resolve(field)?);
                statement.push_str(" IS NULL");
            }
            Criteria::IsNotNull(field) => {
                statement.push_str(&columns.resolve(field)?);
                statement.push_str(" IS NOT NULL");
            }
            Criteria::And(parts) if parts.is_empty() => statement.push_str("1 = 1"),
            Criteria::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        statement.push_str(" AND ");
                    }
                    part.render(columns, statement)?;
                }
            }
            Criteria::Or(parts) if parts.is_empty() => statement.push_str("1 = 0"),
            Criteria::Or(parts) => {
                statement.push_str("(");
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        statement.push_str(" OR ");
                    }
                    part.render(columns, statement)?;
                }
                statement.push_str(")");
            }
            Criteria::Not(inner) => {
                statement.push_str("NOT (");
                inner.render(columns, statement)?;
                statement.push_str(")");
            }
        }
        Ok(())
    }
}

/// Ordering of a SELECT, by property
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCriteria {
    fields: Vec<OrderBy>,
}

impl OrderCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, property: impl Into<String>) -> Self {
        self.fields.push(OrderBy::asc(property));
        self
    }

    pub fn desc(mut self, property: impl Into<String>) -> Self {
        self.fields.push(OrderBy::desc(property));
        self
    }

    pub fn fields(&self) -> &[OrderBy] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn render(
        &self,
        columns: &ColumnResolver<'_>,
        statement: &mut SqlStatement,
    ) -> Result<(), MapError> {
        if self.fields.is_empty() {
            return Ok(());
        }
        statement.push_str(" ORDER BY ");
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                statement.push_str(", ");
            }
            statement.push_str(&columns.resolve_qualified(&field.property)?);
            statement.push_str(match field.direction {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            });
        }
        Ok(())
    }
}

impl From<&[OrderBy]> for OrderCriteria {
    fn from(fields: &[OrderBy]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }
}

/// Resolves property names to column references within one storage chain
pub(crate) struct ColumnResolver<'a> {
    class_name: &'a str,
    levels: &'a [TableLevel<'a>],
    formatter: &'a SqlFormatter,
    occurrences: HashMap<&'a str, usize>,
}

impl<'a> ColumnResolver<'a> {
    pub(crate) fn new(levels: &'a [TableLevel<'a>], formatter: &'a SqlFormatter) -> Self {
        let mut occurrences = HashMap::new();
        for level in levels {
            for prop in level.stored_properties() {
                *occurrences.entry(prop.column_name()).or_insert(0) += 1;
            }
        }
        Self {
            class_name: levels.first().map_or("", |l| l.class_def().class_name()),
            levels,
            formatter,
            occurrences,
        }
    }

    pub(crate) fn formatter(&self) -> &'a SqlFormatter {
        self.formatter
    }

    fn locate(&self, field: &str) -> Result<(&'a TableLevel<'a>, &'a PropDef), MapError> {
        let by_name = self.levels.iter().find_map(|level| {
            level
                .properties()
                .iter()
                .find(|p| p.name() == field)
                .map(|&p| (level, p))
        });
        let by_column = || {
            self.levels.iter().find_map(|level| {
                level
                    .properties()
                    .iter()
                    .find(|p| p.column_name() == field)
                    .map(|&p| (level, p))
            })
        };
        by_name.or_else(by_column).ok_or_else(|| {
            MapError::Definition(DefinitionError::UnknownProperty {
                class: self.class_name.to_string(),
                property: field.to_string(),
                context: "criteria".to_string(),
            })
        })
    }

    /// Column for `field`, qualified only when its name is shared between tables
    pub(crate) fn resolve(&self, field: &str) -> Result<String, MapError> {
        let (level, prop) = self.locate(field)?;
        let column = prop.column_name();
        if self.occurrences.get(column).copied().unwrap_or(0) > 1 {
            Ok(self.formatter.qualified(level.table(), column))
        } else {
            Ok(self.formatter.delimit(column))
        }
    }

    /// Column for `field`, always qualified with its table
    pub(crate) fn resolve_qualified(&self, field: &str) -> Result<String, MapError> {
        let (level, prop) = self.locate(field)?;
        Ok(self.formatter.qualified(level.table(), prop.column_name()))
    }
}
