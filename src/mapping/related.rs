//! Statements that follow relationships and alternate keys.

use super::chain::storage_chain;
use super::criteria::{Criteria, OrderCriteria};
use super::mapper::SqlMapper;
use super::select::Projection;
use super::statement::{SqlStatement, SqlStatementCollection};
use crate::definition::class::ClassDef;
use crate::definition::key::KeyDef;
use crate::definition::prop::is_null;
use crate::definition::registry::ClassDefRegistry;
use crate::definition::relationship::RelationshipDef;
use crate::error::MapError;
use crate::object::BusinessObject;
use sea_query::Value;

impl SqlMapper {
    /// SELECT of the objects related to `owner` through `relationship`
    ///
    /// `None` when a join value on the owner is null, since nothing can be related.
    pub fn build_related_select(
        &self,
        owner: &BusinessObject,
        relationship: &str,
        registry: &ClassDefRegistry,
    ) -> Result<Option<SqlStatement>, MapError> {
        let rel = find_relationship(owner, relationship)?;
        let related = registry.require(rel.related_class())?;
        let Some(criteria) = join_criteria(owner, rel)? else {
            return Ok(None);
        };
        let order = OrderCriteria::from(rel.order());
        self.select_from(&related, Projection::Columns, Some(&criteria), &order)
            .map(Some)
    }

    /// `SELECT COUNT(*)` of the objects related to `owner` through `relationship`
    pub fn build_related_count(
        &self,
        owner: &BusinessObject,
        relationship: &str,
        registry: &ClassDefRegistry,
    ) -> Result<Option<SqlStatement>, MapError> {
        let rel = find_relationship(owner, relationship)?;
        let related = registry.require(rel.related_class())?;
        let Some(criteria) = join_criteria(owner, rel)? else {
            return Ok(None);
        };
        self.select_from(&related, Projection::Count, Some(&criteria), &OrderCriteria::new())
            .map(Some)
    }

    /// UPDATE statements that null the related side of the join key
    ///
    /// One statement per table of the related class that owns a related key column,
    /// `SET col = NULL` bound as a parameter, matching the owner's current value.
    pub fn build_dereference(
        &self,
        owner: &BusinessObject,
        relationship: &str,
        registry: &ClassDefRegistry,
    ) -> Result<SqlStatementCollection, MapError> {
        let rel = find_relationship(owner, relationship)?;
        let related = registry.require(rel.related_class())?;
        let chain = storage_chain(&related);
        let mut statements = SqlStatementCollection::new();

        for level in chain.iter().rev() {
            let mut pairs = Vec::new();
            for pair in rel.key() {
                let Some(prop) = level
                    .properties()
                    .iter()
                    .find(|p| p.name() == pair.related_property)
                else {
                    continue;
                };
                let value = owner.value(&pair.owner_property)?;
                if is_null(&value) {
                    continue;
                }
                pairs.push((prop.prop_type().null_value(), prop.column_name(), value));
            }
            if pairs.is_empty() {
                continue;
            }

            let mut statement = SqlStatement::new();
            statement.push_str("UPDATE ");
            statement.push_str(&self.formatter.delimit(level.table()));
            statement.push_str(" SET ");
            for (i, (null, column, _)) in pairs.iter().enumerate() {
                if i > 0 {
                    statement.push_str(", ");
                }
                statement.push_str(&self.formatter.delimit(column));
                statement.push_str(" = ");
                statement.push_param(&self.formatter, null.clone());
            }
            statement.push_str(" WHERE ");
            for (i, (_, column, value)) in pairs.into_iter().enumerate() {
                if i > 0 {
                    statement.push_str(" AND ");
                }
                statement.push_str(&self.formatter.delimit(column));
                statement.push_str(" = ");
                statement.push_param(&self.formatter, value);
            }
            statements.push(statement);
        }

        log::debug!(
            "Built {} dereference statement(s) for '{}.{}'",
            statements.len(),
            owner.class_name(),
            relationship
        );
        Ok(statements)
    }

    /// `SELECT COUNT(*)` of other rows holding the same alternate key values as `object`
    ///
    /// A key declared on an ancestor is counted over that ancestor's rows, so instances
    /// of the ancestor and of sibling subclasses are included. The count never reaches
    /// above a concrete-table link, whose ancestors keep their rows in other tables.
    ///
    /// `None` when the key ignores nulls and one of its members is null. A persisted
    /// object excludes its own row by primary key.
    pub fn build_duplicate_check(
        &self,
        object: &BusinessObject,
        key: &KeyDef,
    ) -> Result<Option<SqlStatement>, MapError> {
        let mut parts = Vec::with_capacity(key.properties().len());
        for name in key.properties() {
            let value = object.value(name)?;
            if key.ignores_nulls() && is_null(&value) {
                return Ok(None);
            }
            parts.push(Criteria::eq(name.as_str(), value));
        }
        let target = key_scope(object.class_def(), key);
        if !object.is_new() {
            parts.push(Criteria::for_key_of(object, target)?.not());
        }
        let criteria = Criteria::all(parts);
        self.select_from(
            target,
            Projection::Count,
            Some(&criteria),
            &OrderCriteria::new(),
        )
        .map(Some)
    }
}

/// Class whose rows an alternate key is unique across
///
/// Walks up from `class` to the class declaring `key`, stopping below a concrete-table
/// link. A key not declared anywhere in the lineage is scoped to `class` itself.
fn key_scope<'a>(class: &'a ClassDef, key: &KeyDef) -> &'a ClassDef {
    let mut scope = class;
    let mut flattened = false;
    for current in class.lineage() {
        if !flattened {
            scope = current;
        }
        if current.keys().iter().any(|k| std::ptr::eq(k, key)) {
            return scope;
        }
        if current.strategy().is_some_and(|s| s.is_concrete_table()) {
            flattened = true;
        }
    }
    class
}

fn find_relationship<'a>(owner: &'a BusinessObject, name: &str) -> Result<&'a RelationshipDef, MapError> {
    owner
        .class_def()
        .find_relationship(name)
        .ok_or_else(|| MapError::UnknownRelationship {
            class: owner.class_name().to_string(),
            relationship: name.to_string(),
        })
}

fn join_criteria(owner: &BusinessObject, rel: &RelationshipDef) -> Result<Option<Criteria>, MapError> {
    let mut parts = Vec::with_capacity(rel.key().len());
    for pair in rel.key() {
        let value: Value = owner.value(&pair.owner_property)?;
        if is_null(&value) {
            return Ok(None);
        }
        parts.push(Criteria::eq(pair.related_property.as_str(), value));
    }
    Ok(Some(Criteria::all(parts)))
}
