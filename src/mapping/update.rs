use super::chain::storage_chain;
use super::mapper::SqlMapper;
use super::statement::{SqlStatement, SqlStatementCollection};
use crate::definition::prop::is_null;
use crate::error::MapError;
use crate::object::BusinessObject;
use sea_query::Value;

impl SqlMapper {
    /// UPDATE statements for the tables holding at least one dirty property
    ///
    /// Tables are visited root first. Each SET list carries every column stored in
    /// that table, sorted by property name, key and foreign key columns included. The
    /// WHERE clause matches the persisted key. Nothing dirty means no statements.
    pub fn build_update(&self, object: &BusinessObject) -> Result<SqlStatementCollection, MapError> {
        let chain = storage_chain(object.class_def());
        let mut statements = SqlStatementCollection::new();

        for level in chain.iter().rev() {
            let mut stored = level.stored_properties();
            if !stored.iter().any(|p| object.is_property_dirty(p.name())) {
                continue;
            }
            stored.sort_by(|a, b| a.name().cmp(b.name()));

            let mut statement = SqlStatement::new();
            statement.push_str("UPDATE ");
            statement.push_str(&self.formatter.delimit(level.table()));
            statement.push_str(" SET ");
            for (i, prop) in stored.iter().enumerate() {
                if i > 0 {
                    statement.push_str(", ");
                }
                statement.push_str(&self.formatter.delimit(prop.column_name()));
                statement.push_str(" = ");
                statement.push_param(&self.formatter, object.value(prop.name())?);
            }
            statement.push_str(" WHERE ");
            for (i, key) in level.key_properties().iter().enumerate() {
                if i > 0 {
                    statement.push_str(" AND ");
                }
                let value = persisted_key(object, key.name())?;
                statement.push_str(&self.formatter.delimit(key.column_name()));
                statement.push_str(" = ");
                statement.push_param(&self.formatter, value);
            }
            statements.push(statement);
        }

        log::debug!(
            "Built {} UPDATE statement(s) for '{}'",
            statements.len(),
            object.class_name()
        );
        Ok(statements)
    }
}

/// Persisted value of a key property, which must not be null
pub(crate) fn persisted_key(object: &BusinessObject, property: &str) -> Result<Value, MapError> {
    let value = object.persisted_value(property)?;
    if is_null(&value) {
        return Err(MapError::MissingKeyValue {
            class: object.class_name().to_string(),
            property: property.to_string(),
        });
    }
    Ok(value)
}
