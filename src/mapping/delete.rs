use super::chain::storage_chain;
use super::mapper::{RelationshipProbe, SqlMapper};
use super::statement::{SqlStatement, SqlStatementCollection};
use super::update::persisted_key;
use crate::definition::relationship::DeleteAction;
use crate::error::MapError;
use crate::object::BusinessObject;

impl SqlMapper {
    /// DELETE statements for a persisted object, most-derived table first
    ///
    /// `Prevent` relationships are checked with `probe` before anything is built; if
    /// any still has related objects the whole delete is refused. `Dereference` and
    /// `DeleteRelated` relationships are assumed to have been handled by the caller.
    ///
    /// # Errors
    ///
    /// - `MapError::DeletePrevented` if a `Prevent` relationship has related objects
    /// - `MapError::MissingKeyValue` if a key has no persisted value
    pub fn build_delete(
        &self,
        object: &BusinessObject,
        probe: &dyn RelationshipProbe,
    ) -> Result<SqlStatementCollection, MapError> {
        for relationship in object.class_def().all_relationships() {
            if relationship.delete_action() != DeleteAction::Prevent {
                continue;
            }
            if probe.has_related(object, relationship)? {
                log::warn!(
                    "Refusing to delete '{}': relationship '{}' still has related objects",
                    object.class_name(),
                    relationship.name()
                );
                return Err(MapError::DeletePrevented {
                    class: object.class_name().to_string(),
                    relationship: relationship.name().to_string(),
                });
            }
        }

        let chain = storage_chain(object.class_def());
        let mut statements = SqlStatementCollection::new();
        for level in &chain {
            let mut statement = SqlStatement::new();
            statement.push_str("DELETE FROM ");
            statement.push_str(&self.formatter.delimit(level.table()));
            statement.push_str(" WHERE ");
            for (i, key) in level.key_properties().iter().enumerate() {
                if i > 0 {
                    statement.push_str(" AND ");
                }
                statement.push_str(&self.formatter.delimit(key.column_name()));
                statement.push_str(" = ");
                statement.push_param(&self.formatter, persisted_key(object, key.name())?);
            }
            statements.push(statement);
        }

        log::debug!(
            "Built {} DELETE statement(s) for '{}'",
            statements.len(),
            object.class_name()
        );
        Ok(statements)
    }
}
