use super::chain::storage_chain;
use super::mapper::SqlMapper;
use super::statement::{SqlStatement, SqlStatementCollection};
use crate::error::MapError;
use crate::object::BusinessObject;
use sea_query::Value;

impl SqlMapper {
    /// INSERT statements for a new object, one per table, root table first
    ///
    /// Each column list is sorted by property name. A discriminator column, if the
    /// level has one, is sorted in by its column name and carries the class name.
    pub fn build_insert(&self, object: &BusinessObject) -> Result<SqlStatementCollection, MapError> {
        let chain = storage_chain(object.class_def());
        let mut statements = SqlStatementCollection::new();

        for level in chain.iter().rev() {
            let mut columns: Vec<(&str, &str, Value)> = Vec::new();
            for prop in level.stored_properties() {
                columns.push((prop.name(), prop.column_name(), object.value(prop.name())?));
            }
            if let Some((column, class_name)) = level.discriminator() {
                columns.push((column, column, Value::from(class_name)));
            }
            columns.sort_by(|a, b| a.0.cmp(b.0));

            let mut statement = SqlStatement::new();
            statement.push_str("INSERT INTO ");
            statement.push_str(&self.formatter.delimit(level.table()));
            statement.push_str(" (");
            let names: Vec<String> = columns.iter().map(|c| self.formatter.delimit(c.1)).collect();
            statement.push_str(&names.join(", "));
            statement.push_str(") VALUES (");
            statement.push_param_list(&self.formatter, columns.into_iter().map(|c| c.2));
            statement.push_str(")");
            statements.push(statement);
        }

        log::debug!(
            "Built {} INSERT statement(s) for '{}'",
            statements.len(),
            object.class_name()
        );
        Ok(statements)
    }
}
