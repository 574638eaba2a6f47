//! Parameterized statements and ordered statement collections.

use super::formatter::SqlFormatter;
use sea_query::Value;
use std::fmt;

/// SQL text plus its positional parameters
///
/// Parameters are bound by position, in the order their placeholders appear in the
/// text. Values are never inlined into the text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlStatement {
    sql: String,
    params: Vec<Value>,
}

impl SqlStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// A statement from already-built text and parameters
    pub fn from_parts(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn push_str(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Append a placeholder for `value` and bind it as the next parameter
    pub fn push_param(&mut self, formatter: &SqlFormatter, value: Value) {
        let placeholder = formatter.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        self.params.push(value);
    }

    /// Append `values` as a comma-separated placeholder list
    pub fn push_param_list(&mut self, formatter: &SqlFormatter, values: impl IntoIterator<Item = Value>) {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_param(formatter, value);
        }
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Statements of one logical operation, in the order they must execute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlStatementCollection {
    statements: Vec<SqlStatement>,
}

impl SqlStatementCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: SqlStatement) {
        self.statements.push(statement);
    }

    /// Append another collection, keeping both orders
    pub fn append(&mut self, other: SqlStatementCollection) {
        self.statements.extend(other.statements);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SqlStatement> {
        self.statements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SqlStatement> {
        self.statements.iter()
    }

    pub fn as_slice(&self) -> &[SqlStatement] {
        &self.statements
    }

    /// Statement texts, in execution order
    pub fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(SqlStatement::sql).collect()
    }
}

impl IntoIterator for SqlStatementCollection {
    type Item = SqlStatement;
    type IntoIter = std::vec::IntoIter<SqlStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a SqlStatementCollection {
    type Item = &'a SqlStatement;
    type IntoIter = std::slice::Iter<'a, SqlStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl From<SqlStatement> for SqlStatementCollection {
    fn from(statement: SqlStatement) -> Self {
        Self {
            statements: vec![statement],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_numbered_in_order_of_appearance() {
        let formatter = SqlFormatter::default();
        let mut statement = SqlStatement::new();
        statement.push_str("INSERT INTO Shape (ShapeID, ShapeName) VALUES (");
        statement.push_param_list(
            &formatter,
            [Value::BigInt(Some(1)), Value::String(Some("MyShape".into()))],
        );
        statement.push_str(")");
        assert_eq!(
            statement.sql(),
            "INSERT INTO Shape (ShapeID, ShapeName) VALUES (?Param0, ?Param1)"
        );
        assert_eq!(statement.params().len(), 2);
        assert_eq!(statement.params()[1], Value::String(Some("MyShape".into())));
    }

    #[test]
    fn test_collection_keeps_order() {
        let mut collection = SqlStatementCollection::new();
        collection.push(SqlStatement::from_parts("first", Vec::new()));
        collection.append(SqlStatement::from_parts("second", Vec::new()).into());
        assert_eq!(collection.sql(), ["first", "second"]);
        assert_eq!(collection.len(), 2);
        let texts: Vec<String> = collection.into_iter().map(|s| s.to_string()).collect();
        assert_eq!(texts, ["first", "second"]);
    }
}
