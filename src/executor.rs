//! Statement executor boundary.
//!
//! The mapping engine never talks to a database. A [`StatementExecutor`] receives the
//! generated statements, runs them in the order given and hands back affected-row
//! counts or rows keyed by column name.

use crate::mapping::statement::SqlStatement;
use sea_query::Value;
use std::collections::HashMap;
use std::fmt;

/// One result row, keyed by column name
pub type Row = HashMap<String, Value>;

/// Executor error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Database-level failure reported by the provider
    Database(String),
    /// Statement was rejected before it reached the database
    QueryError(String),
    /// A row could not be read
    ParseError(String),
    /// Transaction begin/commit/rollback failure
    Transaction(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Database(s) => write!(f, "Database error: {s}"),
            ExecError::QueryError(s) => write!(f, "Query error: {s}"),
            ExecError::ParseError(s) => write!(f, "Parse error: {s}"),
            ExecError::Transaction(s) => write!(f, "Transaction error: {s}"),
            ExecError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for ExecError {}

/// Trait for running generated statements
///
/// Implementations bind [`SqlStatement::params`] by position. Transaction hooks
/// default to no-ops for executors without transactions.
pub trait StatementExecutor {
    /// Execute a statement and return the number of rows affected
    ///
    /// # Errors
    ///
    /// Returns `ExecError` if the statement fails.
    fn execute(&self, statement: &SqlStatement) -> Result<u64, ExecError>;

    /// Execute a query and return all rows
    ///
    /// # Errors
    ///
    /// Returns `ExecError` if the query fails.
    fn query(&self, statement: &SqlStatement) -> Result<Vec<Row>, ExecError>;

    fn begin(&self) -> Result<(), ExecError> {
        Ok(())
    }

    fn commit(&self) -> Result<(), ExecError> {
        Ok(())
    }

    fn rollback(&self) -> Result<(), ExecError> {
        Ok(())
    }
}

impl<E: StatementExecutor + ?Sized> StatementExecutor for &E {
    fn execute(&self, statement: &SqlStatement) -> Result<u64, ExecError> {
        (**self).execute(statement)
    }

    fn query(&self, statement: &SqlStatement) -> Result<Vec<Row>, ExecError> {
        (**self).query(statement)
    }

    fn begin(&self) -> Result<(), ExecError> {
        (**self).begin()
    }

    fn commit(&self) -> Result<(), ExecError> {
        (**self).commit()
    }

    fn rollback(&self) -> Result<(), ExecError> {
        (**self).rollback()
    }
}

/// Read a `COUNT(*)` result: the single value of the first row
pub fn count_from_rows(rows: &[Row]) -> Result<u64, ExecError> {
    let value = rows
        .first()
        .and_then(|row| row.values().next())
        .ok_or_else(|| ExecError::ParseError("COUNT(*) returned no rows".to_string()))?;
    match value {
        Value::BigInt(Some(n)) => u64::try_from(*n).map_err(|e| ExecError::ParseError(e.to_string())),
        Value::Int(Some(n)) => u64::try_from(*n).map_err(|e| ExecError::ParseError(e.to_string())),
        Value::BigUnsigned(Some(n)) => Ok(*n),
        Value::Unsigned(Some(n)) => Ok(u64::from(*n)),
        other => Err(ExecError::ParseError(format!("COUNT(*) returned {other:?}"))),
    }
}
