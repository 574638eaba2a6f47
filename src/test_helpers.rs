//! Shared fixtures for unit and integration tests.
//!
//! Enabled for this crate's own tests and, for integration tests, through the
//! `test-helpers` feature.

use crate::executor::{ExecError, Row, StatementExecutor};
use crate::mapping::statement::SqlStatement;
use sea_query::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// The Shape / Circle / FilledCircle hierarchy under each inheritance strategy
///
/// Every class keys on a GUID object ID named after itself (`ShapeID`, `CircleID`,
/// `FilledCircleID`). Each call builds fresh definitions.
pub mod shapes {
    use crate::definition::{
        ClassDef, ClassDefRegistry, DeleteAction, OrderBy, PrimaryKeyDef, PropDef, PropType,
        RelationshipDef, SuperClassDef,
    };
    use std::sync::Arc;

    fn shape_def() -> Arc<ClassDef> {
        ClassDef::builder("Shape", "Shape")
            .property(PropDef::new("ShapeID", PropType::Guid))
            .property(PropDef::new("ShapeName", PropType::String))
            .primary_key(PrimaryKeyDef::object_id("ShapeID"))
            .build_arc()
            .expect("Shape definition is valid")
    }

    fn circle_def(super_class: SuperClassDef) -> Arc<ClassDef> {
        ClassDef::builder("Circle", "Circle")
            .property(PropDef::new("CircleID", PropType::Guid))
            .property(PropDef::new("Radius", PropType::Integer))
            .primary_key(PrimaryKeyDef::object_id("CircleID"))
            .super_class(super_class)
            .build_arc()
            .expect("Circle definition is valid")
    }

    /// One table per class, joined by the shared object ID
    pub mod class_table {
        use super::*;

        pub fn shape() -> Arc<ClassDef> {
            shape_def()
        }

        pub fn circle() -> Arc<ClassDef> {
            circle_def(SuperClassDef::class_table(shape()))
        }

        pub fn filled_circle() -> Arc<ClassDef> {
            ClassDef::builder("FilledCircle", "FilledCircle")
                .property(PropDef::new("FilledCircleID", PropType::Guid))
                .property(PropDef::new("Colour", PropType::String))
                .primary_key(PrimaryKeyDef::object_id("FilledCircleID"))
                .super_class(SuperClassDef::class_table(circle()))
                .build_arc()
                .expect("FilledCircle definition is valid")
        }
    }

    /// Circle rows stored in the Shape table
    pub mod single_table {
        use super::*;

        pub fn shape() -> Arc<ClassDef> {
            shape_def()
        }

        pub fn circle() -> Arc<ClassDef> {
            circle_def(SuperClassDef::single_table(shape(), None))
        }

        /// Rows tagged in a `ShapeType` column
        pub fn circle_with_discriminator() -> Arc<ClassDef> {
            circle_def(SuperClassDef::single_table(shape(), Some("ShapeType")))
        }
    }

    /// Circle rows carry the inherited Shape columns in the Circle table
    pub mod concrete_table {
        use super::*;

        pub fn shape() -> Arc<ClassDef> {
            shape_def()
        }

        pub fn circle() -> Arc<ClassDef> {
            circle_def(SuperClassDef::concrete_table(shape()))
        }
    }

    /// A drawing owning many sketches through `Sketches`, ordered by `Position`
    pub fn drawing(on_delete: DeleteAction) -> Arc<ClassDef> {
        ClassDef::builder("Drawing", "Drawing")
            .property(PropDef::new("DrawingID", PropType::Guid))
            .property(PropDef::new("Title", PropType::String))
            .primary_key(PrimaryKeyDef::object_id("DrawingID"))
            .relationship(
                RelationshipDef::multiple("Sketches", "Sketch")
                    .join("DrawingID", "DrawingID")
                    .order_by(OrderBy::asc("Position"))
                    .on_delete(on_delete)
                    .keep_reference(true),
            )
            .build_arc()
            .expect("Drawing definition is valid")
    }

    pub fn sketch() -> Arc<ClassDef> {
        ClassDef::builder("Sketch", "Sketch")
            .property(PropDef::new("SketchID", PropType::Guid))
            .property(PropDef::new("DrawingID", PropType::Guid))
            .property(PropDef::new("Title", PropType::String))
            .property(PropDef::new("Position", PropType::Integer))
            .primary_key(PrimaryKeyDef::object_id("SketchID"))
            .build_arc()
            .expect("Sketch definition is valid")
    }

    /// Registry holding `Drawing` and `Sketch`
    pub fn drawing_registry(on_delete: DeleteAction) -> ClassDefRegistry {
        let mut registry = ClassDefRegistry::new();
        registry
            .register(drawing(on_delete))
            .expect("Drawing registers");
        registry.register(sketch()).expect("Sketch registers");
        registry
            .validate_relationships()
            .expect("Drawing relationships resolve");
        registry
    }
}

#[derive(Debug, Default)]
struct Script {
    log: Vec<String>,
    statements: Vec<SqlStatement>,
    rows: VecDeque<Vec<Row>>,
    affected: VecDeque<u64>,
    fail_on: Option<String>,
}

/// Executor that records every call and replays scripted results
///
/// - `query` returns the next scripted row set; with none scripted, `COUNT(*)`
///   queries answer 0 and other queries return no rows.
/// - `execute` returns the next scripted affected-row count, 1 by default.
/// - A statement whose text starts with the `fail_on` prefix fails.
///
/// The log holds `BEGIN`, `COMMIT`, `ROLLBACK` and every statement text in call order.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    script: Mutex<Script>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a row set for the next `query`
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.lock().rows.push_back(rows);
    }

    /// Queue a single-row `COUNT(*)` result
    pub fn push_count(&self, count: i64) {
        let row: Row = [("count".to_string(), Value::BigInt(Some(count)))]
            .into_iter()
            .collect();
        self.push_rows(vec![row]);
    }

    /// Queue an affected-row count for the next `execute`
    pub fn push_affected(&self, affected: u64) {
        self.lock().affected.push_back(affected);
    }

    /// Fail every statement whose text starts with `prefix`
    pub fn fail_on(&self, prefix: &str) {
        self.lock().fail_on = Some(prefix.to_string());
    }

    pub fn log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    /// Statements passed to `execute` or `query`, in call order
    pub fn statements(&self) -> Vec<SqlStatement> {
        self.lock().statements.clone()
    }

    /// Texts of the statements passed to `execute` or `query`
    pub fn sql(&self) -> Vec<String> {
        self.lock()
            .statements
            .iter()
            .map(|s| s.sql().to_string())
            .collect()
    }

    pub fn clear(&self) {
        let mut script = self.lock();
        script.log.clear();
        script.statements.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, statement: &SqlStatement) -> Result<std::sync::MutexGuard<'_, Script>, ExecError> {
        let mut script = self.lock();
        script.log.push(statement.sql().to_string());
        script.statements.push(statement.clone());
        if let Some(prefix) = &script.fail_on {
            if statement.sql().starts_with(prefix.as_str()) {
                return Err(ExecError::Database(format!("scripted failure: {}", statement.sql())));
            }
        }
        Ok(script)
    }
}

impl StatementExecutor for RecordingExecutor {
    fn execute(&self, statement: &SqlStatement) -> Result<u64, ExecError> {
        let mut script = self.record(statement)?;
        Ok(script.affected.pop_front().unwrap_or(1))
    }

    fn query(&self, statement: &SqlStatement) -> Result<Vec<Row>, ExecError> {
        let mut script = self.record(statement)?;
        if let Some(rows) = script.rows.pop_front() {
            return Ok(rows);
        }
        if statement.sql().starts_with("SELECT COUNT(*)") {
            let row: Row = [("count".to_string(), Value::BigInt(Some(0)))]
                .into_iter()
                .collect();
            return Ok(vec![row]);
        }
        Ok(Vec::new())
    }

    fn begin(&self) -> Result<(), ExecError> {
        self.lock().log.push("BEGIN".to_string());
        Ok(())
    }

    fn commit(&self) -> Result<(), ExecError> {
        self.lock().log.push("COMMIT".to_string());
        Ok(())
    }

    fn rollback(&self) -> Result<(), ExecError> {
        self.lock().log.push("ROLLBACK".to_string());
        Ok(())
    }
}
