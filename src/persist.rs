//! Persister: drives a [`SqlMapper`] against a [`StatementExecutor`].
//!
//! The mapper only builds statements. The persister adds the I/O around them:
//! alternate key checks before a save, relationship cascades before a delete,
//! transaction boundaries, and turning rows back into business objects.

use crate::definition::class::ClassDef;
use crate::definition::registry::ClassDefRegistry;
use crate::definition::relationship::{DeleteAction, RelationshipDef};
use crate::error::{MapError, ObjectError};
use crate::executor::{count_from_rows, ExecError, Row, StatementExecutor};
use crate::mapping::criteria::Criteria;
use crate::mapping::mapper::{RelationshipProbe, SqlMapper};
use crate::mapping::statement::{SqlStatement, SqlStatementCollection};
use crate::object::BusinessObject;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "metrics")]
use std::time::Instant;

/// Persister error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// Statement generation failed
    Map(MapError),
    /// The object is invalid or could not be built from a row
    Object(ObjectError),
    /// The executor failed
    Exec(ExecError),
    /// Another stored object already holds the same alternate key values
    DuplicateKey { class: String, key: String },
    /// An UPDATE or DELETE matched no row
    RecordNotFound { class: String, statement: String },
    /// The object was already deleted
    AlreadyDeleted(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Map(e) => write!(f, "Mapping error: {e}"),
            PersistError::Object(e) => write!(f, "Object error: {e}"),
            PersistError::Exec(e) => write!(f, "Executor error: {e}"),
            PersistError::DuplicateKey { class, key } => write!(
                f,
                "A '{class}' with the same values for key '{key}' already exists"
            ),
            PersistError::RecordNotFound {
                class,
                statement,
            } => write!(
                f,
                "No stored '{class}' row matched statement: {statement}"
            ),
            PersistError::AlreadyDeleted(class) => {
                write!(f, "This '{class}' has already been deleted")
            }
        }
    }
}

impl std::error::Error for PersistError {}

impl From<MapError> for PersistError {
    fn from(err: MapError) -> Self {
        PersistError::Map(err)
    }
}

impl From<ObjectError> for PersistError {
    fn from(err: ObjectError) -> Self {
        PersistError::Object(err)
    }
}

impl From<ExecError> for PersistError {
    fn from(err: ExecError) -> Self {
        PersistError::Exec(err)
    }
}

impl From<crate::error::DefinitionError> for PersistError {
    fn from(err: crate::error::DefinitionError) -> Self {
        PersistError::Map(MapError::Definition(err))
    }
}

/// Saves, deletes and loads business objects through an executor
pub struct Persister<'r, E> {
    mapper: SqlMapper,
    registry: &'r ClassDefRegistry,
    executor: E,
}

impl<'r, E: StatementExecutor> Persister<'r, E> {
    pub fn new(mapper: SqlMapper, registry: &'r ClassDefRegistry, executor: E) -> Self {
        Self {
            mapper,
            registry,
            executor,
        }
    }

    pub fn mapper(&self) -> &SqlMapper {
        &self.mapper
    }

    pub fn registry(&self) -> &ClassDefRegistry {
        self.registry
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Insert a new object or update a changed one
    ///
    /// The object is validated and its alternate keys checked first. Statements run
    /// inside one transaction; on success the object is clean and no longer new.
    ///
    /// # Errors
    ///
    /// - `PersistError::Object` if validation fails
    /// - `PersistError::DuplicateKey` if an alternate key is already taken
    /// - `PersistError::RecordNotFound` if an UPDATE matched no row
    pub fn save(&self, object: &mut BusinessObject) -> Result<(), PersistError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tablemap.save", class = object.class_name()).entered();

        if object.is_deleted() {
            return Err(PersistError::AlreadyDeleted(object.class_name().to_string()));
        }
        object.validate()?;
        self.check_alternate_keys(object)?;

        let is_new = object.is_new();
        let statements = if is_new {
            self.mapper.build_insert(object)?
        } else {
            self.mapper.build_update(object)?
        };
        if statements.is_empty() {
            log::debug!("Nothing to save for '{}'", object.class_name());
            return Ok(());
        }
        #[cfg(feature = "metrics")]
        METRICS.record_generated(if is_new { "insert" } else { "update" }, statements.len());

        self.in_transaction(|| self.execute_all(object.class_name(), &statements, !is_new))?;
        object.mark_persisted();
        log::info!(
            "Committed {} of '{}' ({} statement(s))",
            if is_new { "insert" } else { "update" },
            object.class_name(),
            statements.len()
        );
        Ok(())
    }

    /// Delete a stored object, applying the delete action of every relationship
    ///
    /// `Prevent` relationships are checked first and refuse the whole delete.
    /// `Dereference` relationships are nulled and `DeleteRelated` relationships are
    /// deleted before the object's own rows, all in one transaction.
    ///
    /// # Errors
    ///
    /// - `PersistError::Map(MapError::DeletePrevented)` if a `Prevent` relationship
    ///   still has related objects
    /// - `PersistError::RecordNotFound` if a DELETE matched no row
    pub fn delete(&self, object: &mut BusinessObject) -> Result<(), PersistError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tablemap.delete", class = object.class_name()).entered();

        if object.is_deleted() {
            return Err(PersistError::AlreadyDeleted(object.class_name().to_string()));
        }
        if object.is_new() {
            object.mark_deleted();
            return Ok(());
        }
        self.in_transaction(|| self.delete_stored(object))?;
        object.mark_deleted();
        object.clear_related();
        log::info!("Committed delete of '{}'", object.class_name());
        Ok(())
    }

    fn delete_stored(&self, object: &BusinessObject) -> Result<(), PersistError> {
        let statements = self.mapper.build_delete(object, self)?;

        for relationship in object.class_def().all_relationships() {
            match relationship.delete_action() {
                DeleteAction::Dereference => {
                    let dereference =
                        self.mapper
                            .build_dereference(object, relationship.name(), self.registry)?;
                    self.execute_all(object.class_name(), &dereference, false)?;
                }
                DeleteAction::DeleteRelated => {
                    for related in self.query_related(object, relationship)? {
                        self.delete_stored(&related)?;
                    }
                }
                DeleteAction::DoNothing | DeleteAction::Prevent => {}
            }
        }

        #[cfg(feature = "metrics")]
        METRICS.record_generated("delete", statements.len());
        self.execute_all(object.class_name(), &statements, true)
    }

    /// Load every object of `class` matching `criteria`
    pub fn load(&self, class: &Arc<ClassDef>, criteria: Option<&Criteria>) -> Result<Vec<BusinessObject>, PersistError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tablemap.load", class = class.class_name()).entered();

        let statement = self.mapper.build_select(class, criteria)?;
        let rows = self.query(&statement)?;
        rows_to_objects(class, &rows)
    }

    /// Load the single object of `class` matching `criteria`, if any
    pub fn load_one(&self, class: &Arc<ClassDef>, criteria: &Criteria) -> Result<Option<BusinessObject>, PersistError> {
        let mut objects = self.load(class, Some(criteria))?;
        if objects.len() > 1 {
            log::warn!(
                "Expected one '{}' but loaded {}; using the first",
                class.class_name(),
                objects.len()
            );
        }
        Ok(if objects.is_empty() {
            None
        } else {
            Some(objects.swap_remove(0))
        })
    }

    /// Load the objects related to `owner`, caching them when the relationship keeps
    /// its reference
    pub fn load_related(&self, owner: &mut BusinessObject, relationship: &str) -> Result<Vec<BusinessObject>, PersistError> {
        let rel = owner
            .class_def()
            .find_relationship(relationship)
            .cloned()
            .ok_or_else(|| MapError::UnknownRelationship {
                class: owner.class_name().to_string(),
                relationship: relationship.to_string(),
            })?;
        let related = self.query_related(owner, &rel)?;
        if !rel.cardinality().allows(related.len()) {
            log::warn!(
                "Relationship '{}.{}' expects {} related object(s) but loaded {}",
                owner.class_name(),
                relationship,
                rel.cardinality(),
                related.len()
            );
        }
        owner.cache_related(relationship, related.clone());
        Ok(related)
    }

    fn query_related(&self, owner: &BusinessObject, rel: &RelationshipDef) -> Result<Vec<BusinessObject>, PersistError> {
        let Some(statement) = self
            .mapper
            .build_related_select(owner, rel.name(), self.registry)?
        else {
            return Ok(Vec::new());
        };
        let related = self.registry.require(rel.related_class())?;
        let rows = self.query(&statement)?;
        rows_to_objects(&related, &rows)
    }

    fn check_alternate_keys(&self, object: &BusinessObject) -> Result<(), PersistError> {
        for key in object.class_def().all_keys() {
            let Some(statement) = self.mapper.build_duplicate_check(object, key)? else {
                continue;
            };
            let rows = self.query(&statement)?;
            if count_from_rows(&rows)? > 0 {
                return Err(PersistError::DuplicateKey {
                    class: object.class_name().to_string(),
                    key: key.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn in_transaction<T>(&self, work: impl FnOnce() -> Result<T, PersistError>) -> Result<T, PersistError> {
        self.executor.begin()?;
        match work() {
            Ok(value) => {
                self.executor.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.executor.rollback() {
                    log::warn!("Rollback failed after '{err}': {rollback_err}");
                }
                Err(err)
            }
        }
    }

    fn execute_all(
        &self,
        class: &str,
        statements: &SqlStatementCollection,
        require_row: bool,
    ) -> Result<(), PersistError> {
        for statement in statements {
            let affected = self.execute(statement)?;
            if require_row && affected == 0 {
                return Err(PersistError::RecordNotFound {
                    class: class.to_string(),
                    statement: statement.sql().to_string(),
                });
            }
        }
        Ok(())
    }

    fn execute(&self, statement: &SqlStatement) -> Result<u64, PersistError> {
        log::debug!("Executing: {statement}");
        #[cfg(feature = "metrics")]
        let start = Instant::now();
        let affected = self.executor.execute(statement)?;
        #[cfg(feature = "metrics")]
        METRICS.record_execute(start.elapsed());
        Ok(affected)
    }

    fn query(&self, statement: &SqlStatement) -> Result<Vec<Row>, PersistError> {
        log::debug!("Querying: {statement}");
        #[cfg(feature = "metrics")]
        let start = Instant::now();
        let rows = self.executor.query(statement)?;
        #[cfg(feature = "metrics")]
        METRICS.record_execute(start.elapsed());
        Ok(rows)
    }
}

impl<E: StatementExecutor> RelationshipProbe for Persister<'_, E> {
    fn has_related(&self, owner: &BusinessObject, relationship: &RelationshipDef) -> Result<bool, MapError> {
        let Some(statement) = self
            .mapper
            .build_related_count(owner, relationship.name(), self.registry)?
        else {
            return Ok(false);
        };
        let rows = self
            .executor
            .query(&statement)
            .map_err(|e| MapError::Probe(e.to_string()))?;
        let count = count_from_rows(&rows).map_err(|e| MapError::Probe(e.to_string()))?;
        Ok(count > 0)
    }
}

fn rows_to_objects(class: &Arc<ClassDef>, rows: &[Row]) -> Result<Vec<BusinessObject>, PersistError> {
    rows.iter()
        .map(|row| BusinessObject::from_row(Arc::clone(class), row).map_err(PersistError::from))
        .collect()
}
