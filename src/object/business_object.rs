//! Business objects: instances of a class definition.
//!
//! A [`BusinessObject`] carries one tracked value per property of its effective
//! property set. Key properties flagged as object IDs are not stored per property;
//! they all read the single object ID held by the instance.

use super::dirty::DirtyState;
use crate::definition::class::ClassDef;
use crate::definition::prop::{is_null, value_kind_name, PropDef};
use crate::error::ObjectError;
use crate::executor::Row;
use crate::mapping::chain;
use sea_query::{Value, ValueType};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// An instance of a class definition
#[derive(Debug, Clone)]
pub struct BusinessObject {
    class_def: Arc<ClassDef>,
    state: DirtyState,
    object_id: Option<Uuid>,
    id_properties: Vec<String>,
    is_new: bool,
    is_deleted: bool,
    related: HashMap<String, Vec<BusinessObject>>,
}

impl BusinessObject {
    /// Create a new, unsaved instance with defaults applied
    ///
    /// If any level of the chain uses an object-ID key a fresh identity is generated
    /// here, once, and never changes afterwards.
    pub fn new(class_def: Arc<ClassDef>) -> Self {
        let id_properties = id_property_names(&class_def);
        let object_id = (!id_properties.is_empty()).then(Uuid::new_v4);
        let mut state = DirtyState::new();
        for prop in chain::effective_properties(&class_def) {
            if id_properties.iter().any(|n| n == prop.name()) {
                continue;
            }
            let initial = prop
                .prop_type()
                .coerce(prop.initial_value())
                .unwrap_or_else(|_| prop.prop_type().null_value());
            state.track(prop.name(), initial);
        }
        Self {
            class_def,
            state,
            object_id,
            id_properties,
            is_new: true,
            is_deleted: false,
            related: HashMap::new(),
        }
    }

    /// Build a clean, persisted instance from a row keyed by column name
    pub fn from_row(class_def: Arc<ClassDef>, row: &Row) -> Result<Self, ObjectError> {
        let mut object = Self::new(Arc::clone(&class_def));
        object.is_new = false;
        object.object_id = None;

        for prop in chain::effective_properties(&class_def) {
            let column = prop.column_name();
            let raw = row.get(column).cloned().ok_or_else(|| ObjectError::MissingColumn {
                class: class_def.class_name().to_string(),
                column: column.to_string(),
            })?;
            if object.is_id_property(prop.name()) {
                if object.object_id.is_none() && !is_null(&raw) {
                    let id = <Uuid as ValueType>::try_from(raw.clone()).map_err(|_| {
                        ObjectError::InvalidValueType {
                            property: prop.name().to_string(),
                            expected: "Guid".to_string(),
                            actual: value_kind_name(&raw).to_string(),
                        }
                    })?;
                    object.object_id = Some(id);
                }
                continue;
            }
            let value = coerce(prop, raw)?;
            object.state.reset(prop.name(), value);
        }
        Ok(object)
    }

    pub fn class_def(&self) -> &ClassDef {
        &self.class_def
    }

    pub fn class_def_arc(&self) -> &Arc<ClassDef> {
        &self.class_def
    }

    pub fn class_name(&self) -> &str {
        self.class_def.class_name()
    }

    /// The single identity shared by every object-ID key of the chain
    pub fn object_id(&self) -> Option<Uuid> {
        self.object_id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Whether any property has changed since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn is_property_dirty(&self, name: &str) -> bool {
        self.state.is_property_dirty(name)
    }

    pub fn dirty_state(&self) -> &DirtyState {
        &self.state
    }

    /// Whether `name` is served by the object ID
    pub fn is_id_property(&self, name: &str) -> bool {
        self.id_properties.iter().any(|n| n == name)
    }

    fn object_id_value(&self) -> Value {
        self.object_id.map_or(Value::Uuid(None), Value::from)
    }

    /// Current value of a property
    pub fn value(&self, name: &str) -> Result<Value, ObjectError> {
        if self.is_id_property(name) {
            return Ok(self.object_id_value());
        }
        self.state
            .get(name)
            .map(|v| v.current().clone())
            .ok_or_else(|| self.unknown(name))
    }

    /// Value of a property at the last load or save
    pub fn persisted_value(&self, name: &str) -> Result<Value, ObjectError> {
        if self.is_id_property(name) {
            return Ok(self.object_id_value());
        }
        self.state
            .get(name)
            .map(|v| v.persisted().clone())
            .ok_or_else(|| self.unknown(name))
    }

    /// Set a property value
    ///
    /// # Errors
    ///
    /// - `ObjectError::UnknownProperty` if the class has no such property
    /// - `ObjectError::InvalidValueType` if the value kind does not match
    /// - `ObjectError::ReadOnly` if the read-write rule forbids the write, or the
    ///   property is served by the object ID
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ObjectError> {
        if self.is_id_property(name) {
            return Err(ObjectError::ReadOnly {
                property: name.to_string(),
                rule: "object ID".to_string(),
            });
        }
        let prop = self.prop_def(name)?;
        let rule = prop.read_write_rule();
        let value = coerce(prop, value.into())?;
        let persisted = self.persisted_value(name)?;
        if !rule.allows_write(&persisted) {
            return Err(ObjectError::ReadOnly {
                property: name.to_string(),
                rule: rule.to_string(),
            });
        }
        self.state.set(name, value);
        Ok(())
    }

    fn prop_def(&self, name: &str) -> Result<&PropDef, ObjectError> {
        chain::effective_properties(&self.class_def)
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| self.unknown(name))
    }

    fn unknown(&self, name: &str) -> ObjectError {
        ObjectError::UnknownProperty {
            class: self.class_name().to_string(),
            property: name.to_string(),
        }
    }

    /// Check compulsory properties and property rules
    ///
    /// # Errors
    ///
    /// Returns `ObjectError::Invalid` listing every failure.
    pub fn validate(&self) -> Result<(), ObjectError> {
        let mut errors = Vec::new();
        for prop in chain::effective_properties(&self.class_def) {
            let value = self.value(prop.name())?;
            if prop.is_compulsory() && is_null(&value) {
                errors.push(format!("{} is compulsory", prop.name()));
            }
            if let Some(rule) = prop.rule() {
                errors.extend(rule.check(prop.name(), &value));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ObjectError::Invalid(errors))
        }
    }

    /// Discard edits made since the last load or save
    pub fn cancel_edits(&mut self) {
        self.state.restore();
    }

    /// Record a successful insert or update: values become persisted, the object is
    /// no longer new
    pub fn mark_persisted(&mut self) {
        self.state.mark_clean();
        self.is_new = false;
    }

    /// Record a successful delete
    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }

    /// Remember resolved related objects if the relationship keeps its reference
    ///
    /// Returns whether the objects were cached.
    pub fn cache_related(&mut self, relationship: &str, objects: Vec<BusinessObject>) -> bool {
        let keep = self
            .class_def
            .find_relationship(relationship)
            .is_some_and(|r| r.keeps_reference());
        if keep {
            self.related.insert(relationship.to_string(), objects);
        }
        keep
    }

    /// Cached related objects, if resolved and kept
    pub fn related(&self, relationship: &str) -> Option<&[BusinessObject]> {
        self.related.get(relationship).map(Vec::as_slice)
    }

    pub fn clear_related(&mut self) {
        self.related.clear();
    }
}

fn id_property_names(class_def: &ClassDef) -> Vec<String> {
    chain::object_id_properties(class_def)
        .into_iter()
        .map(|p| p.name().to_string())
        .collect()
}

fn coerce(prop: &PropDef, value: Value) -> Result<Value, ObjectError> {
    let actual = value_kind_name(&value);
    prop.prop_type()
        .coerce(value)
        .map_err(|_| ObjectError::InvalidValueType {
            property: prop.name().to_string(),
            expected: prop.prop_type().to_string(),
            actual: actual.to_string(),
        })
}
