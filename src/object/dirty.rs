//! Per-instance dirty-state tracking.
//!
//! [`DirtyState`] maps property names to tracked values. The mapping engine reads it
//! to decide which table levels an UPDATE has to touch.

use super::value::TrackedValue;
use sea_query::Value;
use std::collections::BTreeMap;

/// Property name to (current value, persisted value) for one instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtyState {
    values: BTreeMap<String, TrackedValue>,
}

impl DirtyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a property with a clean value
    pub fn track(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), TrackedValue::clean(value));
    }

    pub fn get(&self, name: &str) -> Option<&TrackedValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a tracked property's current value; `None` if the property is not tracked
    pub fn set(&mut self, name: &str, value: Value) -> Option<bool> {
        self.values.get_mut(name).map(|tracked| tracked.set(value))
    }

    /// Reset a tracked property to a clean value
    pub fn reset(&mut self, name: &str, value: Value) {
        if let Some(tracked) = self.values.get_mut(name) {
            tracked.reset(value);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.values.values().any(TrackedValue::is_dirty)
    }

    pub fn is_property_dirty(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(TrackedValue::is_dirty)
    }

    /// Names of dirty properties, sorted
    pub fn dirty_properties(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(_, v)| v.is_dirty())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Adopt every current value as persisted
    pub fn mark_clean(&mut self) {
        self.values.values_mut().for_each(TrackedValue::mark_clean);
    }

    /// Throw away every edit since the last load or save
    pub fn restore(&mut self) {
        self.values.values_mut().for_each(TrackedValue::restore);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
