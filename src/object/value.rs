//! `TrackedValue`: a property value together with the value last persisted.

use sea_query::Value;

/// Current and last-persisted value of one property
///
/// A tracked value is dirty while its current value differs from the value it had
/// at the last load or save.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedValue {
    current: Value,
    persisted: Value,
}

impl TrackedValue {
    /// A clean value, as after a load
    #[must_use]
    pub fn clean(value: Value) -> Self {
        Self {
            current: value.clone(),
            persisted: value,
        }
    }

    pub fn current(&self) -> &Value {
        &self.current
    }

    pub fn persisted(&self) -> &Value {
        &self.persisted
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.persisted
    }

    /// Replace the current value, returning whether the value is now dirty
    pub fn set(&mut self, value: Value) -> bool {
        self.current = value;
        self.is_dirty()
    }

    /// Adopt the current value as persisted
    pub fn mark_clean(&mut self) {
        self.persisted = self.current.clone();
    }

    /// Throw away edits made since the last load or save
    pub fn restore(&mut self) {
        self.current = self.persisted.clone();
    }

    /// Reset both values, as when an instance is re-initialised from a row
    pub fn reset(&mut self, value: Value) {
        self.persisted = value.clone();
        self.current = value;
    }
}

impl From<Value> for TrackedValue {
    fn from(value: Value) -> Self {
        TrackedValue::clean(value)
    }
}
