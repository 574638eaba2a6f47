//! Property definitions.
//!
//! A [`PropDef`] describes one persisted property of a class level: its value kind,
//! the column it is stored in, its default, and the rules that govern writes.

use crate::definition::rule::PropRule;
use crate::error::DefinitionError;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_query::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Value kind of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropType {
    String,
    Integer,
    Decimal,
    Double,
    Boolean,
    DateTime,
    /// Unique identifier (UUID)
    Guid,
    Binary,
}

impl PropType {
    /// The null value of this kind
    #[must_use]
    pub fn null_value(self) -> Value {
        match self {
            PropType::String => Value::String(None),
            PropType::Integer => Value::BigInt(None),
            PropType::Decimal => Value::Decimal(None),
            PropType::Double => Value::Double(None),
            PropType::Boolean => Value::Bool(None),
            PropType::DateTime => Value::ChronoDateTime(None),
            PropType::Guid => Value::Uuid(None),
            PropType::Binary => Value::Bytes(None),
        }
    }

    /// Coerce a value into this kind
    ///
    /// Nulls of any kind become this kind's null. Integers of every width become
    /// `BigInt` and `Float` becomes `Double`, so that equality checks used for dirty
    /// tracking compare like with like.
    pub fn coerce(self, value: Value) -> Result<Value, String> {
        if is_null(&value) {
            return Ok(self.null_value());
        }
        let coerced = match (self, value) {
            (PropType::Integer, Value::BigInt(v)) => Value::BigInt(v),
            (PropType::Integer, Value::Int(Some(i))) => Value::BigInt(Some(i64::from(i))),
            (PropType::Integer, Value::SmallInt(Some(i))) => Value::BigInt(Some(i64::from(i))),
            (PropType::Integer, Value::TinyInt(Some(i))) => Value::BigInt(Some(i64::from(i))),
            (PropType::Integer, Value::Unsigned(Some(u))) => Value::BigInt(Some(i64::from(u))),
            (PropType::Integer, Value::SmallUnsigned(Some(u))) => {
                Value::BigInt(Some(i64::from(u)))
            }
            (PropType::Integer, Value::TinyUnsigned(Some(u))) => {
                Value::BigInt(Some(i64::from(u)))
            }
            (PropType::Integer, Value::BigUnsigned(Some(u))) => {
                let i = i64::try_from(u)
                    .map_err(|_| format!("{u} does not fit into a 64-bit integer"))?;
                Value::BigInt(Some(i))
            }
            (PropType::Double, Value::Float(Some(f))) => Value::Double(Some(f64::from(f))),
            (PropType::Double, v @ Value::Double(_)) => v,
            (PropType::String, v @ Value::String(_)) => v,
            (PropType::Boolean, v @ Value::Bool(_)) => v,
            (PropType::Decimal, v @ Value::Decimal(_)) => v,
            (PropType::DateTime, v @ Value::ChronoDateTime(_)) => v,
            (PropType::Guid, v @ Value::Uuid(_)) => v,
            (PropType::Binary, v @ Value::Bytes(_)) => v,
            (kind, other) => {
                return Err(format!("expected {kind}, got {}", value_kind_name(&other)));
            }
        };
        Ok(coerced)
    }

    /// Parse a textual default into a value of this kind
    ///
    /// `DateTime` accepts the tokens `Now` and `Today` in addition to
    /// `%Y-%m-%d %H:%M:%S` and `%Y-%m-%d`; they are resolved when the default is
    /// applied to a new instance, see [`DefaultValue::resolve`].
    pub fn parse_default(self, text: &str) -> Result<DefaultValue, String> {
        let text = text.trim();
        let value = match self {
            PropType::String => Value::String(Some(text.to_string())),
            PropType::Integer => Value::BigInt(Some(
                text.parse::<i64>().map_err(|e| e.to_string())?,
            )),
            PropType::Decimal => {
                Value::from(Decimal::from_str(text).map_err(|e| e.to_string())?)
            }
            PropType::Double => Value::Double(Some(
                text.parse::<f64>().map_err(|e| e.to_string())?,
            )),
            PropType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Value::Bool(Some(true)),
                "false" | "0" | "no" => Value::Bool(Some(false)),
                _ => return Err(format!("'{text}' is not a boolean")),
            },
            PropType::DateTime => {
                if text.eq_ignore_ascii_case("now") {
                    return Ok(DefaultValue::Now);
                }
                if text.eq_ignore_ascii_case("today") {
                    return Ok(DefaultValue::Today);
                }
                Value::from(parse_date_time(text)?)
            }
            PropType::Guid => Value::from(Uuid::parse_str(text).map_err(|e| e.to_string())?),
            PropType::Binary => return Err("binary properties cannot have a default".into()),
        };
        Ok(DefaultValue::Fixed(value))
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropType::String => "String",
            PropType::Integer => "Integer",
            PropType::Decimal => "Decimal",
            PropType::Double => "Double",
            PropType::Boolean => "Boolean",
            PropType::DateTime => "DateTime",
            PropType::Guid => "Guid",
            PropType::Binary => "Binary",
        };
        f.write_str(name)
    }
}

fn parse_date_time(text: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| e.to_string())?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("'{text}' is not a valid date"))
}

/// Whether a value is SQL `NULL`, whatever its kind
#[must_use]
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Bytes(None)
            | Value::Json(None)
            | Value::Decimal(None)
            | Value::ChronoDateTime(None)
            | Value::Uuid(None)
    )
}

/// Short kind name of a value, for error messages
#[must_use]
pub fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "Boolean",
        Value::TinyInt(_)
        | Value::SmallInt(_)
        | Value::Int(_)
        | Value::BigInt(_)
        | Value::TinyUnsigned(_)
        | Value::SmallUnsigned(_)
        | Value::Unsigned(_)
        | Value::BigUnsigned(_) => "Integer",
        Value::Float(_) | Value::Double(_) => "Double",
        Value::String(_) => "String",
        Value::Bytes(_) => "Binary",
        Value::Decimal(_) => "Decimal",
        Value::ChronoDateTime(_) => "DateTime",
        Value::Uuid(_) => "Guid",
        _ => "Other",
    }
}

/// Default value of a property
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A fixed value
    Fixed(Value),
    /// The local date and time when the instance is created
    Now,
    /// Local midnight of the day the instance is created
    Today,
}

impl DefaultValue {
    /// Produce the concrete value for a freshly created instance
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Fixed(v) => v.clone(),
            DefaultValue::Now => Value::from(Local::now().naive_local()),
            DefaultValue::Today => {
                let today = Local::now().date_naive();
                today
                    .and_hms_opt(0, 0, 0)
                    .map_or(Value::ChronoDateTime(None), Value::from)
            }
        }
    }
}

/// Who may write a property, and when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadWriteRule {
    #[default]
    ReadWrite,
    /// Never written through the object; values come from defaults or the database
    ReadOnly,
    /// Writable until a non-null value has been persisted
    WriteOnce,
    ReadManyWriteOnce,
    ReadManyWriteMany,
}

impl ReadWriteRule {
    /// Whether a write is allowed given the value last persisted
    #[must_use]
    pub fn allows_write(self, persisted: &Value) -> bool {
        match self {
            ReadWriteRule::ReadWrite | ReadWriteRule::ReadManyWriteMany => true,
            ReadWriteRule::ReadOnly => false,
            ReadWriteRule::WriteOnce | ReadWriteRule::ReadManyWriteOnce => is_null(persisted),
        }
    }
}

impl fmt::Display for ReadWriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Definition of one persisted property
///
/// # Example
///
/// ```
/// use tablemap::definition::{PropDef, PropType};
///
/// let radius = PropDef::new("Radius", PropType::Integer)
///     .compulsory()
///     .with_default_str("10")
///     .unwrap();
/// assert_eq!(radius.column_name(), "Radius");
/// ```
#[derive(Debug, Clone)]
pub struct PropDef {
    name: String,
    prop_type: PropType,
    read_write_rule: ReadWriteRule,
    column_name: Option<String>,
    default: Option<DefaultValue>,
    compulsory: bool,
    rule: Option<PropRule>,
    lookup_list: Option<String>,
}

impl PropDef {
    pub fn new(name: impl Into<String>, prop_type: PropType) -> Self {
        Self {
            name: name.into(),
            prop_type,
            read_write_rule: ReadWriteRule::default(),
            column_name: None,
            default: None,
            compulsory: false,
            rule: None,
            lookup_list: None,
        }
    }

    /// Store the property in a column whose name differs from the property name
    #[must_use]
    pub fn column(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    #[must_use]
    pub fn read_write(mut self, rule: ReadWriteRule) -> Self {
        self.read_write_rule = rule;
        self
    }

    #[must_use]
    pub fn compulsory(mut self) -> Self {
        self.compulsory = true;
        self
    }

    /// Set a typed default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Fixed(value.into()));
        self
    }

    /// Set a default from its textual form, parsed according to the value kind
    pub fn with_default_str(mut self, text: &str) -> Result<Self, DefinitionError> {
        let default = self
            .prop_type
            .parse_default(text)
            .map_err(|reason| DefinitionError::InvalidDefault {
                property: self.name.clone(),
                reason,
            })?;
        self.default = Some(default);
        Ok(self)
    }

    #[must_use]
    pub fn with_rule(mut self, rule: PropRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Name the lookup list that supplies display values for this property
    #[must_use]
    pub fn with_lookup_list(mut self, source: impl Into<String>) -> Self {
        self.lookup_list = Some(source.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop_type(&self) -> PropType {
        self.prop_type
    }

    pub fn read_write_rule(&self) -> ReadWriteRule {
        self.read_write_rule
    }

    /// Storage column; the property name unless overridden
    pub fn column_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.name)
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn is_compulsory(&self) -> bool {
        self.compulsory
    }

    pub fn rule(&self) -> Option<&PropRule> {
        self.rule.as_ref()
    }

    pub fn lookup_list(&self) -> Option<&str> {
        self.lookup_list.as_deref()
    }

    /// Value a new instance starts with
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default
            .as_ref()
            .map_or_else(|| self.prop_type.null_value(), DefaultValue::resolve)
    }

    /// Check that the default and rule fit this property's value kind
    pub(crate) fn verify(&self) -> Result<(), DefinitionError> {
        if let Some(DefaultValue::Fixed(value)) = &self.default {
            self.prop_type
                .coerce(value.clone())
                .map_err(|reason| DefinitionError::InvalidDefault {
                    property: self.name.clone(),
                    reason,
                })?;
        }
        if let Some(rule) = &self.rule {
            rule.verify_kind(self.prop_type)
                .map_err(|reason| DefinitionError::InvalidRule {
                    property: self.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Coerce a fixed default so instances start with a canonical value
    pub(crate) fn normalise_default(&mut self) {
        if let Some(DefaultValue::Fixed(value)) = &self.default {
            if let Ok(coerced) = self.prop_type.coerce(value.clone()) {
                self.default = Some(DefaultValue::Fixed(coerced));
            }
        }
    }
}
