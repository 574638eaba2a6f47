//! Type-specific validation rules for property values.

use crate::definition::prop::{is_null, PropType};
use chrono::NaiveDateTime;
use regex::Regex;
use rust_decimal::Decimal;
use sea_query::{Value, ValueType};

/// Bounds a property value must respect
///
/// Null values are never checked by a rule; use a compulsory property for that.
#[derive(Debug, Clone)]
pub enum PropRule {
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Decimal {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    Double {
        min: Option<f64>,
        max: Option<f64>,
    },
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Regex>,
    },
    DateTime {
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    },
}

impl PropRule {
    /// String rule with an optional pattern, compiled here
    pub fn string(
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<&str>,
    ) -> Result<Self, regex::Error> {
        let pattern = pattern.map(Regex::new).transpose()?;
        Ok(PropRule::String {
            min_length,
            max_length,
            pattern,
        })
    }

    pub(crate) fn verify_kind(&self, kind: PropType) -> Result<(), String> {
        let expected = match self {
            PropRule::Integer { .. } => PropType::Integer,
            PropRule::Decimal { .. } => PropType::Decimal,
            PropRule::Double { .. } => PropType::Double,
            PropRule::String { .. } => PropType::String,
            PropRule::DateTime { .. } => PropType::DateTime,
        };
        if expected == kind {
            Ok(())
        } else {
            Err(format!("a {expected} rule cannot apply to a {kind} property"))
        }
    }

    /// Check a value, returning a message per violated bound
    #[must_use]
    pub fn check(&self, property: &str, value: &Value) -> Vec<String> {
        if is_null(value) {
            return Vec::new();
        }
        let mut errors = Vec::new();
        match self {
            PropRule::Integer { min, max } => {
                if let Value::BigInt(Some(v)) = value {
                    check_bounds(property, v, min.as_ref(), max.as_ref(), &mut errors);
                }
            }
            PropRule::Decimal { min, max } => {
                if let Ok(v) = <Decimal as ValueType>::try_from(value.clone()) {
                    check_bounds(property, &v, min.as_ref(), max.as_ref(), &mut errors);
                }
            }
            PropRule::Double { min, max } => {
                if let Value::Double(Some(v)) = value {
                    check_bounds(property, v, min.as_ref(), max.as_ref(), &mut errors);
                }
            }
            PropRule::DateTime { min, max } => {
                if let Ok(v) = <NaiveDateTime as ValueType>::try_from(value.clone()) {
                    check_bounds(property, &v, min.as_ref(), max.as_ref(), &mut errors);
                }
            }
            PropRule::String {
                min_length,
                max_length,
                pattern,
            } => {
                if let Value::String(Some(s)) = value {
                    let len = s.chars().count();
                    if let Some(min) = min_length {
                        if len < *min {
                            errors.push(format!(
                                "{property} must be at least {min} characters long"
                            ));
                        }
                    }
                    if let Some(max) = max_length {
                        if len > *max {
                            errors.push(format!(
                                "{property} must be at most {max} characters long"
                            ));
                        }
                    }
                    if let Some(pattern) = pattern {
                        if !pattern.is_match(s) {
                            errors.push(format!(
                                "{property} does not match the pattern '{}'",
                                pattern.as_str()
                            ));
                        }
                    }
                }
            }
        }
        errors
    }
}

fn check_bounds<T: PartialOrd + std::fmt::Display>(
    property: &str,
    value: &T,
    min: Option<&T>,
    max: Option<&T>,
    errors: &mut Vec<String>,
) {
    if let Some(min) = min {
        if value < min {
            errors.push(format!("{property} must not be less than {min}"));
        }
    }
    if let Some(max) = max {
        if value > max {
            errors.push(format!("{property} must not be greater than {max}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_bounds() {
        let rule = PropRule::Integer {
            min: Some(1),
            max: Some(100),
        };
        assert!(rule.check("Radius", &Value::BigInt(Some(10))).is_empty());
        assert_eq!(
            rule.check("Radius", &Value::BigInt(Some(0))),
            vec!["Radius must not be less than 1".to_string()]
        );
        assert_eq!(rule.check("Radius", &Value::BigInt(Some(101))).len(), 1);
        assert!(rule.check("Radius", &Value::BigInt(None)).is_empty());
    }

    #[test]
    fn test_string_length_and_pattern() {
        let rule = PropRule::string(Some(2), Some(5), Some("^[A-Z]")).unwrap();
        assert!(rule.check("Code", &Value::String(Some("Abc".into()))).is_empty());
        assert_eq!(rule.check("Code", &Value::String(Some("a".into()))).len(), 2);
        assert_eq!(
            rule.check("Code", &Value::String(Some("Abcdef".into()))),
            vec!["Code must be at most 5 characters long".to_string()]
        );
    }

    #[test]
    fn test_decimal_bounds() {
        let rule = PropRule::Decimal {
            min: Some(Decimal::new(0, 0)),
            max: Some(Decimal::new(1000, 2)),
        };
        assert!(rule.check("Price", &Value::from(Decimal::new(999, 2))).is_empty());
        assert_eq!(rule.check("Price", &Value::from(Decimal::new(1001, 2))).len(), 1);
    }

    #[test]
    fn test_rule_kind_must_match_property_kind() {
        let rule = PropRule::Double {
            min: None,
            max: Some(1.0),
        };
        assert!(rule.verify_kind(PropType::Double).is_ok());
        assert!(rule.verify_kind(PropType::Integer).is_err());
    }
}
