//! Primary and alternate key definitions.
//!
//! Keys name their member properties; the owning class checks at build time that
//! every member exists in its effective property set.

/// Primary key of a class level
///
/// With `is_object_id` set the key consists of exactly one unique-identifier property
/// whose value is the object's single identity (the object ID). That identity is
/// shared verbatim by every table of a class-table inheritance chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyDef {
    properties: Vec<String>,
    is_object_id: bool,
}

impl PrimaryKeyDef {
    /// Single-property object-ID key
    pub fn object_id(property: impl Into<String>) -> Self {
        Self {
            properties: vec![property.into()],
            is_object_id: true,
        }
    }

    /// Natural (business) key over one or more properties, in order
    pub fn natural<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
            is_object_id: false,
        }
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn is_object_id(&self) -> bool {
        self.is_object_id
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// Alternate (business) key
///
/// When `ignore_nulls` is set, an instance with a null member is not checked for
/// uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDef {
    name: String,
    properties: Vec<String>,
    ignore_nulls: bool,
}

impl KeyDef {
    pub fn new<I, S>(name: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            properties: properties.into_iter().map(Into::into).collect(),
            ignore_nulls: false,
        }
    }

    #[must_use]
    pub fn ignore_nulls(mut self, ignore: bool) -> Self {
        self.ignore_nulls = ignore;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn ignores_nulls(&self) -> bool {
        self.ignore_nulls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_key() {
        let pk = PrimaryKeyDef::object_id("ShapeID");
        assert!(pk.is_object_id());
        assert_eq!(pk.properties(), ["ShapeID".to_string()]);
        assert!(pk.contains("ShapeID"));
    }

    #[test]
    fn test_natural_key_keeps_member_order() {
        let pk = PrimaryKeyDef::natural(["Region", "Code"]);
        assert!(!pk.is_object_id());
        assert_eq!(pk.properties(), ["Region".to_string(), "Code".to_string()]);
    }

    #[test]
    fn test_alternate_key_ignore_nulls() {
        let key = KeyDef::new("UniqueName", ["ShapeName"]).ignore_nulls(true);
        assert_eq!(key.name(), "UniqueName");
        assert!(key.ignores_nulls());
    }
}
