//! Class definition registry.
//!
//! The registry maps class names to their definitions. It is an ordinary value, not a
//! process-wide static: a loader fills one in at startup and hands it (usually behind
//! an `Arc`) to whoever generates statements, and tests build as many independent
//! registries as they like.

use crate::definition::class::ClassDef;
use crate::error::DefinitionError;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of class definitions, keyed by class name
#[derive(Debug, Clone, Default)]
pub struct ClassDefRegistry {
    defs: HashMap<String, Arc<ClassDef>>,
}

impl ClassDefRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError::DuplicateClass` if a class with the same name is
    /// already registered.
    pub fn register(&mut self, def: impl Into<Arc<ClassDef>>) -> Result<Arc<ClassDef>, DefinitionError> {
        let def = def.into();
        let name = def.class_name().to_string();
        if self.defs.contains_key(&name) {
            return Err(DefinitionError::DuplicateClass(name));
        }
        log::debug!("Registered class definition '{}' (table {})", name, def.table_name());
        self.defs.insert(name, Arc::clone(&def));
        Ok(def)
    }

    /// Register a definition along with every ancestor not yet registered
    pub fn register_with_ancestors(&mut self, def: Arc<ClassDef>) -> Result<Arc<ClassDef>, DefinitionError> {
        let mut pending = Vec::new();
        let mut current = Some(Arc::clone(&def));
        while let Some(class) = current {
            current = class.super_class().map(|s| Arc::clone(s.parent_arc()));
            if !self.contains(class.class_name()) {
                pending.push(class);
            }
        }
        for class in pending.into_iter().rev() {
            self.register(class)?;
        }
        Ok(def)
    }

    pub fn get(&self, class_name: &str) -> Option<Arc<ClassDef>> {
        self.defs.get(class_name).cloned()
    }

    /// Like [`get`](Self::get) but reports a missing class as a definition error
    pub fn require(&self, class_name: &str) -> Result<Arc<ClassDef>, DefinitionError> {
        self.get(class_name)
            .ok_or_else(|| DefinitionError::UnknownClass(class_name.to_string()))
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.defs.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check every relationship's related class and related properties
    ///
    /// Relationships may name classes registered later, so this runs once the whole
    /// graph is loaded.
    pub fn validate_relationships(&self) -> Result<(), DefinitionError> {
        for name in self.class_names() {
            let Some(def) = self.defs.get(name) else { continue };
            for rel in def.relationships() {
                let related = self.require(rel.related_class())?;
                let related_props = crate::mapping::chain::effective_properties(&related);
                for pair in rel.key() {
                    if !related_props.iter().any(|p| p.name() == pair.related_property) {
                        return Err(DefinitionError::UnknownProperty {
                            class: related.class_name().to_string(),
                            property: pair.related_property.clone(),
                            context: format!(
                                "relationship '{}' of class '{}'",
                                rel.name(),
                                def.class_name()
                            ),
                        });
                    }
                }
                for order in rel.order() {
                    if !related_props.iter().any(|p| p.name() == order.property) {
                        return Err(DefinitionError::UnknownProperty {
                            class: related.class_name().to_string(),
                            property: order.property.clone(),
                            context: format!("order clause of relationship '{}'", rel.name()),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::relationship::RelationshipDef;
    use crate::definition::{PrimaryKeyDef, PropDef, PropType};
    use crate::test_helpers::shapes;

    #[test]
    fn test_register_and_get() {
        let mut registry = ClassDefRegistry::new();
        registry.register(shapes::class_table::shape()).unwrap();
        assert!(registry.contains("Shape"));
        assert_eq!(registry.get("Shape").unwrap().table_name(), "Shape");
        assert!(registry.get("Circle").is_none());
        assert_eq!(
            registry.require("Circle").unwrap_err(),
            DefinitionError::UnknownClass("Circle".to_string())
        );
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ClassDefRegistry::new();
        registry.register(shapes::class_table::shape()).unwrap();
        let err = registry.register(shapes::class_table::shape()).unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateClass("Shape".to_string()));
    }

    #[test]
    fn test_register_with_ancestors() {
        let mut registry = ClassDefRegistry::new();
        registry
            .register_with_ancestors(shapes::class_table::filled_circle())
            .unwrap();
        assert_eq!(registry.class_names(), ["Circle", "FilledCircle", "Shape"]);
    }

    #[test]
    fn test_independent_registries() {
        let mut first = ClassDefRegistry::new();
        let second = ClassDefRegistry::new();
        first.register(shapes::class_table::shape()).unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_validate_relationships_checks_related_property() {
        let owner = ClassDef::builder("Drawing", "Drawing")
            .property(PropDef::new("DrawingID", PropType::Guid))
            .primary_key(PrimaryKeyDef::object_id("DrawingID"))
            .relationship(RelationshipDef::multiple("Shapes", "Shape").join("DrawingID", "DrawingID"))
            .build()
            .unwrap();
        let mut registry = ClassDefRegistry::new();
        registry.register(owner).unwrap();
        assert_eq!(
            registry.validate_relationships().unwrap_err(),
            DefinitionError::UnknownClass("Shape".to_string())
        );
        registry.register(shapes::class_table::shape()).unwrap();
        assert!(matches!(
            registry.validate_relationships().unwrap_err(),
            DefinitionError::UnknownProperty { ref property, .. } if property == "DrawingID"
        ));
    }
}
