//! Class definitions.
//!
//! A [`ClassDef`] is one node of a singly-linked inheritance chain. It owns only its
//! own-level properties, keys and relationships; inherited members are reached
//! through the [`SuperClassDef`] link. Definitions are validated once by
//! [`ClassDefBuilder::build`] and are immutable afterwards.

use crate::definition::inheritance::{InheritanceStrategy, SuperClassDef};
use crate::definition::key::{KeyDef, PrimaryKeyDef};
use crate::definition::prop::{PropDef, PropType};
use crate::definition::relationship::RelationshipDef;
use crate::error::DefinitionError;
use crate::mapping::chain;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Definition of one class level
#[derive(Debug, Clone)]
pub struct ClassDef {
    class_name: String,
    table_name: String,
    declared_key: Option<PrimaryKeyDef>,
    primary_key: PrimaryKeyDef,
    properties: Vec<PropDef>,
    keys: Vec<KeyDef>,
    relationships: Vec<RelationshipDef>,
    super_class: Option<SuperClassDef>,
    supports_synchronising: bool,
}

impl ClassDef {
    /// Start building a class stored in `table_name`
    pub fn builder(class_name: impl Into<String>, table_name: impl Into<String>) -> ClassDefBuilder {
        ClassDefBuilder {
            class_name: class_name.into(),
            table_name: table_name.into(),
            primary_key: None,
            properties: Vec::new(),
            keys: Vec::new(),
            relationships: Vec::new(),
            super_class: None,
            supports_synchronising: false,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Table declared on this level (which may not be where rows land under
    /// single-table inheritance, see [`chain::storage_chain`])
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Effective primary key
    ///
    /// Single-table subclasses use the key of the class whose table they share; every
    /// other class uses the key it declares.
    pub fn primary_key(&self) -> &PrimaryKeyDef {
        &self.primary_key
    }

    /// Key as declared on this level, if any
    pub fn declared_key(&self) -> Option<&PrimaryKeyDef> {
        self.declared_key.as_ref()
    }

    /// Own-level properties, inherited ones excluded
    pub fn properties(&self) -> &[PropDef] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropDef> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn keys(&self) -> &[KeyDef] {
        &self.keys
    }

    pub fn relationships(&self) -> &[RelationshipDef] {
        &self.relationships
    }

    pub fn super_class(&self) -> Option<&SuperClassDef> {
        self.super_class.as_ref()
    }

    pub fn supports_synchronising(&self) -> bool {
        self.supports_synchronising
    }

    /// Strategy of the link to the superclass, `None` at the root
    pub fn strategy(&self) -> Option<&InheritanceStrategy> {
        self.super_class.as_ref().map(SuperClassDef::strategy)
    }

    /// This class followed by every ancestor up to the root
    pub fn lineage(&self) -> Vec<&ClassDef> {
        let mut lineage = vec![self];
        let mut current = self;
        while let Some(super_class) = &current.super_class {
            current = super_class.parent();
            lineage.push(current);
        }
        lineage
    }

    /// Whether `other` is this class or one of its ancestors
    pub fn is_a(&self, class_name: &str) -> bool {
        self.lineage().iter().any(|c| c.class_name == class_name)
    }

    /// Look a relationship up on this class or any ancestor
    pub fn find_relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.lineage()
            .into_iter()
            .flat_map(|c| c.relationships.iter())
            .find(|r| r.name() == name)
    }

    /// Relationships of this class and every ancestor, most-derived first
    pub fn all_relationships(&self) -> Vec<&RelationshipDef> {
        self.lineage()
            .into_iter()
            .flat_map(|c| c.relationships.iter())
            .collect()
    }

    /// Alternate keys of this class and every ancestor
    pub fn all_keys(&self) -> Vec<&KeyDef> {
        self.lineage()
            .into_iter()
            .flat_map(|c| c.keys.iter())
            .collect()
    }

    /// Rebuild this definition under a different superclass link
    ///
    /// Meant for test harnesses that map the same class with several strategies; the
    /// result is validated like any other definition.
    pub fn with_super_class(&self, super_class: Option<SuperClassDef>) -> Result<ClassDef, DefinitionError> {
        ClassDefBuilder {
            class_name: self.class_name.clone(),
            table_name: self.table_name.clone(),
            primary_key: self.declared_key.clone(),
            properties: self.properties.clone(),
            keys: self.keys.clone(),
            relationships: self.relationships.clone(),
            super_class,
            supports_synchronising: self.supports_synchronising,
        }
        .build()
    }
}

/// Builder for [`ClassDef`]
#[derive(Debug, Clone)]
pub struct ClassDefBuilder {
    class_name: String,
    table_name: String,
    primary_key: Option<PrimaryKeyDef>,
    properties: Vec<PropDef>,
    keys: Vec<KeyDef>,
    relationships: Vec<RelationshipDef>,
    super_class: Option<SuperClassDef>,
    supports_synchronising: bool,
}

impl ClassDefBuilder {
    #[must_use]
    pub fn property(mut self, prop: PropDef) -> Self {
        self.properties.push(prop);
        self
    }

    #[must_use]
    pub fn primary_key(mut self, key: PrimaryKeyDef) -> Self {
        self.primary_key = Some(key);
        self
    }

    #[must_use]
    pub fn key(mut self, key: KeyDef) -> Self {
        self.keys.push(key);
        self
    }

    #[must_use]
    pub fn relationship(mut self, relationship: RelationshipDef) -> Self {
        self.relationships.push(relationship);
        self
    }

    #[must_use]
    pub fn super_class(mut self, super_class: SuperClassDef) -> Self {
        self.super_class = Some(super_class);
        self
    }

    #[must_use]
    pub fn supports_synchronising(mut self, supports: bool) -> Self {
        self.supports_synchronising = supports;
        self
    }

    /// Validate and freeze the definition
    pub fn build(self) -> Result<ClassDef, DefinitionError> {
        let class_name = self.class_name;
        let single_table_link = self
            .super_class
            .as_ref()
            .is_some_and(|s| s.strategy().is_single_table());

        let primary_key = match (&self.primary_key, &self.super_class) {
            (_, Some(super_class)) if single_table_link => super_class.parent().primary_key().clone(),
            (Some(key), _) => key.clone(),
            (None, _) => return Err(DefinitionError::MissingPrimaryKey(class_name)),
        };

        let mut properties = self.properties;
        for prop in &mut properties {
            prop.verify()?;
            prop.normalise_default();
        }

        let class = ClassDef {
            class_name,
            table_name: self.table_name,
            declared_key: self.primary_key,
            primary_key,
            properties,
            keys: self.keys,
            relationships: self.relationships,
            super_class: self.super_class,
            supports_synchronising: self.supports_synchronising,
        };
        validate(&class)?;
        Ok(class)
    }

    /// Build and wrap in an `Arc`, ready to be linked as a superclass or registered
    pub fn build_arc(self) -> Result<Arc<ClassDef>, DefinitionError> {
        self.build().map(Arc::new)
    }
}

fn unknown(class: &ClassDef, property: &str, context: String) -> DefinitionError {
    DefinitionError::UnknownProperty {
        class: class.class_name.clone(),
        property: property.to_string(),
        context,
    }
}

fn validate(class: &ClassDef) -> Result<(), DefinitionError> {
    validate_strategy_chain(class)?;

    if let Some(declared) = &class.declared_key {
        for name in declared.properties() {
            if class.property(name).is_none() {
                return Err(unknown(class, name, "its primary key".to_string()));
            }
        }
        if declared.is_object_id() {
            validate_object_id(class, declared)?;
        }
    }

    // Own-level properties, before the effective set folds repeated names together.
    // Foreign key columns are the parent level's key properties, so they are not
    // counted twice here.
    let levels = chain::storage_chain(class);
    let mut names = HashSet::new();
    let mut columns: HashMap<&str, &str> = HashMap::new();
    for prop in levels.iter().flat_map(|level| level.properties().iter().copied()) {
        if !names.insert(prop.name()) {
            return Err(DefinitionError::DuplicateProperty {
                class: class.class_name.clone(),
                property: prop.name().to_string(),
            });
        }
        if let Some(other) = columns.insert(prop.column_name(), prop.name()) {
            return Err(DefinitionError::DuplicateColumn {
                class: class.class_name.clone(),
                column: prop.column_name().to_string(),
                properties: (other.to_string(), prop.name().to_string()),
            });
        }
    }

    for key in &class.keys {
        if key.properties().is_empty() {
            return Err(unknown(class, "", format!("key '{}'", key.name())));
        }
        for name in key.properties() {
            if !names.contains(name.as_str()) {
                return Err(unknown(class, name, format!("key '{}'", key.name())));
            }
        }
    }

    for rel in &class.relationships {
        if rel.key().is_empty() {
            return Err(DefinitionError::InvalidRelationship {
                class: class.class_name.clone(),
                relationship: rel.name().to_string(),
                reason: "no join properties".to_string(),
            });
        }
        for pair in rel.key() {
            if !names.contains(pair.owner_property.as_str()) {
                return Err(unknown(
                    class,
                    &pair.owner_property,
                    format!("relationship '{}'", rel.name()),
                ));
            }
        }
    }

    for level in &levels {
        if let Some((column, _)) = level.discriminator() {
            if columns.contains_key(column) {
                return Err(DefinitionError::DiscriminatorCollision {
                    class: class.class_name.clone(),
                    column: column.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Single-table inheritance collapses the rest of the chain into one table, so every
/// link above a single-table link must be single-table as well.
fn validate_strategy_chain(class: &ClassDef) -> Result<(), DefinitionError> {
    let lineage = class.lineage();
    for (i, level) in lineage.iter().enumerate() {
        let Some(strategy) = level.strategy() else { continue };
        if !strategy.is_single_table() {
            continue;
        }
        for ancestor in &lineage[i + 1..] {
            if let Some(above) = ancestor.strategy() {
                if !above.is_single_table() {
                    return Err(DefinitionError::MixedInheritance {
                        class: level.class_name.clone(),
                        ancestor: ancestor.class_name.clone(),
                        strategy: above.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn validate_object_id(class: &ClassDef, key: &PrimaryKeyDef) -> Result<(), DefinitionError> {
    let invalid = |reason: &str| DefinitionError::InvalidObjectId {
        class: class.class_name.clone(),
        reason: reason.to_string(),
    };
    let [name] = key.properties() else {
        return Err(invalid("an object ID key must have exactly one property"));
    };
    match class.property(name) {
        Some(prop) if prop.prop_type() == PropType::Guid => Ok(()),
        Some(_) => Err(invalid("an object ID property must be a Guid")),
        None => Err(unknown(class, name, "its primary key".to_string())),
    }
}
