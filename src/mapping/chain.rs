//! Effective property sets and storage table chains.
//!
//! Both views are derived on demand from a [`ClassDef`] and its ancestors:
//!
//! - the *effective property set* is every property an instance carries, own and
//!   inherited, flattened and name-unique;
//! - the *storage table chain* groups the lineage into physical tables, most-derived
//!   first. A class-table link starts a new table level; a single-table link folds the
//!   subclass into the table of its topmost single-table ancestor; a concrete-table
//!   link flattens every ancestor above it into the subclass's table.
//!
//! Single-table subclasses never contribute their own declared key properties: they
//! are stored under the key of the table they share.

use crate::definition::class::ClassDef;
use crate::definition::key::PrimaryKeyDef;
use crate::definition::prop::PropDef;

/// One physical table in a storage chain
#[derive(Debug, Clone)]
pub struct TableLevel<'a> {
    table: &'a str,
    classes: Vec<&'a ClassDef>,
    properties: Vec<&'a PropDef>,
    primary_key: &'a PrimaryKeyDef,
    key_properties: Vec<&'a PropDef>,
    parent_key: Vec<&'a PropDef>,
    parent_table: Option<&'a str>,
    discriminator: Option<(&'a str, &'a str)>,
}

impl<'a> TableLevel<'a> {
    /// Physical table name
    pub fn table(&self) -> &'a str {
        self.table
    }

    /// Class levels stored in this table, most-derived first
    pub fn classes(&self) -> &[&'a ClassDef] {
        &self.classes
    }

    /// The most-derived class stored in this table
    pub fn class_def(&self) -> &'a ClassDef {
        self.classes[0]
    }

    /// Own properties of this table, including its key properties
    pub fn properties(&self) -> &[&'a PropDef] {
        &self.properties
    }

    pub fn primary_key(&self) -> &'a PrimaryKeyDef {
        self.primary_key
    }

    /// Key properties of this table, in key order
    pub fn key_properties(&self) -> &[&'a PropDef] {
        &self.key_properties
    }

    /// Properties of the next table up whose columns this table carries as its
    /// foreign key; empty for the last level
    pub fn parent_key(&self) -> &[&'a PropDef] {
        &self.parent_key
    }

    /// Table the foreign key points at
    pub fn parent_table(&self) -> Option<&'a str> {
        self.parent_table
    }

    /// Discriminator column and the value rows of this level carry in it
    pub fn discriminator(&self) -> Option<(&'a str, &'a str)> {
        self.discriminator
    }

    /// Every property written to this table: own properties and the foreign key
    /// properties, in declaration order
    pub fn stored_properties(&self) -> Vec<&'a PropDef> {
        let mut stored = self.properties.clone();
        for &fk in &self.parent_key {
            if !stored.iter().any(|p| p.name() == fk.name()) {
                stored.push(fk);
            }
        }
        stored
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p.name() == property)
    }
}

/// Compute the storage table chain of a class, most-derived table first
pub fn storage_chain(class: &ClassDef) -> Vec<TableLevel<'_>> {
    let mut levels = Vec::new();
    let mut start = Some(class);
    while let Some(first) = start.take() {
        let mut classes = vec![first];
        let mut current = first;
        let mut flattened = false;
        while let Some(link) = current.super_class() {
            if !flattened && link.strategy().is_class_table() {
                start = Some(link.parent());
                break;
            }
            if link.strategy().is_concrete_table() {
                flattened = true;
            }
            current = link.parent();
            classes.push(current);
        }
        levels.push(group_level(classes));
    }

    for i in 1..levels.len() {
        let parent_key = levels[i].key_properties.clone();
        let parent_table = levels[i].table;
        levels[i - 1].parent_key = parent_key;
        levels[i - 1].parent_table = Some(parent_table);
    }
    levels
}

fn group_level(classes: Vec<&ClassDef>) -> TableLevel<'_> {
    let first = classes[0];

    // Rows of a single-table run land in the table of the topmost class of the run.
    let mut table_owner = first;
    let mut discriminator_column = None;
    for &class in &classes {
        let Some(link) = class.super_class() else { break };
        if !link.strategy().is_single_table() {
            break;
        }
        if discriminator_column.is_none() {
            discriminator_column = link.discriminator();
        }
        table_owner = link.parent();
    }

    let mut properties = Vec::new();
    for &class in &classes {
        let excluded = class
            .strategy()
            .filter(|s| s.is_single_table())
            .and(class.declared_key());
        for prop in class.properties() {
            if excluded.is_some_and(|key| key.contains(prop.name())) {
                continue;
            }
            properties.push(prop);
        }
    }

    let primary_key = first.primary_key();
    let key_properties = primary_key
        .properties()
        .iter()
        .filter_map(|name| properties.iter().copied().find(|p| p.name() == name.as_str()))
        .collect();

    TableLevel {
        table: table_owner.table_name(),
        discriminator: discriminator_column.map(|column| (column, first.class_name())),
        classes,
        properties,
        primary_key,
        key_properties,
        parent_key: Vec::new(),
        parent_table: None,
    }
}

/// Flattened, name-unique set of every property an instance of `class` carries,
/// most-derived level first and declaration order within a level
pub fn effective_properties(class: &ClassDef) -> Vec<&PropDef> {
    let mut effective: Vec<&PropDef> = Vec::new();
    for level in storage_chain(class) {
        for prop in level.properties {
            if !effective.iter().any(|p| p.name() == prop.name()) {
                effective.push(prop);
            }
        }
    }
    effective
}

/// Key properties, across the whole chain, whose value is the object ID
///
/// Empty when no level of the chain uses an object-ID key.
pub fn object_id_properties(class: &ClassDef) -> Vec<&PropDef> {
    let mut props = Vec::new();
    for level in storage_chain(class) {
        for &member in &level.classes {
            if member.strategy().is_some_and(|s| s.is_single_table()) {
                continue;
            }
            let Some(key) = member.declared_key() else { continue };
            if !key.is_object_id() {
                continue;
            }
            for name in key.properties() {
                if let Some(prop) = level
                    .properties
                    .iter()
                    .copied()
                    .find(|p| p.name() == name.as_str())
                {
                    props.push(prop);
                }
            }
        }
    }
    props
}
