//! Relationship definitions.
//!
//! A relationship joins an owning class to a related class through ordered pairs of
//! (owner property, related property). The delete action is consulted before a
//! delete of the owner is generated.

/// Number of related objects on the far side
///
/// Bounds are not enforced when statements are built; loading related objects
/// reports a count outside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Multiple {
        order_by: Vec<OrderBy>,
        min_count: usize,
        max_count: Option<usize>,
    },
}

impl Cardinality {
    /// Unbounded multiple cardinality with no ordering
    pub fn multiple() -> Self {
        Cardinality::Multiple {
            order_by: Vec::new(),
            min_count: 0,
            max_count: None,
        }
    }

    /// Whether `count` related objects fall within these bounds
    pub fn allows(&self, count: usize) -> bool {
        match self {
            Cardinality::Single => count <= 1,
            Cardinality::Multiple {
                min_count,
                max_count,
                ..
            } => count >= *min_count && max_count.map_or(true, |max| count <= max),
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Single => f.write_str("at most one"),
            Cardinality::Multiple {
                min_count,
                max_count: Some(max),
                ..
            } => write!(f, "between {min_count} and {max}"),
            Cardinality::Multiple { min_count, .. } => write!(f, "at least {min_count}"),
        }
    }
}

/// What deleting the owner means for related objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeleteAction {
    #[default]
    DoNothing,
    /// Related objects have their foreign key nulled
    Dereference,
    /// Related objects are deleted first
    DeleteRelated,
    /// The delete is refused while related objects exist
    Prevent,
}

/// Sort direction of an order clause entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One entry of an order clause, naming a property of the related class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub property: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Join key pair: a property on the owner and the property it matches on the related class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelKeyPair {
    pub owner_property: String,
    pub related_property: String,
}

/// Relationship from an owning class to a related class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDef {
    name: String,
    related_class: String,
    key: Vec<RelKeyPair>,
    cardinality: Cardinality,
    delete_action: DeleteAction,
    keep_reference: bool,
}

impl RelationshipDef {
    /// Single-cardinality relationship (the owner references one related object)
    pub fn single(name: impl Into<String>, related_class: impl Into<String>) -> Self {
        Self::new(name, related_class, Cardinality::Single)
    }

    /// Multiple-cardinality relationship (many related objects reference the owner)
    pub fn multiple(name: impl Into<String>, related_class: impl Into<String>) -> Self {
        Self::new(name, related_class, Cardinality::multiple())
    }

    fn new(
        name: impl Into<String>,
        related_class: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            related_class: related_class.into(),
            key: Vec::new(),
            cardinality,
            delete_action: DeleteAction::default(),
            keep_reference: false,
        }
    }

    /// Add a join key pair; pairs are matched in the order they are added
    #[must_use]
    pub fn join(
        mut self,
        owner_property: impl Into<String>,
        related_property: impl Into<String>,
    ) -> Self {
        self.key.push(RelKeyPair {
            owner_property: owner_property.into(),
            related_property: related_property.into(),
        });
        self
    }

    #[must_use]
    pub fn on_delete(mut self, action: DeleteAction) -> Self {
        self.delete_action = action;
        self
    }

    #[must_use]
    pub fn keep_reference(mut self, keep: bool) -> Self {
        self.keep_reference = keep;
        self
    }

    /// Append an order clause entry; only meaningful for multiple cardinality
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        if let Cardinality::Multiple { order_by, .. } = &mut self.cardinality {
            order_by.push(order);
        }
        self
    }

    /// Set the count bounds; only meaningful for multiple cardinality
    #[must_use]
    pub fn bounds(mut self, min: usize, max: Option<usize>) -> Self {
        if let Cardinality::Multiple {
            min_count,
            max_count,
            ..
        } = &mut self.cardinality
        {
            *min_count = min;
            *max_count = max;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn related_class(&self) -> &str {
        &self.related_class
    }

    pub fn key(&self) -> &[RelKeyPair] {
        &self.key
    }

    pub fn cardinality(&self) -> &Cardinality {
        &self.cardinality
    }

    pub fn delete_action(&self) -> DeleteAction {
        self.delete_action
    }

    pub fn keeps_reference(&self) -> bool {
        self.keep_reference
    }

    /// Order clause of a multiple relationship, empty otherwise
    pub fn order(&self) -> &[OrderBy] {
        match &self.cardinality {
            Cardinality::Multiple { order_by, .. } => order_by,
            Cardinality::Single => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_relationship_builder() {
        let rel = RelationshipDef::multiple("Circles", "Circle")
            .join("ShapeID", "OwnerShapeID")
            .order_by(OrderBy::desc("Radius"))
            .bounds(0, Some(10))
            .on_delete(DeleteAction::Prevent);
        assert_eq!(rel.key().len(), 1);
        assert_eq!(rel.key()[0].owner_property, "ShapeID");
        assert_eq!(rel.order(), [OrderBy::desc("Radius")]);
        assert_eq!(rel.delete_action(), DeleteAction::Prevent);
        assert_eq!(
            rel.cardinality(),
            &Cardinality::Multiple {
                order_by: vec![OrderBy::desc("Radius")],
                min_count: 0,
                max_count: Some(10),
            }
        );
    }

    #[test]
    fn test_single_relationship_ignores_order() {
        let rel = RelationshipDef::single("Owner", "Person")
            .join("OwnerID", "PersonID")
            .order_by(OrderBy::asc("Surname"))
            .keep_reference(true);
        assert!(rel.order().is_empty());
        assert!(rel.keeps_reference());
        assert_eq!(rel.delete_action(), DeleteAction::DoNothing);
    }

    #[test]
    fn test_cardinality_bounds() {
        assert!(Cardinality::Single.allows(1));
        assert!(!Cardinality::Single.allows(2));

        let rel = RelationshipDef::multiple("Sketches", "Sketch").bounds(1, Some(3));
        assert!(!rel.cardinality().allows(0));
        assert!(rel.cardinality().allows(3));
        assert!(!rel.cardinality().allows(4));
        assert_eq!(rel.cardinality().to_string(), "between 1 and 3");
        assert!(Cardinality::multiple().allows(100));
    }
}
