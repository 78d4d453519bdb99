//! Constraint specification
//!
//! The scheduler-facing snapshot of a store. Only constrained buckets are
//! included; Unassigned and Excluded items never leave the editor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Bucket, PositionDirective};
use crate::store::ConstraintStore;

/// An item pinned to a 1-based slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPosition {
    pub name: String,
    pub position: usize,
}

/// Derived snapshot of a store, as sent to the scheduler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSpecification {
    /// Order Constraints items with an absolute slot, in bucket order
    #[serde(rename = "fixedPositions", default)]
    pub fixed_positions: Vec<FixedPosition>,

    /// Order Constraints items with a relative directive, in bucket order
    #[serde(rename = "relativeOrder", default, skip_serializing_if = "Vec::is_empty")]
    pub relative_order: Vec<String>,

    #[serde(rename = "Start", default)]
    pub start: Vec<String>,

    #[serde(rename = "Middle", default)]
    pub middle: Vec<String>,

    #[serde(rename = "End", default)]
    pub end: Vec<String>,
}

impl ConstraintSpecification {
    /// Compact JSON encoding; equal specifications encode to equal bytes
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether nothing at all is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.fixed_positions.is_empty()
            && self.relative_order.is_empty()
            && self.start.is_empty()
            && self.middle.is_empty()
            && self.end.is_empty()
    }

    /// Every constrained item name, fixed positions first
    pub fn constrained_names(&self) -> impl Iterator<Item = &str> {
        self.fixed_positions
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.relative_order.iter().map(String::as_str))
            .chain(self.start.iter().map(String::as_str))
            .chain(self.middle.iter().map(String::as_str))
            .chain(self.end.iter().map(String::as_str))
    }
}

/// Derive the specification for a store
///
/// Pure and order-preserving: depends only on bucket contents and
/// directives, never on the move history that produced them.
pub fn serialize(store: &ConstraintStore) -> ConstraintSpecification {
    debug!(revision = store.revision(), "serialize: called");
    let mut spec = ConstraintSpecification::default();

    for placement in store.bucket(Bucket::OrderConstraints) {
        match placement.directive.unwrap_or_default() {
            PositionDirective::Absolute(position) => spec.fixed_positions.push(FixedPosition {
                name: placement.name.clone(),
                position,
            }),
            PositionDirective::Relative => spec.relative_order.push(placement.name.clone()),
        }
    }

    let names = |bucket: Bucket| store.names(bucket).map(str::to_string).collect::<Vec<_>>();
    spec.start = names(Bucket::Start);
    spec.middle = names(Bucket::Middle);
    spec.end = names(Bucket::End);

    debug!(
        fixed = spec.fixed_positions.len(),
        relative = spec.relative_order.len(),
        start = spec.start.len(),
        middle = spec.middle.len(),
        end = spec.end.len(),
        "serialize: done"
    );
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ItemRegistry;
    use crate::store::{ApplyError, MoveError};

    fn registry() -> ItemRegistry {
        ItemRegistry::new(["Waltz", "Tango", "Foxtrot"]).unwrap()
    }

    #[test]
    fn test_example_scenario() {
        let mut store = ConstraintStore::new(&registry());
        store.move_item("Tango", "Unassigned", 1, "Start", 0).unwrap();
        store.move_item("Waltz", "Unassigned", 0, "OrderConstraints", 0).unwrap();
        store.set_position_directive("Waltz", PositionDirective::Absolute(2)).unwrap();

        let spec = serialize(&store);
        assert_eq!(
            spec.fixed_positions,
            vec![FixedPosition {
                name: "Waltz".to_string(),
                position: 2
            }]
        );
        assert_eq!(spec.start, vec!["Tango"]);
        assert!(spec.middle.is_empty());
        assert!(spec.end.is_empty());
        assert!(!spec.constrained_names().any(|n| n == "Foxtrot"));

        assert_eq!(
            spec.to_json().unwrap(),
            r#"{"fixedPositions":[{"name":"Waltz","position":2}],"Start":["Tango"],"Middle":[],"End":[]}"#
        );
    }

    #[test]
    fn test_relative_items_listed_separately() {
        let mut store = ConstraintStore::new(&registry());
        store.move_item("Waltz", "Unassigned", 0, "OrderConstraints", 0).unwrap();
        store.move_item("Tango", "Unassigned", 0, "OrderConstraints", 1).unwrap();
        store.set_position_directive("Tango", PositionDirective::Absolute(1)).unwrap();

        let spec = serialize(&store);
        assert_eq!(spec.relative_order, vec!["Waltz"]);
        assert_eq!(spec.fixed_positions.len(), 1);
        assert!(spec.to_json().unwrap().contains(r#""relativeOrder":["Waltz"]"#));
    }

    #[test]
    fn test_excluded_items_not_sent() {
        let mut store = ConstraintStore::new(&registry());
        store.move_item("Foxtrot", "Unassigned", 2, "Excluded", 0).unwrap();

        let spec = serialize(&store);
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn test_serialize_is_repeatable() {
        let mut store = ConstraintStore::new(&registry());
        store.move_item("Foxtrot", "Unassigned", 2, "End", 0).unwrap();
        store.move_item("Waltz", "Unassigned", 0, "Middle", 0).unwrap();

        let first = serialize(&store).to_json().unwrap();
        let second = serialize(&store).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_deserialize_without_optional_lists() {
        let json = r#"{"fixedPositions":[],"Start":["Waltz"]}"#;
        let spec: ConstraintSpecification = serde_json::from_str(json).unwrap();
        assert_eq!(spec.start, vec!["Waltz"]);
        assert!(spec.relative_order.is_empty());
        assert!(spec.end.is_empty());
    }

    #[test]
    fn test_apply_reproduces_specification() {
        let mut store = ConstraintStore::new(&registry());
        store.move_item("Waltz", "Unassigned", 0, "OrderConstraints", 0).unwrap();
        store.set_position_directive("Waltz", PositionDirective::Absolute(3)).unwrap();
        store.move_item("Foxtrot", "Unassigned", 1, "OrderConstraints", 1).unwrap();
        store.move_item("Tango", "Unassigned", 0, "Middle", 0).unwrap();
        let spec = serialize(&store);

        let rebuilt = ConstraintStore::from_specification(&registry(), &spec).unwrap();
        assert_eq!(serialize(&rebuilt), spec);
        assert!(rebuilt.same_contents(&store));
    }

    #[test]
    fn test_apply_rejects_unknown_and_duplicate_names() {
        let spec = ConstraintSpecification {
            start: vec!["Quickstep".to_string()],
            ..Default::default()
        };
        let err = ConstraintStore::from_specification(&registry(), &spec).unwrap_err();
        assert_eq!(err, ApplyError::Move(MoveError::NotInRegistry("Quickstep".to_string())));
        assert_eq!(err.to_string(), "Move error: Item 'Quickstep' is not in the registry");

        let spec = ConstraintSpecification {
            fixed_positions: vec![FixedPosition {
                name: "Mambo".to_string(),
                position: 1,
            }],
            ..Default::default()
        };
        assert_eq!(
            ConstraintStore::from_specification(&registry(), &spec).unwrap_err(),
            ApplyError::Move(MoveError::NotInRegistry("Mambo".to_string()))
        );

        let spec = ConstraintSpecification {
            start: vec!["Waltz".to_string()],
            end: vec!["Waltz".to_string()],
            ..Default::default()
        };
        let err = ConstraintStore::from_specification(&registry(), &spec).unwrap_err();
        assert_eq!(err.to_string(), "Move error: Item 'Waltz' is placed more than once");
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut store = ConstraintStore::new(&registry());
        let before = store.clone();
        let spec = ConstraintSpecification {
            start: vec!["Waltz".to_string()],
            fixed_positions: vec![FixedPosition {
                name: "Tango".to_string(),
                position: 99,
            }],
            ..Default::default()
        };

        assert!(store.apply_specification(&spec).is_err());
        assert_eq!(store, before);
    }
}
