//! Schedule conformance
//!
//! Compares a schedule returned by the scheduler against the specification
//! it was asked to honor. The scheduler may legitimately give up on a
//! constraint (clashing fixed slots, for instance); this report makes that
//! visible next to the collisions.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::wire::{ConstraintSpecification, ScheduleResult};

/// A constraint the schedule does not meet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConformanceIssue {
    /// A constrained item does not appear in the schedule
    MissingItem { name: String },
    /// An item pinned to a slot landed elsewhere
    FixedPositionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// The schedule does not open with the Start items in order
    StartMismatch { name: String, expected: usize },
    /// The schedule does not close with the End items in order
    EndMismatch { name: String, expected: usize },
    /// Two items of an ordered list appear in the wrong relative order
    OrderViolation { first: String, second: String },
}

impl fmt::Display for ConformanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConformanceIssue::MissingItem { name } => write!(f, "'{}' is missing from the schedule", name),
            ConformanceIssue::FixedPositionMismatch { name, expected, actual } => {
                write!(f, "'{}' should be at #{} but is at #{}", name, expected, actual)
            }
            ConformanceIssue::StartMismatch { name, expected } => {
                write!(f, "'{}' should open the schedule at #{}", name, expected)
            }
            ConformanceIssue::EndMismatch { name, expected } => {
                write!(f, "'{}' should close the schedule at #{}", name, expected)
            }
            ConformanceIssue::OrderViolation { first, second } => {
                write!(f, "'{}' should come before '{}'", first, second)
            }
        }
    }
}

/// List every constraint of `spec` that `result` does not meet
pub fn check_conformance(spec: &ConstraintSpecification, result: &ScheduleResult) -> Vec<ConformanceIssue> {
    debug!(schedule_len = result.schedule.len(), "check_conformance: called");
    let mut issues = Vec::new();

    for name in spec.constrained_names() {
        if result.position_of(name).is_none() {
            issues.push(ConformanceIssue::MissingItem { name: name.to_string() });
        }
    }

    for fixed in &spec.fixed_positions {
        if let Some(actual) = result.position_of(&fixed.name)
            && actual != fixed.position
        {
            issues.push(ConformanceIssue::FixedPositionMismatch {
                name: fixed.name.clone(),
                expected: fixed.position,
                actual,
            });
        }
    }

    for (i, name) in spec.start.iter().enumerate() {
        let expected = i + 1;
        if result.position_of(name).is_some_and(|actual| actual != expected) {
            issues.push(ConformanceIssue::StartMismatch {
                name: name.clone(),
                expected,
            });
        }
    }

    let len = result.schedule.len();
    for (i, name) in spec.end.iter().enumerate() {
        // Slot counted back from the end; an over-long End list cannot fit
        let expected = (len + i + 1).saturating_sub(spec.end.len());
        if result.position_of(name).is_some_and(|actual| actual != expected) {
            issues.push(ConformanceIssue::EndMismatch {
                name: name.clone(),
                expected,
            });
        }
    }

    for list in [&spec.middle, &spec.relative_order] {
        issues.extend(order_violations(list, result));
    }

    debug!(issue_count = issues.len(), "check_conformance: done");
    issues
}

/// Adjacent pairs of `list` whose schedule order is reversed
fn order_violations(list: &[String], result: &ScheduleResult) -> Vec<ConformanceIssue> {
    let placed: Vec<(&String, usize)> = list
        .iter()
        .filter_map(|name| result.position_of(name).map(|p| (name, p)))
        .collect();

    placed
        .windows(2)
        .filter(|pair| pair[0].1 > pair[1].1)
        .map(|pair| ConformanceIssue::OrderViolation {
            first: pair[0].0.clone(),
            second: pair[1].0.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::FixedPosition;

    fn result(schedule: &[&str]) -> ScheduleResult {
        ScheduleResult {
            schedule: schedule.iter().map(|s| s.to_string()).collect(),
            cost: 0,
            collisions: vec![],
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_conforming_schedule() {
        let spec = ConstraintSpecification {
            fixed_positions: vec![FixedPosition {
                name: "Waltz".to_string(),
                position: 2,
            }],
            start: names(&["Tango"]),
            end: names(&["Rumba", "Salsa"]),
            middle: names(&["Foxtrot", "Jive"]),
            ..Default::default()
        };
        let schedule = result(&["Tango", "Waltz", "Foxtrot", "Jive", "Rumba", "Salsa"]);

        assert!(check_conformance(&spec, &schedule).is_empty());
    }

    #[test]
    fn test_fixed_position_mismatch() {
        let spec = ConstraintSpecification {
            fixed_positions: vec![FixedPosition {
                name: "Waltz".to_string(),
                position: 1,
            }],
            ..Default::default()
        };
        let issues = check_conformance(&spec, &result(&["Tango", "Waltz"]));

        assert_eq!(
            issues,
            vec![ConformanceIssue::FixedPositionMismatch {
                name: "Waltz".to_string(),
                expected: 1,
                actual: 2
            }]
        );
        assert_eq!(issues[0].to_string(), "'Waltz' should be at #1 but is at #2");
    }

    #[test]
    fn test_start_and_end_mismatch() {
        let spec = ConstraintSpecification {
            start: names(&["Tango"]),
            end: names(&["Waltz"]),
            ..Default::default()
        };
        let issues = check_conformance(&spec, &result(&["Waltz", "Foxtrot", "Tango"]));

        assert!(issues.contains(&ConformanceIssue::StartMismatch {
            name: "Tango".to_string(),
            expected: 1
        }));
        assert!(issues.contains(&ConformanceIssue::EndMismatch {
            name: "Waltz".to_string(),
            expected: 3
        }));
    }

    #[test]
    fn test_missing_item() {
        let spec = ConstraintSpecification {
            middle: names(&["Jive"]),
            ..Default::default()
        };
        assert_eq!(
            check_conformance(&spec, &result(&["Waltz"])),
            vec![ConformanceIssue::MissingItem {
                name: "Jive".to_string()
            }]
        );
    }

    #[test]
    fn test_relative_order_violation() {
        let spec = ConstraintSpecification {
            relative_order: names(&["Waltz", "Tango"]),
            ..Default::default()
        };
        assert_eq!(
            check_conformance(&spec, &result(&["Tango", "Foxtrot", "Waltz"])),
            vec![ConformanceIssue::OrderViolation {
                first: "Waltz".to_string(),
                second: "Tango".to_string()
            }]
        );
    }

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issue = ConformanceIssue::MissingItem {
            name: "Jive".to_string(),
        };
        let json = serde_json::to_string(&issue).unwrap();
        assert_eq!(json, r#"{"kind":"missing-item","name":"Jive"}"#);
    }
}
