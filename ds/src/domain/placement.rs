//! Placements and position directives

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an item in the Order Constraints bucket should land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionDirective {
    /// Only the ordering among other constrained items matters
    #[default]
    Relative,
    /// A fixed 1-based slot in the final schedule
    Absolute(usize),
}

impl PositionDirective {
    /// The absolute slot, if any
    pub fn absolute(self) -> Option<usize> {
        match self {
            PositionDirective::Relative => None,
            PositionDirective::Absolute(n) => Some(n),
        }
    }
}

impl fmt::Display for PositionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionDirective::Relative => write!(f, "relative"),
            PositionDirective::Absolute(n) => write!(f, "#{}", n),
        }
    }
}

/// An item sitting in a bucket
///
/// `directive` is `Some` exactly when the placement lives in the
/// Order Constraints bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    pub name: String,
    pub directive: Option<PositionDirective>,
}

impl Placement {
    /// A placement without metadata
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directive: None,
        }
    }

    /// A placement carrying a position directive
    pub fn directed(name: impl Into<String>, directive: PositionDirective) -> Self {
        Self {
            name: name.into(),
            directive: Some(directive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_is_relative() {
        assert_eq!(PositionDirective::default(), PositionDirective::Relative);
    }

    #[test]
    fn test_absolute_accessor() {
        assert_eq!(PositionDirective::Absolute(3).absolute(), Some(3));
        assert_eq!(PositionDirective::Relative.absolute(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PositionDirective::Relative.to_string(), "relative");
        assert_eq!(PositionDirective::Absolute(2).to_string(), "#2");
    }
}
