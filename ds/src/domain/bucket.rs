//! Bucket identifiers
//!
//! A bucket is a named partition of the item set. Callers (drag-and-drop
//! surfaces, preference files) refer to buckets by label; this module owns
//! the mapping between labels and the six recognized buckets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// A bucket label that does not name one of the six recognized buckets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown bucket: '{0}'")]
pub struct UnknownBucket(pub String);

/// The partitions an item can be placed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    /// Not yet placed by the user
    Unassigned,
    /// Kept out of the schedule request entirely
    Excluded,
    /// Opens the schedule, in listed order
    Start,
    /// Between Start and End, in listed order
    Middle,
    /// Closes the schedule, in listed order
    End,
    /// Items carrying a per-item position directive
    OrderConstraints,
}

impl Bucket {
    /// All buckets, in storage order
    pub const ALL: [Bucket; 6] = [
        Bucket::Unassigned,
        Bucket::Excluded,
        Bucket::Start,
        Bucket::Middle,
        Bucket::End,
        Bucket::OrderConstraints,
    ];

    /// Position of this bucket in [`Bucket::ALL`]
    pub fn index(self) -> usize {
        match self {
            Bucket::Unassigned => 0,
            Bucket::Excluded => 1,
            Bucket::Start => 2,
            Bucket::Middle => 3,
            Bucket::End => 4,
            Bucket::OrderConstraints => 5,
        }
    }

    /// Canonical label
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Unassigned => "Unassigned",
            Bucket::Excluded => "Excluded",
            Bucket::Start => "Start",
            Bucket::Middle => "Middle",
            Bucket::End => "End",
            Bucket::OrderConstraints => "Order Constraints",
        }
    }

    /// Whether the order of items within this bucket carries meaning
    pub fn is_ordered(self) -> bool {
        !matches!(self, Bucket::Unassigned | Bucket::Excluded)
    }

    /// Whether items in this bucket are sent to the scheduler
    pub fn is_constrained(self) -> bool {
        self.is_ordered()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Bucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Bucket::from_str: called");
        // Case-insensitive; runs of whitespace count as one space
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "unassigned" => Ok(Bucket::Unassigned),
            "excluded" => Ok(Bucket::Excluded),
            "start" => Ok(Bucket::Start),
            "middle" => Ok(Bucket::Middle),
            "end" => Ok(Bucket::End),
            // Labels from earlier UI revisions
            "order constraints" | "orderconstraints" | "fixed positions" => Ok(Bucket::OrderConstraints),
            _ => {
                debug!(%s, "Bucket::from_str: unrecognized label");
                Err(UnknownBucket(s.to_string()))
            }
        }
    }
}
