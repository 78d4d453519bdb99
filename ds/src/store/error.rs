//! Store error types

use thiserror::Error;

use crate::domain::{Bucket, UnknownBucket};

/// Errors from a rejected move; a rejected move never mutates the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    UnknownBucket(#[from] UnknownBucket),

    #[error("Item '{item}' is not at {bucket}[{index}]")]
    UnknownItem { item: String, bucket: Bucket, index: usize },

    #[error("Index {index} out of range for {bucket} (length {len})")]
    IndexOutOfRange { bucket: Bucket, index: usize, len: usize },

    #[error("Item '{0}' is placed more than once")]
    DuplicatePlacement(String),

    #[error("Item '{0}' is not in the registry")]
    NotInRegistry(String),
}

/// Errors from setting a position directive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("Item '{0}' is not in the Order Constraints bucket")]
    NotInOrderConstraints(String),

    #[error("Position {position} out of range (1..={max})")]
    PositionOutOfRange { position: usize, max: usize },
}

/// Errors from rebuilding a store out of a saved specification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("Move error: {0}")]
    Move(#[from] MoveError),

    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),
}

impl MoveError {
    /// Whether the move referenced a stale location (item moved since the caller looked)
    pub fn is_stale(&self) -> bool {
        matches!(self, MoveError::UnknownItem { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stale() {
        let err = MoveError::UnknownItem {
            item: "Waltz".to_string(),
            bucket: Bucket::Start,
            index: 0,
        };
        assert!(err.is_stale());

        let err = MoveError::IndexOutOfRange {
            bucket: Bucket::Start,
            index: 3,
            len: 1,
        };
        assert!(!err.is_stale());
    }

    #[test]
    fn test_unknown_bucket_converts() {
        let err: MoveError = UnknownBucket("Finale".to_string()).into();
        assert_eq!(err.to_string(), "Unknown bucket: 'Finale'");
    }

    #[test]
    fn test_not_in_registry_names_no_slot() {
        let err = MoveError::NotInRegistry("Mambo".to_string());
        assert_eq!(err.to_string(), "Item 'Mambo' is not in the registry");
        assert!(!err.is_stale());
    }

    #[test]
    fn test_display() {
        let err = DirectiveError::PositionOutOfRange { position: 9, max: 3 };
        assert_eq!(err.to_string(), "Position 9 out of range (1..=3)");
    }
}
