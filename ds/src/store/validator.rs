//! Move validator
//!
//! Pure rule engine consulted before a move is committed. It resolves the
//! caller's bucket labels, checks that the item really sits at the claimed
//! source slot, bounds-checks the destination, and decides what happens to
//! the item's position directive. Cross-item judgments (balance between
//! Start/Middle/End, clashing absolute slots) belong to the scheduler.

use tracing::debug;

use crate::domain::{Bucket, Placement};

use super::error::MoveError;

/// A move as issued by a drag-and-drop surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest<'a> {
    pub item: &'a str,
    pub source_bucket: &'a str,
    pub source_index: usize,
    pub dest_bucket: &'a str,
    pub dest_index: usize,
}

/// What happens to the moved item's position directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveEffect {
    /// Carry the current directive (or lack of one) along
    Keep,
    /// Entering Order Constraints: start out Relative
    AssignRelative,
    /// Leaving Order Constraints: drop the directive
    Discard,
}

/// Verdict on a legal move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    /// Source and destination coincide; nothing to do
    NoOp,
    /// Remove from `source[source_index]`, then insert at `dest[dest_index]`
    Commit {
        source: Bucket,
        source_index: usize,
        dest: Bucket,
        dest_index: usize,
        effect: DirectiveEffect,
    },
}

/// Validate a move given by bucket labels
pub fn validate_move<'b, F>(request: &MoveRequest<'_>, bucket_of: F) -> Result<MoveDecision, MoveError>
where
    F: Fn(Bucket) -> &'b [Placement],
{
    debug!(?request, "validate_move: called");
    let source: Bucket = request.source_bucket.parse()?;
    let dest: Bucket = request.dest_bucket.parse()?;
    validate_resolved(
        request.item,
        source,
        request.source_index,
        dest,
        request.dest_index,
        bucket_of,
    )
}

/// Validate a move between already-resolved buckets
///
/// `bucket_of` gives read access to the current bucket contents.
pub fn validate_resolved<'b, F>(
    item: &str,
    source: Bucket,
    source_index: usize,
    dest: Bucket,
    dest_index: usize,
    bucket_of: F,
) -> Result<MoveDecision, MoveError>
where
    F: Fn(Bucket) -> &'b [Placement],
{
    debug!(%item, %source, source_index, %dest, dest_index, "validate_resolved: called");
    let source_list = bucket_of(source);

    let occupant = source_list.get(source_index).ok_or_else(|| {
        debug!("validate_resolved: source index out of range");
        MoveError::IndexOutOfRange {
            bucket: source,
            index: source_index,
            len: source_list.len(),
        }
    })?;

    if occupant.name != item {
        debug!(occupant = %occupant.name, "validate_resolved: stale source slot");
        return Err(MoveError::UnknownItem {
            item: item.to_string(),
            bucket: source,
            index: source_index,
        });
    }

    // Within one bucket the insertion index refers to the list after removal
    let dest_len = if source == dest {
        source_list.len() - 1
    } else {
        bucket_of(dest).len()
    };
    if dest_index > dest_len {
        debug!(dest_len, "validate_resolved: destination index out of range");
        return Err(MoveError::IndexOutOfRange {
            bucket: dest,
            index: dest_index,
            len: dest_len,
        });
    }

    if source == dest && source_index == dest_index {
        debug!("validate_resolved: no-op move");
        return Ok(MoveDecision::NoOp);
    }

    let effect = match (source == Bucket::OrderConstraints, dest == Bucket::OrderConstraints) {
        (false, true) => DirectiveEffect::AssignRelative,
        (true, false) => DirectiveEffect::Discard,
        _ => DirectiveEffect::Keep,
    };

    debug!(?effect, "validate_resolved: move accepted");
    Ok(MoveDecision::Commit {
        source,
        source_index,
        dest,
        dest_index,
        effect,
    })
}
