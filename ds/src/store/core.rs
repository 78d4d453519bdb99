//! ConstraintStore implementation

use tracing::{debug, info};

use crate::domain::{Bucket, Placement, PositionDirective};
use crate::registry::ItemRegistry;
use crate::wire::ConstraintSpecification;

use super::error::{ApplyError, DirectiveError, MoveError};
use super::validator::{self, DirectiveEffect, MoveDecision, MoveRequest};

/// Result of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The item changed place
    Moved,
    /// Source and destination were the same slot; nothing changed
    Unchanged,
}

/// Partition of the registry's items into buckets
///
/// Every registry item sits in exactly one bucket at all times. The store
/// is built fresh from a registry and is never merged with another store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintStore {
    buckets: [Vec<Placement>; 6],
    total_items: usize,
    revision: u64,
}

impl ConstraintStore {
    /// Create a store with every registry item in Unassigned
    pub fn new(registry: &ItemRegistry) -> Self {
        debug!(count = registry.len(), "ConstraintStore::new: called");
        let mut buckets: [Vec<Placement>; 6] = Default::default();
        buckets[Bucket::Unassigned.index()] = registry.items().iter().map(Placement::plain).collect();

        Self {
            buckets,
            total_items: registry.len(),
            revision: 0,
        }
    }

    /// Build a store from a registry and a saved specification
    ///
    /// Items named by the specification are moved into their buckets (in
    /// listed order) through the regular move path; everything else stays
    /// Unassigned.
    pub fn from_specification(registry: &ItemRegistry, spec: &ConstraintSpecification) -> Result<Self, ApplyError> {
        debug!("ConstraintStore::from_specification: called");
        let mut store = Self::new(registry);
        store.apply_specification(spec)?;
        Ok(store)
    }

    /// Place the items of a saved specification
    ///
    /// All-or-nothing: on error the store is left as it was.
    pub fn apply_specification(&mut self, spec: &ConstraintSpecification) -> Result<(), ApplyError> {
        debug!(revision = self.revision, "apply_specification: called");
        let mut staged = self.clone();

        let lists = [
            (Bucket::Start, &spec.start),
            (Bucket::Middle, &spec.middle),
            (Bucket::End, &spec.end),
            (Bucket::OrderConstraints, &spec.relative_order),
        ];

        for fixed in &spec.fixed_positions {
            staged.place_at_end(&fixed.name, Bucket::OrderConstraints)?;
            staged.set_position_directive(&fixed.name, PositionDirective::Absolute(fixed.position))?;
        }
        for (bucket, names) in lists {
            for name in names {
                staged.place_at_end(name, bucket)?;
            }
        }

        *self = staged;
        info!(revision = self.revision, "Applied saved specification");
        Ok(())
    }

    /// Move an Unassigned item to the end of `dest`
    fn place_at_end(&mut self, name: &str, dest: Bucket) -> Result<(), MoveError> {
        let (source, index) = self.locate(name).ok_or_else(|| {
            debug!(%name, "place_at_end: not in registry");
            MoveError::NotInRegistry(name.to_string())
        })?;
        if source != Bucket::Unassigned {
            debug!(%name, %source, "place_at_end: already placed");
            return Err(MoveError::DuplicatePlacement(name.to_string()));
        }
        let dest_index = self.bucket(dest).len();
        self.move_placement(name, source, index, dest, dest_index)?;
        Ok(())
    }

    /// Move an item between buckets named by caller labels
    ///
    /// `dest_index` is an insertion index into the destination as it looks
    /// after the item has been removed from its source.
    pub fn move_item(
        &mut self,
        item: &str,
        source_bucket: &str,
        source_index: usize,
        dest_bucket: &str,
        dest_index: usize,
    ) -> Result<MoveOutcome, MoveError> {
        self.apply_move(&MoveRequest {
            item,
            source_bucket,
            source_index,
            dest_bucket,
            dest_index,
        })
    }

    /// Apply a move request
    pub fn apply_move(&mut self, request: &MoveRequest<'_>) -> Result<MoveOutcome, MoveError> {
        debug!(?request, "apply_move: called");
        let decision = validator::validate_move(request, |b| self.bucket(b))?;
        Ok(self.commit(request.item, decision))
    }

    /// Move an item between resolved buckets
    pub fn move_placement(
        &mut self,
        item: &str,
        source: Bucket,
        source_index: usize,
        dest: Bucket,
        dest_index: usize,
    ) -> Result<MoveOutcome, MoveError> {
        debug!(%item, %source, source_index, %dest, dest_index, "move_placement: called");
        let decision = validator::validate_resolved(item, source, source_index, dest, dest_index, |b| self.bucket(b))?;
        Ok(self.commit(item, decision))
    }

    fn commit(&mut self, item: &str, decision: MoveDecision) -> MoveOutcome {
        match decision {
            MoveDecision::NoOp => {
                debug!(%item, "commit: no-op, revision unchanged");
                MoveOutcome::Unchanged
            }
            MoveDecision::Commit {
                source,
                source_index,
                dest,
                dest_index,
                effect,
            } => {
                let mut placement = self.buckets[source.index()].remove(source_index);
                match effect {
                    DirectiveEffect::Keep => {}
                    DirectiveEffect::AssignRelative => placement.directive = Some(PositionDirective::Relative),
                    DirectiveEffect::Discard => placement.directive = None,
                }
                self.buckets[dest.index()].insert(dest_index, placement);
                self.revision += 1;
                debug!(%item, %source, %dest, revision = self.revision, "commit: moved");
                MoveOutcome::Moved
            }
        }
    }

    /// Replace the position directive of an item in Order Constraints
    pub fn set_position_directive(&mut self, item: &str, directive: PositionDirective) -> Result<(), DirectiveError> {
        debug!(%item, %directive, "set_position_directive: called");
        if let PositionDirective::Absolute(position) = directive
            && !(1..=self.total_items).contains(&position)
        {
            debug!(position, max = self.total_items, "set_position_directive: out of range");
            return Err(DirectiveError::PositionOutOfRange {
                position,
                max: self.total_items,
            });
        }

        let placement = self.buckets[Bucket::OrderConstraints.index()]
            .iter_mut()
            .find(|p| p.name == item)
            .ok_or_else(|| {
                debug!(%item, "set_position_directive: not in order constraints");
                DirectiveError::NotInOrderConstraints(item.to_string())
            })?;

        placement.directive = Some(directive);
        self.revision += 1;
        Ok(())
    }

    /// Placements in a bucket, in order
    pub fn bucket(&self, bucket: Bucket) -> &[Placement] {
        &self.buckets[bucket.index()]
    }

    /// Item names in a bucket, in order
    pub fn names(&self, bucket: Bucket) -> impl Iterator<Item = &str> {
        self.bucket(bucket).iter().map(|p| p.name.as_str())
    }

    /// Where an item currently sits
    pub fn locate(&self, item: &str) -> Option<(Bucket, usize)> {
        Bucket::ALL.into_iter().find_map(|bucket| {
            self.bucket(bucket)
                .iter()
                .position(|p| p.name == item)
                .map(|index| (bucket, index))
        })
    }

    /// Position directive of an item, if it is in Order Constraints
    pub fn directive(&self, item: &str) -> Option<PositionDirective> {
        self.bucket(Bucket::OrderConstraints)
            .iter()
            .find(|p| p.name == item)
            .and_then(|p| p.directive)
    }

    /// Number of items across all buckets
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Count of committed mutations since creation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether bucket contents and directives match, ignoring history
    pub fn same_contents(&self, other: &Self) -> bool {
        self.buckets == other.buckets
    }
}
