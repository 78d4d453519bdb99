//! Domain types for dancesort
//!
//! Core domain types: Bucket, Placement, PositionDirective.
//! Everything the store and the wire layer move around is built from these.

mod bucket;
mod placement;

pub use bucket::{Bucket, UnknownBucket};
pub use placement::{Placement, PositionDirective};
