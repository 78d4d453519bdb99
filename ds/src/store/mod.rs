//! Constraint store
//!
//! The store owns the partition of registry items into buckets. All
//! mutation goes through [`ConstraintStore::move_item`] (checked by the
//! move validator) and [`ConstraintStore::set_position_directive`].

mod core;
mod error;
pub mod validator;

pub use self::core::{ConstraintStore, MoveOutcome};
pub use error::{ApplyError, DirectiveError, MoveError};
pub use validator::{DirectiveEffect, MoveDecision, MoveRequest};
