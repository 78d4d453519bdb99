//! dancesort - constraint editor for ordering dance performances
//!
//! A show's dances are partitioned into buckets (Start, Middle, End,
//! Order Constraints, Excluded, Unassigned) by discrete move operations.
//! The resulting constraint specification is sent to an external scheduler
//! that returns ordered schedules and the performer collisions it could
//! not avoid.
//!
//! # Modules
//!
//! - [`domain`] - Buckets, placements and position directives
//! - [`registry`] - The item set of a session, optionally read from sheet rows
//! - [`store`] - Constraint store and move validator
//! - [`wire`] - Specification serializer and response parser
//! - [`scheduler`] - Scheduler client trait and HTTP implementation
//! - [`session`] - Editing session with single-flight submissions
//! - [`conformance`] - Checks returned schedules against the specification
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod conformance;
pub mod domain;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod wire;

// Re-export commonly used types
pub use config::{Config, SchedulerConfig, SheetConfig};
pub use conformance::{ConformanceIssue, check_conformance};
pub use domain::{Bucket, Placement, PositionDirective, UnknownBucket};
pub use registry::{ItemRegistry, RegistryError, SheetValues};
pub use scheduler::{Credential, HttpSchedulerClient, ScheduleRequest, SchedulerClient, SchedulerError, SheetSource};
pub use session::{Session, SessionError, SubmissionOutcome, SubmissionTicket};
pub use store::{ApplyError, ConstraintStore, DirectiveError, MoveError, MoveOutcome, MoveRequest};
pub use wire::{
    Collision, ConstraintSpecification, FixedPosition, ParseError, ScheduleResponse, ScheduleResult, parse_results,
    serialize,
};
