//! Scheduler wire format
//!
//! Converts the constraint store into the specification the external
//! scheduler consumes, and the scheduler's response back into results.

mod result;
mod specification;

pub use result::{Collision, ParseError, ScheduleResponse, ScheduleResult, parse_results};
pub use specification::{ConstraintSpecification, FixedPosition, serialize};
