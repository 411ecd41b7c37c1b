//! Scheduling side of jobspec.
//!
//! Consumes an accepted [`jobspec_core::BuildSpec`]: resolves the dependency
//! graph across jobs, dispatches events to the jobs they trigger, computes
//! retry back-off and schedule-trigger fire times.

pub mod dag;
pub mod retry;
pub mod schedule;
pub mod triggers;

pub use dag::{DagBuilder, DagError, JobDag};
pub use retry::Backoff;
pub use triggers::{Dispatch, TriggerDispatcher};
