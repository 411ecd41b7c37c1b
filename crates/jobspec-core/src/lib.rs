//! Jobspec Core
//!
//! The job specification model of a build pipeline and the validator that
//! guards it. A [`Job`] declares its image and commands, parameters,
//! dependencies on other jobs and projects, triggers, caches, retry policy and
//! resource requirements. [`Validate`] checks every structural invariant in
//! one pass and reports each violation against the field it concerns.

pub mod action;
pub mod blob;
pub mod build_spec;
pub mod cache;
pub mod credential;
pub mod dependency;
pub mod error;
pub mod event;
pub mod ids;
pub mod interpolation;
pub mod job;
pub mod param;
pub mod patterns;
pub mod ports;
pub mod query;
pub mod report;
pub mod retry;
pub mod service;
pub mod trigger;
pub mod validation;

pub use build_spec::BuildSpec;
pub use error::{Error, Result};
pub use event::ProjectEvent;
pub use ids::*;
pub use job::Job;
pub use retry::RetryPolicy;
pub use trigger::JobTrigger;
pub use validation::{FieldPath, Validate, Violation, Violations};
