//! Pure state machines for records with a lifecycle.
//!
//! # Responsibility
//! - Decide whether a transition is allowed and what it changes.
//! - Describe side effects as intents; applying them is the caller's job.
//!
//! # Invariants
//! - Workflow functions never touch storage or external services.
//! - A rejected transition returns an error and no new record.

pub mod visit_workflow;
