//! Core domain logic for the ERP business modules.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod message;
pub mod model;
pub mod repo;
pub mod service;
pub mod workflow;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use message::ErrorCategory;
pub use model::calendar::{CalendarEvent, CalendarEventId, EventKind, UserId};
pub use model::visit::{MedicalVisit, VisitId, VisitStatus, VisitValidationError};
pub use repo::{RepoError, RepoResult};
pub use service::visit_workflow_service::{
    SqliteVisitWorkflow, VisitWorkflowError, VisitWorkflowService,
};
pub use workflow::visit_workflow::{
    allowed_operations, CalendarEffect, InvalidStateTransition, VisitOperation, VisitTransition,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
