//! Medical visit workflow use-cases.
//!
//! # Responsibility
//! - Load a visit, run the pure transition, apply calendar effects and save.
//! - Offer a SQLite entry point that wraps each operation in one transaction.
//!
//! # Invariants
//! - Guard failures happen before any repository write.
//! - Calendar effects are applied before the visit is saved, so the saved
//!   row always points at an existing event (or none).
//! - `SqliteVisitWorkflow` commits status and calendar changes together or
//!   rolls both back.

use crate::message::{ErrorCategory, MEDICAL_VISIT_NOT_FOUND};
use crate::model::visit::{MedicalVisit, VisitId};
use crate::repo::calendar_repo::{CalendarEventRepository, SqliteCalendarEventRepository};
use crate::repo::visit_repo::{MedicalVisitRepository, SqliteMedicalVisitRepository};
use crate::repo::RepoError;
use crate::workflow::visit_workflow::{
    transition, CalendarEffect, InvalidStateTransition, VisitOperation, VisitTransition,
};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by visit workflow use-cases.
#[derive(Debug)]
pub enum VisitWorkflowError {
    /// Current status does not allow the operation.
    InvalidStateTransition(InvalidStateTransition),
    /// No visit with this ID.
    VisitNotFound(VisitId),
    /// Persistence or calendar failure, passed through unchanged.
    Repo(RepoError),
}

impl VisitWorkflowError {
    /// Category for callers that map errors to user-facing severities.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::InvalidStateTransition(err) => Some(err.category()),
            Self::VisitNotFound(_) => Some(ErrorCategory::NoValue),
            Self::Repo(_) => None,
        }
    }

    /// Message key for callers that localize; `None` for technical failures.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidStateTransition(err) => Some(err.message_key()),
            Self::VisitNotFound(_) => Some(MEDICAL_VISIT_NOT_FOUND),
            Self::Repo(_) => None,
        }
    }
}

impl Display for VisitWorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStateTransition(err) => write!(f, "{err}"),
            Self::VisitNotFound(id) => write!(f, "medical visit not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VisitWorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidStateTransition(err) => Some(err),
            Self::VisitNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<InvalidStateTransition> for VisitWorkflowError {
    fn from(value: InvalidStateTransition) -> Self {
        Self::InvalidStateTransition(value)
    }
}

impl From<RepoError> for VisitWorkflowError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for VisitWorkflowError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Workflow service over injected visit and calendar repositories.
///
/// Atomicity is the caller's: run it over repositories sharing one
/// transaction (see [`SqliteVisitWorkflow`]).
pub struct VisitWorkflowService<V: MedicalVisitRepository, C: CalendarEventRepository> {
    visits: V,
    calendar: C,
}

impl<V: MedicalVisitRepository, C: CalendarEventRepository> VisitWorkflowService<V, C> {
    /// Creates a service using the provided repository implementations.
    pub fn new(visits: V, calendar: C) -> Self {
        Self { visits, calendar }
    }

    /// Visit repository the service writes to.
    pub fn visits(&self) -> &V {
        &self.visits
    }

    /// Calendar repository the service applies effects to.
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Draft -> Planned; creates and links a calendar event for the assigned user.
    pub fn plan(&self, visit_id: VisitId) -> Result<MedicalVisit, VisitWorkflowError> {
        self.run(VisitOperation::Plan, visit_id)
    }

    /// Planned -> Realized.
    pub fn realize(&self, visit_id: VisitId) -> Result<MedicalVisit, VisitWorkflowError> {
        self.run(VisitOperation::Realize, visit_id)
    }

    /// Planned | Realized -> Canceled; removes the linked calendar event.
    pub fn cancel(&self, visit_id: VisitId) -> Result<MedicalVisit, VisitWorkflowError> {
        self.run(VisitOperation::Cancel, visit_id)
    }

    /// Applies an accepted transition: calendar effects first, then the save.
    pub fn apply(&self, transition: VisitTransition) -> Result<MedicalVisit, VisitWorkflowError> {
        let VisitTransition {
            mut visit, effects, ..
        } = transition;

        for effect in effects {
            match effect {
                CalendarEffect::CreateEvent(event) => {
                    let event_id = self.calendar.create_event(&event)?;
                    visit.calendar_event_id = Some(event_id);
                }
                CalendarEffect::RemoveEvent(event_id) => {
                    self.calendar.remove_event(event_id)?;
                }
            }
        }

        self.visits.save_visit(&visit)?;
        Ok(visit)
    }

    fn run(
        &self,
        operation: VisitOperation,
        visit_id: VisitId,
    ) -> Result<MedicalVisit, VisitWorkflowError> {
        let visit = self
            .visits
            .find_visit(visit_id)?
            .ok_or(VisitWorkflowError::VisitNotFound(visit_id))?;

        let accepted = match transition(operation, &visit) {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(
                    "event=medical_visit_{} module=hr status=rejected visit_id={} current_status={}",
                    operation,
                    visit_id,
                    visit.status.map_or("unset", |status| status.as_str())
                );
                return Err(err.into());
            }
        };

        let effect_count = accepted.effects.len();
        let saved = self.apply(accepted)?;
        info!(
            "event=medical_visit_{} module=hr status=ok visit_id={} new_status={} calendar_effects={}",
            operation,
            visit_id,
            saved.status.map_or("unset", |status| status.as_str()),
            effect_count
        );
        Ok(saved)
    }
}

/// SQLite entry point: each operation is one `IMMEDIATE` transaction.
pub struct SqliteVisitWorkflow<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteVisitWorkflow<'conn> {
    /// Creates a workflow over `conn`; each call opens its own transaction.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Transactional [`VisitWorkflowService::plan`].
    pub fn plan(&mut self, visit_id: VisitId) -> Result<MedicalVisit, VisitWorkflowError> {
        self.run_in_transaction(VisitOperation::Plan, visit_id)
    }

    /// Transactional [`VisitWorkflowService::realize`].
    pub fn realize(&mut self, visit_id: VisitId) -> Result<MedicalVisit, VisitWorkflowError> {
        self.run_in_transaction(VisitOperation::Realize, visit_id)
    }

    /// Transactional [`VisitWorkflowService::cancel`].
    pub fn cancel(&mut self, visit_id: VisitId) -> Result<MedicalVisit, VisitWorkflowError> {
        self.run_in_transaction(VisitOperation::Cancel, visit_id)
    }

    fn run_in_transaction(
        &mut self,
        operation: VisitOperation,
        visit_id: VisitId,
    ) -> Result<MedicalVisit, VisitWorkflowError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Dropping `tx` on the error path rolls back calendar writes too.
        let visit = workflow_over(&tx).run(operation, visit_id)?;
        tx.commit()?;
        Ok(visit)
    }
}

fn workflow_over(
    conn: &Connection,
) -> VisitWorkflowService<SqliteMedicalVisitRepository<'_>, SqliteCalendarEventRepository<'_>> {
    VisitWorkflowService::new(
        SqliteMedicalVisitRepository::new(conn),
        SqliteCalendarEventRepository::new(conn),
    )
}
