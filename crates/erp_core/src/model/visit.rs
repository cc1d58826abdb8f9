//! Medical visit domain model.
//!
//! # Responsibility
//! - Define the visit record whose lifecycle the visit workflow governs.
//! - Compute the calendar subject used when a visit gets planned.
//!
//! # Invariants
//! - `end_at` is never earlier than `start_at`.
//! - `status == None` marks a record that never received a status; every
//!   workflow guard rejects it.
//! - `calendar_event_id` is a weak reference, the event is owned by the
//!   calendar store.

use crate::model::calendar::{CalendarEventId, UserId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type VisitId = Uuid;

const DEFAULT_SUBJECT_PREFIX: &str = "Medical visit";

/// Lifecycle state of a medical visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Created, not yet scheduled.
    Draft,
    /// Scheduled; may own a calendar event.
    Planned,
    /// Took place.
    Realized,
    /// Withdrawn after planning or realization.
    Canceled,
}

impl VisitStatus {
    /// Stable lowercase name, also used as storage code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Planned => "planned",
            Self::Realized => "realized",
            Self::Canceled => "canceled",
        }
    }

    /// Parses a storage code produced by [`VisitStatus::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "planned" => Some(Self::Planned),
            "realized" => Some(Self::Realized),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl Display for VisitStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for medical visit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitValidationError {
    EmptyEmployeeName,
    InvalidSchedule { start_at: i64, end_at: i64 },
}

impl Display for VisitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmployeeName => write!(f, "medical visit employee name must not be blank"),
            Self::InvalidSchedule { start_at, end_at } => write!(
                f,
                "medical visit end ({end_at}) must not be earlier than start ({start_at})"
            ),
        }
    }
}

impl Error for VisitValidationError {}

/// Appointment of an employee with occupational health services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalVisit {
    pub uuid: VisitId,
    /// Display name of the employee the visit is for.
    pub employee_name: String,
    /// User account of the employee. No calendar event is created without one.
    pub assigned_user: Option<UserId>,
    pub visit_reason: Option<String>,
    /// Explicit calendar subject. Derived from reason and employee when unset.
    pub subject: Option<String>,
    pub status: Option<VisitStatus>,
    /// Unix epoch milliseconds.
    pub start_at: i64,
    /// Unix epoch milliseconds, exclusive end of the scheduled interval.
    pub end_at: i64,
    pub note: String,
    pub calendar_event_id: Option<CalendarEventId>,
}

impl MedicalVisit {
    /// Creates a draft visit for one employee over `[start_at, end_at)`.
    pub fn new(employee_name: impl Into<String>, start_at: i64, end_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            employee_name: employee_name.into(),
            assigned_user: None,
            visit_reason: None,
            subject: None,
            status: Some(VisitStatus::Draft),
            start_at,
            end_at,
            note: String::new(),
            calendar_event_id: None,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), VisitValidationError> {
        if self.employee_name.trim().is_empty() {
            return Err(VisitValidationError::EmptyEmployeeName);
        }
        if self.end_at < self.start_at {
            return Err(VisitValidationError::InvalidSchedule {
                start_at: self.start_at,
                end_at: self.end_at,
            });
        }
        Ok(())
    }

    /// Subject shown on the calendar event created for this visit.
    ///
    /// Rules:
    /// - a non-blank explicit `subject` wins;
    /// - otherwise `"<reason> - <employee>"` when a reason is set;
    /// - otherwise `"Medical visit - <employee>"`.
    pub fn calendar_subject(&self) -> String {
        if let Some(subject) = non_blank(self.subject.as_deref()) {
            return subject.to_string();
        }

        let employee = self.employee_name.trim();
        match non_blank(self.visit_reason.as_deref()) {
            Some(reason) => format!("{reason} - {employee}"),
            None => format!("{DEFAULT_SUBJECT_PREFIX} - {employee}"),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
