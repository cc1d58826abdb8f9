//! Leave reasons and the leave-days-to-date request payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LeaveReasonId = Uuid;

/// Unit in which a leave reason is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveUnit {
    #[default]
    Days,
    Hours,
}

impl LeaveUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Hours => "hours",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "days" => Some(Self::Days),
            "hours" => Some(Self::Hours),
            _ => None,
        }
    }
}

/// Kind of leave (paid leave, sick leave, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveReason {
    pub uuid: LeaveReasonId,
    pub name: String,
    pub unit: LeaveUnit,
    pub is_active: bool,
}

impl LeaveReason {
    pub fn new(name: impl Into<String>, unit: LeaveUnit) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            unit,
            is_active: true,
        }
    }
}

/// Request for the number of leave days available up to a date.
///
/// A missing or nil `leave_reason_id` means "no specific reason".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDaysToDateRequest {
    pub to_date: NaiveDate,
    #[serde(default)]
    pub leave_reason_id: Option<LeaveReasonId>,
}

impl LeaveDaysToDateRequest {
    /// Leave reason ID to look up, if the request names one.
    pub fn leave_reason_ref(&self) -> Option<LeaveReasonId> {
        self.leave_reason_id.filter(|id| !id.is_nil())
    }
}
