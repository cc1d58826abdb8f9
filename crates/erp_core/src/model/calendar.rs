//! Calendar event model.
//!
//! Events are time-blocked activities owned by one user. Other records only
//! hold a weak `CalendarEventId` reference to them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CalendarEventId = Uuid;
pub type UserId = Uuid;

/// Kind of calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Event,
    Meeting,
    Call,
    Leave,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Meeting => "meeting",
            Self::Call => "call",
            Self::Leave => "leave",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "event" => Some(Self::Event),
            "meeting" => Some(Self::Meeting),
            "call" => Some(Self::Call),
            "leave" => Some(Self::Leave),
            _ => None,
        }
    }
}

/// Calendar entry tied to one user over `[start_at, end_at)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uuid: CalendarEventId,
    pub user_id: UserId,
    pub kind: EventKind,
    pub subject: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub start_at: i64,
    /// Unix epoch milliseconds.
    pub end_at: i64,
}

impl CalendarEvent {
    /// Builds a new, not yet persisted event with a generated ID.
    pub fn new(
        start_at: i64,
        end_at: i64,
        user_id: UserId,
        description: impl Into<String>,
        kind: EventKind,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user_id,
            kind,
            subject: subject.into(),
            description: description.into(),
            start_at,
            end_at,
        }
    }
}
