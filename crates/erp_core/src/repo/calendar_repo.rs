//! Calendar event repository contract and SQLite implementation.
//!
//! # Invariants
//! - `remove_event` on a missing event is an error, never a silent no-op.
//! - Removing an event clears weak references held by medical visits
//!   (`ON DELETE SET NULL`).

use crate::model::calendar::{CalendarEvent, CalendarEventId, EventKind, UserId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    kind,
    subject,
    description,
    start_at,
    end_at
FROM calendar_events";

/// Calendar store used for time-blocking side effects.
pub trait CalendarEventRepository {
    /// Persists a new event and returns its reference.
    fn create_event(&self, event: &CalendarEvent) -> RepoResult<CalendarEventId>;
    fn get_event(&self, id: CalendarEventId) -> RepoResult<Option<CalendarEvent>>;
    fn remove_event(&self, id: CalendarEventId) -> RepoResult<()>;
    /// Lists one user's events ordered by `start_at ASC, uuid ASC`.
    fn list_events_for_user(&self, user_id: UserId) -> RepoResult<Vec<CalendarEvent>>;
}

/// SQLite-backed calendar repository.
pub struct SqliteCalendarEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCalendarEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CalendarEventRepository for SqliteCalendarEventRepository<'_> {
    fn create_event(&self, event: &CalendarEvent) -> RepoResult<CalendarEventId> {
        if event.end_at < event.start_at {
            return Err(RepoError::InvalidData(format!(
                "calendar event end ({}) is earlier than start ({})",
                event.end_at, event.start_at
            )));
        }

        self.conn.execute(
            "INSERT INTO calendar_events (
                uuid,
                user_uuid,
                kind,
                subject,
                description,
                start_at,
                end_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                event.uuid.to_string(),
                event.user_id.to_string(),
                event.kind.as_str(),
                event.subject.as_str(),
                event.description.as_str(),
                event.start_at,
                event.end_at,
            ],
        )?;

        Ok(event.uuid)
    }

    fn get_event(&self, id: CalendarEventId) -> RepoResult<Option<CalendarEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn remove_event(&self, id: CalendarEventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM calendar_events WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "calendar event",
                id,
            });
        }

        Ok(())
    }

    fn list_events_for_user(&self, user_id: UserId) -> RepoResult<Vec<CalendarEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL} WHERE user_uuid = ?1 ORDER BY start_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<CalendarEvent> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let kind_text: String = row.get("kind")?;
    let kind = EventKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid event kind `{kind_text}` in calendar_events.kind"
        ))
    })?;

    Ok(CalendarEvent {
        uuid: parse_uuid(&uuid_text, "calendar_events.uuid")?,
        user_id: parse_uuid(&user_text, "calendar_events.user_uuid")?,
        kind,
        subject: row.get("subject")?,
        description: row.get("description")?,
        start_at: row.get("start_at")?,
        end_at: row.get("end_at")?,
    })
}
