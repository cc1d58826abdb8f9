//! Leave reason repository.

use crate::model::leave::{LeaveReason, LeaveReasonId, LeaveUnit};
use crate::repo::{bool_to_int, parse_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait LeaveReasonRepository {
    fn create_leave_reason(&self, reason: &LeaveReason) -> RepoResult<LeaveReasonId>;
    fn get_leave_reason(&self, id: LeaveReasonId) -> RepoResult<Option<LeaveReason>>;
}

pub struct SqliteLeaveReasonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLeaveReasonRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LeaveReasonRepository for SqliteLeaveReasonRepository<'_> {
    fn create_leave_reason(&self, reason: &LeaveReason) -> RepoResult<LeaveReasonId> {
        self.conn.execute(
            "INSERT INTO leave_reasons (uuid, name, unit, is_active) VALUES (?1, ?2, ?3, ?4);",
            params![
                reason.uuid.to_string(),
                reason.name.as_str(),
                reason.unit.as_str(),
                bool_to_int(reason.is_active),
            ],
        )?;
        Ok(reason.uuid)
    }

    fn get_leave_reason(&self, id: LeaveReasonId) -> RepoResult<Option<LeaveReason>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, name, unit, is_active FROM leave_reasons WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("unit")?,
                        row.get::<_, i64>("is_active")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid_text, name, unit_text, is_active)) = row else {
            return Ok(None);
        };

        let unit = LeaveUnit::parse(&unit_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid leave unit `{unit_text}` in leave_reasons.unit"))
        })?;

        Ok(Some(LeaveReason {
            uuid: parse_uuid(&uuid_text, "leave_reasons.uuid")?,
            name,
            unit,
            is_active: parse_bool(is_active, "leave_reasons.is_active")?,
        }))
    }
}
