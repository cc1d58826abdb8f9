//! Medical visit repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `MedicalVisit::validate()` before SQL mutations.
//! - A NULL `status` column loads as `status: None`; unknown codes are
//!   rejected as invalid data.

use crate::model::visit::{MedicalVisit, VisitId, VisitStatus};
use crate::repo::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const VISIT_SELECT_SQL: &str = "SELECT
    uuid,
    employee_name,
    user_uuid,
    visit_reason,
    subject,
    status,
    start_at,
    end_at,
    note,
    calendar_event_uuid
FROM medical_visits";

/// Query options for listing visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitListQuery {
    pub status: Option<VisitStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Persistence contract used by the visit workflow.
pub trait MedicalVisitRepository {
    fn create_visit(&self, visit: &MedicalVisit) -> RepoResult<VisitId>;
    fn find_visit(&self, id: VisitId) -> RepoResult<Option<MedicalVisit>>;
    /// Overwrites every mutable column of an existing visit.
    fn save_visit(&self, visit: &MedicalVisit) -> RepoResult<()>;
    /// Lists visits ordered by `start_at ASC, uuid ASC`.
    fn list_visits(&self, query: &VisitListQuery) -> RepoResult<Vec<MedicalVisit>>;
}

/// SQLite-backed visit repository.
///
/// Works on a plain connection or on a `Transaction`, which derefs to one.
pub struct SqliteMedicalVisitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMedicalVisitRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MedicalVisitRepository for SqliteMedicalVisitRepository<'_> {
    fn create_visit(&self, visit: &MedicalVisit) -> RepoResult<VisitId> {
        visit.validate()?;

        self.conn.execute(
            "INSERT INTO medical_visits (
                uuid,
                employee_name,
                user_uuid,
                visit_reason,
                subject,
                status,
                start_at,
                end_at,
                note,
                calendar_event_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                visit.uuid.to_string(),
                visit.employee_name.as_str(),
                visit.assigned_user.map(|id| id.to_string()),
                visit.visit_reason.as_deref(),
                visit.subject.as_deref(),
                visit.status.map(VisitStatus::as_str),
                visit.start_at,
                visit.end_at,
                visit.note.as_str(),
                visit.calendar_event_id.map(|id| id.to_string()),
            ],
        )?;

        Ok(visit.uuid)
    }

    fn find_visit(&self, id: VisitId) -> RepoResult<Option<MedicalVisit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VISIT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_visit_row(row)?));
        }

        Ok(None)
    }

    fn save_visit(&self, visit: &MedicalVisit) -> RepoResult<()> {
        visit.validate()?;

        let changed = self.conn.execute(
            "UPDATE medical_visits
             SET
                employee_name = ?1,
                user_uuid = ?2,
                visit_reason = ?3,
                subject = ?4,
                status = ?5,
                start_at = ?6,
                end_at = ?7,
                note = ?8,
                calendar_event_uuid = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                visit.employee_name.as_str(),
                visit.assigned_user.map(|id| id.to_string()),
                visit.visit_reason.as_deref(),
                visit.subject.as_deref(),
                visit.status.map(VisitStatus::as_str),
                visit.start_at,
                visit.end_at,
                visit.note.as_str(),
                visit.calendar_event_id.map(|id| id.to_string()),
                visit.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "medical visit",
                id: visit.uuid,
            });
        }

        Ok(())
    }

    fn list_visits(&self, query: &VisitListQuery) -> RepoResult<Vec<MedicalVisit>> {
        let mut sql = format!("{VISIT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY start_at ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut visits = Vec::new();
        while let Some(row) = rows.next()? {
            visits.push(parse_visit_row(row)?);
        }

        Ok(visits)
    }
}

fn parse_visit_row(row: &Row<'_>) -> RepoResult<MedicalVisit> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "medical_visits.uuid")?;

    let status = match row.get::<_, Option<String>>("status")? {
        Some(code) => Some(VisitStatus::parse(&code).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid visit status `{code}` in medical_visits.status"
            ))
        })?),
        None => None,
    };

    let visit = MedicalVisit {
        uuid,
        employee_name: row.get("employee_name")?,
        assigned_user: parse_optional_uuid(row.get("user_uuid")?, "medical_visits.user_uuid")?,
        visit_reason: row.get("visit_reason")?,
        subject: row.get("subject")?,
        status,
        start_at: row.get("start_at")?,
        end_at: row.get("end_at")?,
        note: row.get("note")?,
        calendar_event_id: parse_optional_uuid(
            row.get("calendar_event_uuid")?,
            "medical_visits.calendar_event_uuid",
        )?,
    };
    visit.validate()?;
    Ok(visit)
}
