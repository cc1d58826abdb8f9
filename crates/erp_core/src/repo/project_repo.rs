//! Project / task-status repository and SQLite implementation.
//!
//! # Invariants
//! - Status sets load in name order.
//! - `update_progress` rewrites the requested rows in one transaction and
//!   never touches a customized row.
//! - Statuses referenced by categories and projects must be created first.

use crate::model::project::{
    ProgressByCategoryId, Project, ProjectId, ProjectTask, ProjectTaskId, TaskCategory,
    TaskCategoryId, TaskStatus, TaskStatusId, TaskStatusManagement, TaskStatusProgressByCategory,
};
use crate::repo::{bool_to_int, parse_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

pub trait ProjectRepository {
    fn create_task_status(&self, status: &TaskStatus) -> RepoResult<TaskStatusId>;
    fn create_category(&self, category: &TaskCategory) -> RepoResult<TaskCategoryId>;
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn create_task(&self, task: &ProjectTask) -> RepoResult<ProjectTaskId>;
    fn create_progress_by_category(
        &self,
        progress: &TaskStatusProgressByCategory,
    ) -> RepoResult<ProgressByCategoryId>;
    fn get_task_status(&self, id: TaskStatusId) -> RepoResult<Option<TaskStatus>>;
    fn get_category(&self, id: TaskCategoryId) -> RepoResult<Option<TaskCategory>>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn get_task(&self, id: ProjectTaskId) -> RepoResult<Option<ProjectTask>>;
    /// Lists progress rows for one status that were never edited by hand.
    fn list_uncustomized_progress(
        &self,
        task_status_id: TaskStatusId,
    ) -> RepoResult<Vec<TaskStatusProgressByCategory>>;
    /// Sets `progress` on the listed rows that are still uncustomized, in
    /// one transaction. Returns the number of rows changed; customized or
    /// missing rows are skipped.
    fn update_progress(&self, ids: &[ProgressByCategoryId], progress: u8) -> RepoResult<usize>;
}

/// SQLite-backed project repository.
///
/// `update_progress` opens its own transaction, so the connection must not
/// already be inside one.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_task_status(&self, status: &TaskStatus) -> RepoResult<TaskStatusId> {
        self.conn.execute(
            "INSERT INTO task_statuses (uuid, name, default_progress) VALUES (?1, ?2, ?3);",
            params![
                status.uuid.to_string(),
                status.name.as_str(),
                i64::from(status.default_progress)
            ],
        )?;
        Ok(status.uuid)
    }

    fn create_category(&self, category: &TaskCategory) -> RepoResult<TaskCategoryId> {
        self.conn.execute(
            "INSERT INTO task_categories (uuid, name, completed_task_status_uuid)
             VALUES (?1, ?2, ?3);",
            params![
                category.uuid.to_string(),
                category.name.as_str(),
                category
                    .completed_task_status
                    .as_ref()
                    .map(|status| status.uuid.to_string()),
            ],
        )?;
        for status in &category.task_statuses {
            self.conn.execute(
                "INSERT OR IGNORE INTO task_category_statuses (category_uuid, task_status_uuid)
                 VALUES (?1, ?2);",
                params![category.uuid.to_string(), status.uuid.to_string()],
            )?;
        }
        Ok(category.uuid)
    }

    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        self.conn.execute(
            "INSERT INTO projects (uuid, name, task_status_management, completed_task_status_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project.uuid.to_string(),
                project.name.as_str(),
                project.task_status_management.as_str(),
                project
                    .completed_task_status
                    .as_ref()
                    .map(|status| status.uuid.to_string()),
            ],
        )?;
        for status in &project.task_statuses {
            self.conn.execute(
                "INSERT OR IGNORE INTO project_task_statuses (project_uuid, task_status_uuid)
                 VALUES (?1, ?2);",
                params![project.uuid.to_string(), status.uuid.to_string()],
            )?;
        }
        Ok(project.uuid)
    }

    fn create_task(&self, task: &ProjectTask) -> RepoResult<ProjectTaskId> {
        self.conn.execute(
            "INSERT INTO project_tasks (uuid, project_uuid, name, category_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task.uuid.to_string(),
                task.project_id.to_string(),
                task.name.as_str(),
                task.category.as_ref().map(|category| category.uuid.to_string()),
            ],
        )?;
        Ok(task.uuid)
    }

    fn create_progress_by_category(
        &self,
        progress: &TaskStatusProgressByCategory,
    ) -> RepoResult<ProgressByCategoryId> {
        self.conn.execute(
            "INSERT INTO task_status_progress_by_category (
                uuid,
                category_uuid,
                task_status_uuid,
                progress,
                is_customized
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                progress.uuid.to_string(),
                progress.category_id.to_string(),
                progress.task_status_id.to_string(),
                i64::from(progress.progress),
                bool_to_int(progress.is_customized),
            ],
        )?;
        Ok(progress.uuid)
    }

    fn get_task_status(&self, id: TaskStatusId) -> RepoResult<Option<TaskStatus>> {
        load_task_status(self.conn, &id.to_string())
    }

    fn get_category(&self, id: TaskCategoryId) -> RepoResult<Option<TaskCategory>> {
        load_category(self.conn, &id.to_string())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let header = self
            .conn
            .query_row(
                "SELECT uuid, name, task_status_management, completed_task_status_uuid
                 FROM projects
                 WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("task_status_management")?,
                        row.get::<_, Option<String>>("completed_task_status_uuid")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid_text, name, management_text, completed_text)) = header else {
            return Ok(None);
        };

        let task_status_management =
            TaskStatusManagement::parse(&management_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid task status management `{management_text}` in projects.task_status_management"
                ))
            })?;

        Ok(Some(Project {
            uuid: parse_uuid(&uuid_text, "projects.uuid")?,
            name,
            task_status_management,
            completed_task_status: load_optional_status(self.conn, completed_text)?,
            task_statuses: load_status_set(
                self.conn,
                "SELECT s.uuid, s.name, s.default_progress
                 FROM project_task_statuses ps
                 INNER JOIN task_statuses s ON s.uuid = ps.task_status_uuid
                 WHERE ps.project_uuid = ?1
                 ORDER BY s.name ASC, s.uuid ASC;",
                &uuid_text,
            )?,
        }))
    }

    fn get_task(&self, id: ProjectTaskId) -> RepoResult<Option<ProjectTask>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, project_uuid, name, category_uuid
                 FROM project_tasks
                 WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("project_uuid")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, Option<String>>("category_uuid")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid_text, project_text, name, category_text)) = row else {
            return Ok(None);
        };

        let category = match category_text {
            Some(category_uuid) => load_category(self.conn, &category_uuid)?,
            None => None,
        };

        Ok(Some(ProjectTask {
            uuid: parse_uuid(&uuid_text, "project_tasks.uuid")?,
            project_id: parse_uuid(&project_text, "project_tasks.project_uuid")?,
            name,
            category,
        }))
    }

    fn list_uncustomized_progress(
        &self,
        task_status_id: TaskStatusId,
    ) -> RepoResult<Vec<TaskStatusProgressByCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, category_uuid, task_status_uuid, progress, is_customized
             FROM task_status_progress_by_category
             WHERE task_status_uuid = ?1
               AND is_customized = 0
             ORDER BY uuid ASC;",
        )?;
        let mut rows = stmt.query([task_status_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let category_text: String = row.get("category_uuid")?;
            let status_text: String = row.get("task_status_uuid")?;
            items.push(TaskStatusProgressByCategory {
                uuid: parse_uuid(&uuid_text, "task_status_progress_by_category.uuid")?,
                category_id: parse_uuid(
                    &category_text,
                    "task_status_progress_by_category.category_uuid",
                )?,
                task_status_id: parse_uuid(
                    &status_text,
                    "task_status_progress_by_category.task_status_uuid",
                )?,
                progress: parse_percentage(
                    row.get("progress")?,
                    "task_status_progress_by_category.progress",
                )?,
                is_customized: parse_bool(
                    row.get("is_customized")?,
                    "task_status_progress_by_category.is_customized",
                )?,
            });
        }
        Ok(items)
    }

    fn update_progress(&self, ids: &[ProgressByCategoryId], progress: u8) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut updated = 0;
        for id in ids {
            // Rows customized since they were listed are left alone.
            updated += tx.execute(
                "UPDATE task_status_progress_by_category
                 SET progress = ?1
                 WHERE uuid = ?2 AND is_customized = 0;",
                params![i64::from(progress), id.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(updated)
    }
}

fn load_task_status(conn: &Connection, uuid: &str) -> RepoResult<Option<TaskStatus>> {
    let row = conn
        .query_row(
            "SELECT uuid, name, default_progress FROM task_statuses WHERE uuid = ?1;",
            [uuid],
            |row| {
                Ok((
                    row.get::<_, String>("uuid")?,
                    row.get::<_, String>("name")?,
                    row.get::<_, i64>("default_progress")?,
                ))
            },
        )
        .optional()?;

    row.map(|(uuid_text, name, progress)| build_task_status(&uuid_text, name, progress))
        .transpose()
}

fn load_optional_status(conn: &Connection, uuid: Option<String>) -> RepoResult<Option<TaskStatus>> {
    match uuid {
        Some(uuid) => load_task_status(conn, &uuid),
        None => Ok(None),
    }
}

fn load_category(conn: &Connection, uuid: &str) -> RepoResult<Option<TaskCategory>> {
    let row = conn
        .query_row(
            "SELECT uuid, name, completed_task_status_uuid FROM task_categories WHERE uuid = ?1;",
            [uuid],
            |row| {
                Ok((
                    row.get::<_, String>("uuid")?,
                    row.get::<_, String>("name")?,
                    row.get::<_, Option<String>>("completed_task_status_uuid")?,
                ))
            },
        )
        .optional()?;

    let Some((uuid_text, name, completed_text)) = row else {
        return Ok(None);
    };

    Ok(Some(TaskCategory {
        uuid: parse_uuid(&uuid_text, "task_categories.uuid")?,
        name,
        completed_task_status: load_optional_status(conn, completed_text)?,
        task_statuses: load_status_set(
            conn,
            "SELECT s.uuid, s.name, s.default_progress
             FROM task_category_statuses cs
             INNER JOIN task_statuses s ON s.uuid = cs.task_status_uuid
             WHERE cs.category_uuid = ?1
             ORDER BY s.name ASC, s.uuid ASC;",
            &uuid_text,
        )?,
    }))
}

fn load_status_set(conn: &Connection, sql: &str, owner_uuid: &str) -> RepoResult<Vec<TaskStatus>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([owner_uuid])?;
    let mut statuses = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get(0)?;
        statuses.push(build_task_status(&uuid_text, row.get(1)?, row.get(2)?)?);
    }
    Ok(statuses)
}

fn build_task_status(uuid_text: &str, name: String, progress: i64) -> RepoResult<TaskStatus> {
    Ok(TaskStatus {
        uuid: parse_uuid(uuid_text, "task_statuses.uuid")?,
        name,
        default_progress: parse_percentage(progress, "task_statuses.default_progress")?,
    })
}

fn parse_percentage(value: i64, column: &str) -> RepoResult<u8> {
    u8::try_from(value)
        .ok()
        .filter(|value| *value <= 100)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid percentage `{value}` in {column}")))
}

