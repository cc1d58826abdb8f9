//! Task status resolution for projects.
//!
//! # Responsibility
//! - Resolve the completed status and the status set a task may use,
//!   depending on the project mode and the category switch in settings.
//! - Propagate a status default progress to per-category progress rows.
//!
//! # Invariants
//! - Category-level configuration is only consulted when
//!   `enable_status_management_by_task_category` is on and the project
//!   mode is `Category`.
//! - Customized progress rows are never overwritten.

use crate::message::{
    CATEGORY_COMPLETED_TASK_STATUS_MISSING_WITHOUT_DEFAULT_STATUS,
    PROJECT_COMPLETED_TASK_STATUS_MISSING_WITHOUT_DEFAULT_STATUS,
};
use crate::model::project::{
    Project, ProjectTask, TaskCategory, TaskStatus, TaskStatusManagement,
    TaskStatusProgressByCategory,
};
use crate::model::settings::AppSettings;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoResult;
use log::info;

/// Category whose configuration applies to `task`, if category management is active.
fn managed_category<'a>(
    settings: &AppSettings,
    project: &Project,
    task: &'a ProjectTask,
) -> Option<&'a TaskCategory> {
    if settings.enable_status_management_by_task_category
        && project.task_status_management == TaskStatusManagement::Category
    {
        task.category.as_ref()
    } else {
        None
    }
}

/// Status a task moves to when it is completed.
pub fn completed_task_status(
    settings: &AppSettings,
    project: &Project,
    task: &ProjectTask,
) -> Option<TaskStatus> {
    if project.task_status_management == TaskStatusManagement::None {
        return None;
    }

    if let Some(status) = managed_category(settings, project, task)
        .and_then(|category| category.completed_task_status.as_ref())
    {
        return Some(status.clone());
    }

    match project.task_status_management {
        TaskStatusManagement::Project | TaskStatusManagement::Category => {
            project.completed_task_status.clone()
        }
        TaskStatusManagement::None => None,
    }
}

/// Statuses a task may take. `None` means status management does not apply.
///
/// A project in `Category` mode without the category switch yields `None`.
pub fn task_status_set(
    settings: &AppSettings,
    project: &Project,
    task: &ProjectTask,
) -> Option<Vec<TaskStatus>> {
    if project.task_status_management == TaskStatusManagement::None {
        return None;
    }

    if let Some(category) = managed_category(settings, project, task) {
        return Some(category.task_statuses.clone());
    }

    if project.task_status_management == TaskStatusManagement::Project {
        return Some(project.task_statuses.clone());
    }

    None
}

/// Message key warning that no completed status is configured, if so.
pub fn check_completed_task_status(
    settings: &AppSettings,
    project: &Project,
    task: &ProjectTask,
) -> Option<&'static str> {
    if project.task_status_management == TaskStatusManagement::None {
        return None;
    }

    if managed_category(settings, project, task)
        .is_some_and(|category| category.completed_task_status.is_none())
    {
        return Some(CATEGORY_COMPLETED_TASK_STATUS_MISSING_WITHOUT_DEFAULT_STATUS);
    }

    if project.task_status_management == TaskStatusManagement::Project
        && project.completed_task_status.is_none()
    {
        return Some(PROJECT_COMPLETED_TASK_STATUS_MISSING_WITHOUT_DEFAULT_STATUS);
    }

    None
}

/// Task status resolution with settings read from storage.
pub struct TaskStatusService<P: ProjectRepository, S: SettingsRepository> {
    projects: P,
    settings: S,
}

impl<P: ProjectRepository, S: SettingsRepository> TaskStatusService<P, S> {
    /// Creates a service using the provided repository implementations.
    pub fn new(projects: P, settings: S) -> Self {
        Self { projects, settings }
    }

    /// See [`completed_task_status`].
    pub fn completed_task_status(
        &self,
        project: &Project,
        task: &ProjectTask,
    ) -> RepoResult<Option<TaskStatus>> {
        let settings = self.settings.load_settings()?;
        Ok(completed_task_status(&settings, project, task))
    }

    /// See [`task_status_set`].
    pub fn task_status_set(
        &self,
        project: &Project,
        task: &ProjectTask,
    ) -> RepoResult<Option<Vec<TaskStatus>>> {
        let settings = self.settings.load_settings()?;
        Ok(task_status_set(&settings, project, task))
    }

    /// See [`check_completed_task_status`].
    pub fn check_completed_task_status(
        &self,
        project: &Project,
        task: &ProjectTask,
    ) -> RepoResult<Option<&'static str>> {
        let settings = self.settings.load_settings()?;
        Ok(check_completed_task_status(&settings, project, task))
    }

    /// Progress rows that follow `task_status` default progress.
    ///
    /// Empty unless both category management and automatic progress are
    /// enabled, or when the status is not stored.
    pub fn unmodified_progress_by_category(
        &self,
        task_status: &TaskStatus,
    ) -> RepoResult<Vec<TaskStatusProgressByCategory>> {
        let settings = self.settings.load_settings()?;
        if !settings.enable_status_management_by_task_category
            || !settings.select_auto_progress_on_project_task
        {
            return Ok(Vec::new());
        }

        let Some(stored) = self.projects.get_task_status(task_status.uuid)? else {
            return Ok(Vec::new());
        };
        self.projects.list_uncustomized_progress(stored.uuid)
    }

    /// Copies `task_status.default_progress` onto its uncustomized rows.
    ///
    /// Returns the number of rows updated. A row customized after it was
    /// listed is skipped.
    pub fn update_existing_progress_on_category(
        &self,
        task_status: &TaskStatus,
    ) -> RepoResult<usize> {
        let rows = self.unmodified_progress_by_category(task_status)?;
        if rows.is_empty() {
            return Ok(0);
        }

        let ids: Vec<_> = rows.iter().map(|row| row.uuid).collect();
        let updated = self
            .projects
            .update_progress(&ids, task_status.default_progress)?;
        info!(
            "event=progress_update module=project status=ok task_status={} rows={} skipped={} progress={}",
            task_status.uuid,
            updated,
            ids.len() - updated,
            task_status.default_progress
        );
        Ok(updated)
    }
}
