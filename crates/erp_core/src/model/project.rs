//! Project, task and task-status records.
//!
//! # Invariants
//! - `TaskStatus::default_progress` is a percentage in `0..=100`.
//! - Status sets are kept in storage order and hold each status once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;
pub type ProjectTaskId = Uuid;
pub type TaskCategoryId = Uuid;
pub type TaskStatusId = Uuid;
pub type ProgressByCategoryId = Uuid;

/// Where a project takes the statuses its tasks can move through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatusManagement {
    /// Tasks carry no managed status.
    #[default]
    None,
    /// Statuses configured on the project.
    Project,
    /// Statuses configured per task category, project as fallback.
    Category,
}

impl TaskStatusManagement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Project => "project",
            Self::Category => "category",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "project" => Some(Self::Project),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// A step of the task lifecycle (e.g. "New", "In progress", "Done").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskStatus {
    pub uuid: TaskStatusId,
    pub name: String,
    pub default_progress: u8,
}

impl TaskStatus {
    pub fn new(name: impl Into<String>, default_progress: u8) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            default_progress,
        }
    }
}

/// Task category with its own status set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCategory {
    pub uuid: TaskCategoryId,
    pub name: String,
    pub completed_task_status: Option<TaskStatus>,
    pub task_statuses: Vec<TaskStatus>,
}

impl TaskCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            completed_task_status: None,
            task_statuses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub uuid: ProjectId,
    pub name: String,
    pub task_status_management: TaskStatusManagement,
    pub completed_task_status: Option<TaskStatus>,
    pub task_statuses: Vec<TaskStatus>,
}

impl Project {
    pub fn new(name: impl Into<String>, task_status_management: TaskStatusManagement) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            task_status_management,
            completed_task_status: None,
            task_statuses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTask {
    pub uuid: ProjectTaskId,
    pub project_id: ProjectId,
    pub name: String,
    pub category: Option<TaskCategory>,
}

impl ProjectTask {
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            project_id,
            name: name.into(),
            category: None,
        }
    }
}

/// Progress applied to tasks of one category when they reach one status.
///
/// `is_customized` rows were edited by hand and are left alone when the
/// status default progress changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusProgressByCategory {
    pub uuid: ProgressByCategoryId,
    pub category_id: TaskCategoryId,
    pub task_status_id: TaskStatusId,
    pub progress: u8,
    pub is_customized: bool,
}
