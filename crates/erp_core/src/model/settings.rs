//! Application feature switches.
//!
//! # Invariants
//! - Missing keys fall back to `AppSettings::default()` (all switches off).
//! - Key names are stable storage identifiers; renaming one is a migration.

use serde::{Deserialize, Serialize};

/// Storage key for [`AppSettings::manage_multi_banks`].
pub const MANAGE_MULTI_BANKS: &str = "base.manage_multi_banks";
/// Storage key for [`AppSettings::enable_status_management_by_task_category`].
pub const ENABLE_STATUS_MANAGEMENT_BY_TASK_CATEGORY: &str =
    "project.enable_status_management_by_task_category";
/// Storage key for [`AppSettings::select_auto_progress_on_project_task`].
pub const SELECT_AUTO_PROGRESS_ON_PROJECT_TASK: &str =
    "project.select_auto_progress_on_project_task";

/// Typed view over the `app_settings` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Companies may hold several active bank accounts.
    pub manage_multi_banks: bool,
    /// Task statuses may be configured per task category.
    pub enable_status_management_by_task_category: bool,
    /// Task progress follows the status progress configured per category.
    pub select_auto_progress_on_project_task: bool,
}

impl AppSettings {
    /// Applies one stored flag. Unknown keys are ignored and reported as `false`.
    pub fn apply_flag(&mut self, key: &str, value: bool) -> bool {
        match key {
            MANAGE_MULTI_BANKS => self.manage_multi_banks = value,
            ENABLE_STATUS_MANAGEMENT_BY_TASK_CATEGORY => {
                self.enable_status_management_by_task_category = value
            }
            SELECT_AUTO_PROGRESS_ON_PROJECT_TASK => {
                self.select_auto_progress_on_project_task = value
            }
            _ => return false,
        }
        true
    }
}
