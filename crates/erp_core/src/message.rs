//! Error categories and user-facing message keys.
//!
//! Message keys are the English source strings. Callers that localize look
//! them up in their own catalog; callers that don't can show them as-is.

use std::fmt::{Display, Formatter};

/// Only a draft visit can be planned.
pub const MEDICAL_VISIT_PLAN_WRONG_STATUS: &str = "Only a draft medical visit can be planned.";
/// Only a planned visit can be realized.
pub const MEDICAL_VISIT_REALIZE_WRONG_STATUS: &str =
    "Only a planned medical visit can be realized.";
/// Only a planned or realized visit can be canceled.
pub const MEDICAL_VISIT_CANCEL_WRONG_STATUS: &str =
    "Only a planned or realized medical visit can be canceled.";
pub const MEDICAL_VISIT_NOT_FOUND: &str = "The medical visit does not exist.";
pub const LEAVE_REASON_NOT_FOUND: &str = "The leave reason does not exist.";
pub const CATEGORY_COMPLETED_TASK_STATUS_MISSING_WITHOUT_DEFAULT_STATUS: &str =
    "The task category has no completed status, the task cannot be closed automatically.";
pub const PROJECT_COMPLETED_TASK_STATUS_MISSING_WITHOUT_DEFAULT_STATUS: &str =
    "The project has no completed status, the task cannot be closed automatically.";

/// Coarse classification attached to domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A required field is empty.
    MissingField,
    /// A referenced record does not exist.
    NoValue,
    /// Application settings prevent the operation.
    ConfigurationError,
    /// The record is in a state that does not allow the operation.
    Inconsistency,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::NoValue => "no_value",
            Self::ConfigurationError => "configuration_error",
            Self::Inconsistency => "inconsistency",
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
