//! Leave request lookups.

use crate::message::{ErrorCategory, LEAVE_REASON_NOT_FOUND};
use crate::model::leave::{LeaveDaysToDateRequest, LeaveReason, LeaveReasonId};
use crate::repo::leave_repo::LeaveReasonRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced while resolving a leave request.
#[derive(Debug)]
pub enum LeaveRequestError {
    LeaveReasonNotFound(LeaveReasonId),
    Repo(RepoError),
}

impl LeaveRequestError {
    /// Category for callers that map errors to user-facing severities.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::LeaveReasonNotFound(_) => Some(ErrorCategory::NoValue),
            Self::Repo(_) => None,
        }
    }

    /// Message key for callers that localize; `None` for technical failures.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            Self::LeaveReasonNotFound(_) => Some(LEAVE_REASON_NOT_FOUND),
            Self::Repo(_) => None,
        }
    }
}

impl Display for LeaveRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LeaveReasonNotFound(id) => write!(f, "leave reason not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LeaveRequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LeaveReasonNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for LeaveRequestError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Resolves the leave reason named by `request`.
///
/// Returns `Ok(None)` when the request names none (absent or nil ID).
pub fn fetch_leave_reason<R: LeaveReasonRepository>(
    request: &LeaveDaysToDateRequest,
    repo: &R,
) -> Result<Option<LeaveReason>, LeaveRequestError> {
    let Some(reason_id) = request.leave_reason_ref() else {
        return Ok(None);
    };

    repo.get_leave_reason(reason_id)?
        .map(Some)
        .ok_or(LeaveRequestError::LeaveReasonNotFound(reason_id))
}
