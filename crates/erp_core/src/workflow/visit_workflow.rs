//! Medical visit lifecycle.
//!
//! ```text
//! Draft --plan--> Planned --realize--> Realized
//!                    |                    |
//!                    +------cancel--------+--> Canceled
//! ```
//!
//! # Invariants
//! - Guards run before anything is copied or changed.
//! - `plan` emits exactly one `CreateEvent` iff the visit has an assigned user.
//! - `cancel` emits `RemoveEvent` only for an existing link and always
//!   clears the link.
//! - `realize` emits nothing and keeps the link as-is.

use crate::message::{
    ErrorCategory, MEDICAL_VISIT_CANCEL_WRONG_STATUS, MEDICAL_VISIT_PLAN_WRONG_STATUS,
    MEDICAL_VISIT_REALIZE_WRONG_STATUS,
};
use crate::model::calendar::{CalendarEvent, CalendarEventId, EventKind};
use crate::model::visit::{MedicalVisit, VisitStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Operation requested on a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitOperation {
    Plan,
    Realize,
    Cancel,
}

impl VisitOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Realize => "realize",
            Self::Cancel => "cancel",
        }
    }

    /// Whether a visit in `status` may undergo this operation.
    pub fn accepts(self, status: Option<VisitStatus>) -> bool {
        matches!(
            (self, status),
            (Self::Plan, Some(VisitStatus::Draft))
                | (Self::Realize, Some(VisitStatus::Planned))
                | (
                    Self::Cancel,
                    Some(VisitStatus::Planned | VisitStatus::Realized)
                )
        )
    }

    /// Status a visit ends up in after this operation.
    pub fn target(self) -> VisitStatus {
        match self {
            Self::Plan => VisitStatus::Planned,
            Self::Realize => VisitStatus::Realized,
            Self::Cancel => VisitStatus::Canceled,
        }
    }

    pub fn wrong_status_message(self) -> &'static str {
        match self {
            Self::Plan => MEDICAL_VISIT_PLAN_WRONG_STATUS,
            Self::Realize => MEDICAL_VISIT_REALIZE_WRONG_STATUS,
            Self::Cancel => MEDICAL_VISIT_CANCEL_WRONG_STATUS,
        }
    }
}

impl Display for VisitOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations available from `status`, in lifecycle order.
pub fn allowed_operations(status: Option<VisitStatus>) -> Vec<VisitOperation> {
    [
        VisitOperation::Plan,
        VisitOperation::Realize,
        VisitOperation::Cancel,
    ]
    .into_iter()
    .filter(|operation| operation.accepts(status))
    .collect()
}

/// Calendar side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarEffect {
    /// Persist this event and link it to the visit.
    CreateEvent(CalendarEvent),
    /// Delete this previously linked event.
    RemoveEvent(CalendarEventId),
}

/// Accepted transition: the updated visit plus the effects to apply with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitTransition {
    pub operation: VisitOperation,
    pub visit: MedicalVisit,
    pub effects: Vec<CalendarEffect>,
}

/// Guard failure: the visit status does not allow the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStateTransition {
    pub operation: VisitOperation,
    pub current: Option<VisitStatus>,
}

impl InvalidStateTransition {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Inconsistency
    }

    pub fn message_key(&self) -> &'static str {
        self.operation.wrong_status_message()
    }
}

impl Display for InvalidStateTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let current = self.current.map_or("unset", VisitStatus::as_str);
        write!(
            f,
            "{} (operation={}, current_status={current})",
            self.message_key(),
            self.operation
        )
    }
}

impl Error for InvalidStateTransition {}

/// Runs `operation` against `visit`.
pub fn transition(
    operation: VisitOperation,
    visit: &MedicalVisit,
) -> Result<VisitTransition, InvalidStateTransition> {
    match operation {
        VisitOperation::Plan => plan(visit),
        VisitOperation::Realize => realize(visit),
        VisitOperation::Cancel => cancel(visit),
    }
}

/// Draft -> Planned, requesting a calendar event for the assigned user.
pub fn plan(visit: &MedicalVisit) -> Result<VisitTransition, InvalidStateTransition> {
    let mut next = guarded(VisitOperation::Plan, visit)?;

    let mut effects = Vec::new();
    if let Some(user_id) = next.assigned_user {
        effects.push(CalendarEffect::CreateEvent(CalendarEvent::new(
            next.start_at,
            next.end_at,
            user_id,
            next.note.clone(),
            EventKind::Event,
            next.calendar_subject(),
        )));
    }
    next.status = Some(VisitOperation::Plan.target());

    Ok(VisitTransition {
        operation: VisitOperation::Plan,
        visit: next,
        effects,
    })
}

/// Planned -> Realized. The calendar event created by `plan` stays.
pub fn realize(visit: &MedicalVisit) -> Result<VisitTransition, InvalidStateTransition> {
    let mut next = guarded(VisitOperation::Realize, visit)?;
    next.status = Some(VisitOperation::Realize.target());

    Ok(VisitTransition {
        operation: VisitOperation::Realize,
        visit: next,
        effects: Vec::new(),
    })
}

/// Planned | Realized -> Canceled, dropping the linked calendar event.
pub fn cancel(visit: &MedicalVisit) -> Result<VisitTransition, InvalidStateTransition> {
    let mut next = guarded(VisitOperation::Cancel, visit)?;
    next.status = Some(VisitOperation::Cancel.target());

    let effects = next
        .calendar_event_id
        .take()
        .map(CalendarEffect::RemoveEvent)
        .into_iter()
        .collect();

    Ok(VisitTransition {
        operation: VisitOperation::Cancel,
        visit: next,
        effects,
    })
}

fn guarded(
    operation: VisitOperation,
    visit: &MedicalVisit,
) -> Result<MedicalVisit, InvalidStateTransition> {
    if !operation.accepts(visit.status) {
        return Err(InvalidStateTransition {
            operation,
            current: visit.status,
        });
    }
    Ok(visit.clone())
}

#[cfg(test)]
mod tests {
    use super::{
        allowed_operations, cancel, plan, realize, transition, CalendarEffect,
        InvalidStateTransition, VisitOperation,
    };
    use crate::message::{ErrorCategory, MEDICAL_VISIT_CANCEL_WRONG_STATUS};
    use crate::model::calendar::EventKind;
    use crate::model::visit::{MedicalVisit, VisitStatus};
    use uuid::Uuid;

    const ALL_STATUSES: [Option<VisitStatus>; 5] = [
        None,
        Some(VisitStatus::Draft),
        Some(VisitStatus::Planned),
        Some(VisitStatus::Realized),
        Some(VisitStatus::Canceled),
    ];

    fn visit_with(status: Option<VisitStatus>) -> MedicalVisit {
        let mut visit = MedicalVisit::new("Grace Hopper", 1_000, 4_600_000);
        visit.status = status;
        visit
    }

    #[test]
    fn plan_with_user_requests_one_event_over_schedule() {
        let user = Uuid::new_v4();
        let mut visit = visit_with(Some(VisitStatus::Draft));
        visit.assigned_user = Some(user);
        visit.note = "bring vaccination record".to_string();

        let transition = plan(&visit).expect("draft visit should plan");
        assert_eq!(transition.visit.status, Some(VisitStatus::Planned));
        assert_eq!(transition.effects.len(), 1);
        match &transition.effects[0] {
            CalendarEffect::CreateEvent(event) => {
                assert_eq!(event.user_id, user);
                assert_eq!(event.start_at, 1_000);
                assert_eq!(event.end_at, 4_600_000);
                assert_eq!(event.kind, EventKind::Event);
                assert_eq!(event.description, "bring vaccination record");
                assert_eq!(event.subject, "Medical visit - Grace Hopper");
            }
            other => panic!("unexpected effect: {other:?}"),
        }
        assert!(transition.visit.calendar_event_id.is_none());
    }

    #[test]
    fn plan_without_user_requests_nothing() {
        let transition = plan(&visit_with(Some(VisitStatus::Draft))).unwrap();
        assert_eq!(transition.visit.status, Some(VisitStatus::Planned));
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn plan_rejects_every_non_draft_status() {
        for status in ALL_STATUSES
            .into_iter()
            .filter(|status| *status != Some(VisitStatus::Draft))
        {
            let visit = visit_with(status);
            let err = plan(&visit).unwrap_err();
            assert_eq!(
                err,
                InvalidStateTransition {
                    operation: VisitOperation::Plan,
                    current: status,
                }
            );
            assert_eq!(visit.status, status);
        }
    }

    #[test]
    fn plan_twice_fails_the_second_time() {
        let first = plan(&visit_with(Some(VisitStatus::Draft))).unwrap();
        let err = plan(&first.visit).unwrap_err();
        assert_eq!(err.current, Some(VisitStatus::Planned));
    }

    #[test]
    fn realize_keeps_calendar_link() {
        let event_id = Uuid::new_v4();
        let mut visit = visit_with(Some(VisitStatus::Planned));
        visit.calendar_event_id = Some(event_id);

        let transition = realize(&visit).unwrap();
        assert_eq!(transition.visit.status, Some(VisitStatus::Realized));
        assert_eq!(transition.visit.calendar_event_id, Some(event_id));
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn realize_accepts_only_planned() {
        for status in ALL_STATUSES {
            let result = realize(&visit_with(status));
            assert_eq!(result.is_ok(), status == Some(VisitStatus::Planned));
        }
    }

    #[test]
    fn cancel_removes_linked_event_and_clears_link() {
        for status in [VisitStatus::Planned, VisitStatus::Realized] {
            let event_id = Uuid::new_v4();
            let mut visit = visit_with(Some(status));
            visit.calendar_event_id = Some(event_id);

            let transition = cancel(&visit).unwrap();
            assert_eq!(transition.visit.status, Some(VisitStatus::Canceled));
            assert!(transition.visit.calendar_event_id.is_none());
            assert_eq!(
                transition.effects,
                vec![CalendarEffect::RemoveEvent(event_id)]
            );
        }
    }

    #[test]
    fn cancel_without_link_requests_no_removal() {
        let transition = cancel(&visit_with(Some(VisitStatus::Realized))).unwrap();
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn cancel_rejects_unset_draft_and_canceled() {
        for status in [None, Some(VisitStatus::Draft), Some(VisitStatus::Canceled)] {
            let err = cancel(&visit_with(status)).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Inconsistency);
            assert_eq!(err.message_key(), MEDICAL_VISIT_CANCEL_WRONG_STATUS);
        }
    }

    #[test]
    fn transition_dispatches_by_operation() {
        let visit = visit_with(Some(VisitStatus::Planned));
        let realized = transition(VisitOperation::Realize, &visit).unwrap();
        assert_eq!(realized.operation, VisitOperation::Realize);
        assert!(transition(VisitOperation::Plan, &visit).is_err());
    }

    #[test]
    fn allowed_operations_follow_lifecycle() {
        assert!(allowed_operations(None).is_empty());
        assert_eq!(
            allowed_operations(Some(VisitStatus::Draft)),
            vec![VisitOperation::Plan]
        );
        assert_eq!(
            allowed_operations(Some(VisitStatus::Planned)),
            vec![VisitOperation::Realize, VisitOperation::Cancel]
        );
        assert_eq!(
            allowed_operations(Some(VisitStatus::Realized)),
            vec![VisitOperation::Cancel]
        );
        assert!(allowed_operations(Some(VisitStatus::Canceled)).is_empty());
    }

    #[test]
    fn error_display_names_operation_and_status() {
        let err = realize(&visit_with(None)).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("operation=realize"));
        assert!(text.contains("current_status=unset"));
    }
}
