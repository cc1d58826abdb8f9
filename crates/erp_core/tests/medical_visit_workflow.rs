use erp_core::db::open_db_in_memory;
use erp_core::message::{
    ErrorCategory, MEDICAL_VISIT_CANCEL_WRONG_STATUS, MEDICAL_VISIT_NOT_FOUND,
    MEDICAL_VISIT_PLAN_WRONG_STATUS, MEDICAL_VISIT_REALIZE_WRONG_STATUS,
};
use erp_core::model::company::User;
use erp_core::repo::calendar_repo::{CalendarEventRepository, SqliteCalendarEventRepository};
use erp_core::repo::company_repo::{SqliteUserRepository, UserRepository};
use erp_core::repo::visit_repo::{
    MedicalVisitRepository, SqliteMedicalVisitRepository, VisitListQuery,
};
use erp_core::{
    CalendarEvent, CalendarEventId, EventKind, MedicalVisit, RepoError, RepoResult,
    SqliteVisitWorkflow, UserId, VisitId, VisitOperation, VisitStatus, VisitWorkflowError,
    VisitWorkflowService,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use uuid::Uuid;

const START: i64 = 1_767_258_000_000;
const END: i64 = 1_767_261_600_000;

fn seed_user(conn: &Connection) -> UserId {
    let user = User::new("nurse", "Florence Nightingale");
    SqliteUserRepository::new(conn).create_user(&user).unwrap()
}

fn seed_visit(conn: &Connection, user: Option<UserId>) -> VisitId {
    let mut visit = MedicalVisit::new("Ada Lovelace", START, END);
    visit.assigned_user = user;
    visit.visit_reason = Some("Annual check".to_string());
    visit.note = "Bring vaccination record".to_string();
    SqliteMedicalVisitRepository::new(conn)
        .create_visit(&visit)
        .unwrap()
}

fn load_visit(conn: &Connection, id: VisitId) -> MedicalVisit {
    SqliteMedicalVisitRepository::new(conn)
        .find_visit(id)
        .unwrap()
        .unwrap()
}

fn event_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM calendar_events;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn plan_creates_and_links_calendar_event() {
    let mut conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let visit_id = seed_visit(&conn, Some(user));

    let planned = SqliteVisitWorkflow::new(&mut conn).plan(visit_id).unwrap();
    assert_eq!(planned.status, Some(VisitStatus::Planned));

    let stored = load_visit(&conn, visit_id);
    assert_eq!(stored, planned);
    let event_id = stored.calendar_event_id.expect("plan should link an event");

    let event = SqliteCalendarEventRepository::new(&conn)
        .get_event(event_id)
        .unwrap()
        .unwrap();
    assert_eq!(event.user_id, user);
    assert_eq!(event.kind, EventKind::Event);
    assert_eq!(event.subject, "Annual check - Ada Lovelace");
    assert_eq!(event.description, "Bring vaccination record");
    assert_eq!((event.start_at, event.end_at), (START, END));
}

#[test]
fn plan_without_assigned_user_creates_no_event() {
    let mut conn = open_db_in_memory().unwrap();
    let visit_id = seed_visit(&conn, None);

    let planned = SqliteVisitWorkflow::new(&mut conn).plan(visit_id).unwrap();

    assert_eq!(planned.status, Some(VisitStatus::Planned));
    assert!(planned.calendar_event_id.is_none());
    assert_eq!(event_count(&conn), 0);
}

#[test]
fn full_lifecycle_plan_realize_cancel() {
    let mut conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let visit_id = seed_visit(&conn, Some(user));

    let mut workflow = SqliteVisitWorkflow::new(&mut conn);
    let planned = workflow.plan(visit_id).unwrap();
    let realized = workflow.realize(visit_id).unwrap();
    assert_eq!(realized.status, Some(VisitStatus::Realized));
    assert_eq!(realized.calendar_event_id, planned.calendar_event_id);

    let canceled = workflow.cancel(visit_id).unwrap();
    assert_eq!(canceled.status, Some(VisitStatus::Canceled));
    assert!(canceled.calendar_event_id.is_none());

    let stored = load_visit(&conn, visit_id);
    assert_eq!(stored.status, Some(VisitStatus::Canceled));
    assert!(stored.calendar_event_id.is_none());
    assert_eq!(event_count(&conn), 0);
}

#[test]
fn cancel_from_planned_removes_event() {
    let mut conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let visit_id = seed_visit(&conn, Some(user));

    let mut workflow = SqliteVisitWorkflow::new(&mut conn);
    workflow.plan(visit_id).unwrap();
    workflow.cancel(visit_id).unwrap();

    assert_eq!(event_count(&conn), 0);
    assert_eq!(load_visit(&conn, visit_id).status, Some(VisitStatus::Canceled));
}

#[test]
fn user_events_list_in_start_order_and_drop_on_cancel() {
    let mut conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let other_user = SqliteUserRepository::new(&conn)
        .create_user(&User::new("doctor", "Elizabeth Blackwell"))
        .unwrap();
    let repo = SqliteMedicalVisitRepository::new(&conn);
    let mut late = MedicalVisit::new("Ada Lovelace", END, END + 3_600_000);
    late.assigned_user = Some(user);
    let mut early = MedicalVisit::new("Alan Turing", START, END);
    early.assigned_user = Some(user);
    let mut elsewhere = MedicalVisit::new("Grace Hopper", START, END);
    elsewhere.assigned_user = Some(other_user);
    for visit in [&late, &early, &elsewhere] {
        repo.create_visit(visit).unwrap();
    }

    let mut workflow = SqliteVisitWorkflow::new(&mut conn);
    let late_event = workflow.plan(late.uuid).unwrap().calendar_event_id;
    let early_event = workflow.plan(early.uuid).unwrap().calendar_event_id;
    workflow.plan(elsewhere.uuid).unwrap();

    let listed: Vec<_> = SqliteCalendarEventRepository::new(&conn)
        .list_events_for_user(user)
        .unwrap()
        .into_iter()
        .map(|event| Some(event.uuid))
        .collect();
    assert_eq!(listed, vec![early_event, late_event]);

    SqliteVisitWorkflow::new(&mut conn).cancel(early.uuid).unwrap();
    let remaining: Vec<_> = SqliteCalendarEventRepository::new(&conn)
        .list_events_for_user(user)
        .unwrap()
        .into_iter()
        .map(|event| Some(event.uuid))
        .collect();
    assert_eq!(remaining, vec![late_event]);
}

#[test]
fn wrong_status_is_rejected_without_changes() {
    let mut conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let visit_id = seed_visit(&conn, Some(user));

    let mut workflow = SqliteVisitWorkflow::new(&mut conn);
    let realize_err = workflow.realize(visit_id).unwrap_err();
    assert_eq!(
        realize_err.message_key(),
        Some(MEDICAL_VISIT_REALIZE_WRONG_STATUS)
    );
    assert_eq!(realize_err.category(), Some(ErrorCategory::Inconsistency));

    let cancel_err = workflow.cancel(visit_id).unwrap_err();
    assert_eq!(
        cancel_err.message_key(),
        Some(MEDICAL_VISIT_CANCEL_WRONG_STATUS)
    );

    workflow.plan(visit_id).unwrap();
    let replan_err = workflow.plan(visit_id).unwrap_err();
    match replan_err {
        VisitWorkflowError::InvalidStateTransition(err) => {
            assert_eq!(err.operation, VisitOperation::Plan);
            assert_eq!(err.current, Some(VisitStatus::Planned));
            assert_eq!(err.message_key(), MEDICAL_VISIT_PLAN_WRONG_STATUS);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The rejected second plan must not have added another event.
    assert_eq!(event_count(&conn), 1);
    assert_eq!(load_visit(&conn, visit_id).status, Some(VisitStatus::Planned));
}

#[test]
fn canceled_visit_accepts_no_operation() {
    let mut conn = open_db_in_memory().unwrap();
    let visit_id = seed_visit(&conn, None);

    let mut workflow = SqliteVisitWorkflow::new(&mut conn);
    workflow.plan(visit_id).unwrap();
    workflow.cancel(visit_id).unwrap();

    assert!(workflow.plan(visit_id).is_err());
    assert!(workflow.realize(visit_id).is_err());
    assert!(workflow.cancel(visit_id).is_err());
    assert_eq!(load_visit(&conn, visit_id).status, Some(VisitStatus::Canceled));
}

#[test]
fn unset_status_is_rejected_by_every_operation() {
    let mut conn = open_db_in_memory().unwrap();
    let visit_id = seed_visit(&conn, None);
    conn.execute(
        "UPDATE medical_visits SET status = NULL WHERE uuid = ?1;",
        [visit_id.to_string()],
    )
    .unwrap();

    let mut workflow = SqliteVisitWorkflow::new(&mut conn);
    for result in [
        workflow.plan(visit_id),
        workflow.realize(visit_id),
        workflow.cancel(visit_id),
    ] {
        match result {
            Err(VisitWorkflowError::InvalidStateTransition(err)) => {
                assert_eq!(err.current, None)
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }
    assert_eq!(load_visit(&conn, visit_id).status, None);
}

#[test]
fn missing_visit_reports_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = SqliteVisitWorkflow::new(&mut conn).plan(missing).unwrap_err();

    assert!(matches!(err, VisitWorkflowError::VisitNotFound(id) if id == missing));
    assert_eq!(err.message_key(), Some(MEDICAL_VISIT_NOT_FOUND));
    assert_eq!(err.category(), Some(ErrorCategory::NoValue));
}

#[test]
fn calendar_failure_rolls_back_status_change() {
    let mut conn = open_db_in_memory().unwrap();
    let user = seed_user(&conn);
    let visit_id = seed_visit(&conn, Some(user));
    conn.execute_batch(
        "CREATE TRIGGER reject_calendar_insert
         BEFORE INSERT ON calendar_events
         BEGIN
             SELECT RAISE(ABORT, 'calendar unavailable');
         END;",
    )
    .unwrap();

    let err = SqliteVisitWorkflow::new(&mut conn).plan(visit_id).unwrap_err();

    assert!(matches!(err, VisitWorkflowError::Repo(RepoError::Db(_))));
    assert!(err.message_key().is_none());
    let stored = load_visit(&conn, visit_id);
    assert_eq!(stored.status, Some(VisitStatus::Draft));
    assert!(stored.calendar_event_id.is_none());
    assert_eq!(event_count(&conn), 0);
}

#[test]
fn list_visits_filters_by_status() {
    let mut conn = open_db_in_memory().unwrap();
    let first = seed_visit(&conn, None);
    let _second = seed_visit(&conn, None);
    SqliteVisitWorkflow::new(&mut conn).plan(first).unwrap();

    let repo = SqliteMedicalVisitRepository::new(&conn);
    let planned = repo
        .list_visits(&VisitListQuery {
            status: Some(VisitStatus::Planned),
            ..VisitListQuery::default()
        })
        .unwrap();
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].uuid, first);

    let all = repo.list_visits(&VisitListQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
}

#[derive(Default)]
struct InMemoryVisits {
    rows: RefCell<HashMap<VisitId, MedicalVisit>>,
}

impl MedicalVisitRepository for InMemoryVisits {
    fn create_visit(&self, visit: &MedicalVisit) -> RepoResult<VisitId> {
        self.rows.borrow_mut().insert(visit.uuid, visit.clone());
        Ok(visit.uuid)
    }

    fn find_visit(&self, id: VisitId) -> RepoResult<Option<MedicalVisit>> {
        Ok(self.rows.borrow().get(&id).cloned())
    }

    fn save_visit(&self, visit: &MedicalVisit) -> RepoResult<()> {
        self.rows.borrow_mut().insert(visit.uuid, visit.clone());
        Ok(())
    }

    fn list_visits(&self, _query: &VisitListQuery) -> RepoResult<Vec<MedicalVisit>> {
        Ok(self.rows.borrow().values().cloned().collect())
    }
}

#[derive(Default)]
struct RecordingCalendar {
    events: RefCell<HashMap<CalendarEventId, CalendarEvent>>,
    removed: RefCell<Vec<CalendarEventId>>,
}

impl CalendarEventRepository for RecordingCalendar {
    fn create_event(&self, event: &CalendarEvent) -> RepoResult<CalendarEventId> {
        self.events.borrow_mut().insert(event.uuid, event.clone());
        Ok(event.uuid)
    }

    fn get_event(&self, id: CalendarEventId) -> RepoResult<Option<CalendarEvent>> {
        Ok(self.events.borrow().get(&id).cloned())
    }

    fn remove_event(&self, id: CalendarEventId) -> RepoResult<()> {
        self.events
            .borrow_mut()
            .remove(&id)
            .map(|_| self.removed.borrow_mut().push(id))
            .ok_or(RepoError::NotFound {
                entity: "calendar event",
                id,
            })
    }

    fn list_events_for_user(&self, user_id: UserId) -> RepoResult<Vec<CalendarEvent>> {
        Ok(self
            .events
            .borrow()
            .values()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[test]
fn service_works_over_injected_repositories() {
    let user = Uuid::new_v4();
    let mut visit = MedicalVisit::new("Grace Hopper", START, END);
    visit.assigned_user = Some(user);
    let visits = InMemoryVisits::default();
    let visit_id = visits.create_visit(&visit).unwrap();

    let service = VisitWorkflowService::new(visits, RecordingCalendar::default());

    let planned = service.plan(visit_id).unwrap();
    let event_id = planned.calendar_event_id.unwrap();
    let canceled = service.cancel(visit_id).unwrap();

    assert_eq!(canceled.status, Some(VisitStatus::Canceled));
    assert!(canceled.calendar_event_id.is_none());
    assert!(matches!(
        service.realize(visit_id),
        Err(VisitWorkflowError::InvalidStateTransition(_))
    ));
    assert!(matches!(
        service.realize(Uuid::new_v4()),
        Err(VisitWorkflowError::VisitNotFound(_))
    ));

    assert_eq!(*service.calendar().removed.borrow(), vec![event_id]);
    assert_eq!(
        service.visits().rows.borrow()[&visit_id].status,
        Some(VisitStatus::Canceled)
    );
    assert!(service.calendar().events.borrow().is_empty());
}
