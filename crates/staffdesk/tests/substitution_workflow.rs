use std::sync::Arc;

use chrono::NaiveDate;
use staffdesk::config::SubstitutionConfig;
use staffdesk::workflows::substitution::{
    AbsenceOutcome, AbsenceReport, AbsenceStatus, FacultyId, FacultyProfile, InMemoryAuditLog,
    InMemoryDirectory, InMemoryLedger, InMemoryNotifications, ScheduleSlot, SubstitutionLedger,
    SubstitutionPorts, SubstitutionService, SubstitutionServiceError, UserRole, Weekday,
};

struct Harness {
    directory: Arc<InMemoryDirectory>,
    ledger: Arc<InMemoryLedger>,
    notifications: Arc<InMemoryNotifications>,
    service: SubstitutionService,
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::default());
    let ledger = Arc::new(InMemoryLedger::default());
    let notifications = Arc::new(InMemoryNotifications::default());
    let service = SubstitutionService::new(
        SubstitutionPorts {
            users: directory.clone(),
            schedules: directory.clone(),
            ledger: ledger.clone(),
            notifications: notifications.clone(),
            audit: Arc::new(InMemoryAuditLog::default()),
        },
        &SubstitutionConfig::default(),
    );
    Harness {
        directory,
        ledger,
        notifications,
        service,
    }
}

impl Harness {
    fn enroll(&self, uid: &str, name: &str, department: &str, slots: Vec<ScheduleSlot>) {
        self.directory
            .upsert_user(FacultyProfile {
                uid: FacultyId::new(uid),
                name: name.to_string(),
                department: department.to_string(),
                role: UserRole::Faculty,
            })
            .expect("user stored");
        self.service
            .save_schedule(&FacultyId::new(uid), slots)
            .expect("schedule saved");
    }

    fn report_monday_nine(&self, uid: &str) -> Result<AbsenceOutcome, SubstitutionServiceError> {
        self.service.report_absence(AbsenceReport {
            faculty_uid: FacultyId::new(uid),
            date: NaiveDate::from_ymd_opt(2025, 9, 22).expect("valid date"),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            reason: None,
        })
    }
}

fn free_monday_nine() -> Vec<ScheduleSlot> {
    vec![ScheduleSlot::leisure(Weekday::Monday, "09:00", "10:00")]
}

fn busy_monday_nine() -> Vec<ScheduleSlot> {
    vec![ScheduleSlot::class(Weekday::Monday, "09:00", "10:00", "Operating Systems")]
}

fn substitute_of(harness: &Harness, outcome: &AbsenceOutcome) -> String {
    let id = outcome.substitution_id.as_ref().expect("substitute assigned");
    harness
        .ledger
        .fetch_substitution(id)
        .expect("fetch succeeds")
        .expect("substitution stored")
        .substitute_faculty_id
        .0
}

#[test]
fn department_colleague_covers_first_absence() {
    let harness = harness();
    harness.enroll("f1", "Farah Iqbal", "CS", busy_monday_nine());
    harness.enroll("f2", "Gustavo Lima", "CS", free_monday_nine());
    harness.enroll("f3", "Hana Sato", "Math", free_monday_nine());

    let outcome = harness.report_monday_nine("f1").expect("reported");

    assert_eq!(substitute_of(&harness, &outcome), "f2");
    let absence = harness.service.absence(&outcome.absence_id).expect("absence");
    assert_eq!(absence.status, AbsenceStatus::Approved);
}

#[test]
fn load_balancing_spreads_repeated_absences() {
    let harness = harness();
    harness.enroll("f1", "Farah Iqbal", "CS", busy_monday_nine());
    harness.enroll("f2", "Gustavo Lima", "CS", free_monday_nine());
    harness.enroll("f3", "Hana Sato", "Math", free_monday_nine());

    // f2 scores 50, 35, 20, 5 across the first four reports and keeps winning.
    for _ in 0..4 {
        let outcome = harness.report_monday_nine("f1").expect("reported");
        assert_eq!(substitute_of(&harness, &outcome), "f2");
    }

    // At four active substitutions f2 drops to -10 and f3 (0) takes over.
    let outcome = harness.report_monday_nine("f1").expect("reported");
    assert_eq!(substitute_of(&harness, &outcome), "f3");
    assert_eq!(harness.service.active_substitution_count().expect("count"), 5);
}

#[test]
fn uncovered_absence_stays_pending_without_notifications() {
    let harness = harness();
    harness.enroll("f1", "Farah Iqbal", "CS", busy_monday_nine());
    harness.enroll("f2", "Gustavo Lima", "CS", busy_monday_nine());

    let outcome = harness.report_monday_nine("f1").expect("reported");

    assert!(outcome.substitution_id.is_none());
    let absence = harness.service.absence(&outcome.absence_id).expect("absence");
    assert_eq!(absence.status, AbsenceStatus::Pending);
    assert!(absence.substitution_id.is_none());
    assert!(harness.notifications.events().is_empty());
}

#[test]
fn unknown_reporter_is_rejected() {
    let harness = harness();
    harness.enroll("f2", "Gustavo Lima", "CS", free_monday_nine());

    let result = harness.report_monday_nine("nobody");

    assert!(matches!(
        result,
        Err(SubstitutionServiceError::FacultyNotFound(_))
    ));
    assert!(harness.ledger.absences().expect("list").is_empty());
}
