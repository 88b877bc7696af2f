use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::config::SubstitutionConfig;
use crate::workflows::substitution::domain::{
    AbsenceId, AbsenceRecord, AbsenceReport, FacultyId, FacultyProfile, FacultySchedule,
    ScheduleSlot, Substitution, SubstitutionId, SubstitutionStatus, UserRole, Weekday,
};
use crate::workflows::substitution::memory::{
    InMemoryAuditLog, InMemoryDirectory, InMemoryLedger, InMemoryNotifications,
};
use crate::workflows::substitution::repository::{
    AuditEntry, AuditError, AuditSink, Notification, NotificationError, NotificationSink,
    RepositoryError, ScheduleStore, SubstitutionLedger, UserDirectory,
};
use crate::workflows::substitution::service::{SubstitutionPorts, SubstitutionService};

pub(super) fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 22).expect("valid date")
}

pub(super) fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 28).expect("valid date")
}

pub(super) fn faculty(uid: &str, name: &str, department: &str) -> FacultyProfile {
    FacultyProfile {
        uid: FacultyId::new(uid),
        name: name.to_string(),
        department: department.to_string(),
        role: UserRole::Faculty,
    }
}

pub(super) fn report(uid: &str, date: NaiveDate, start: &str, end: &str) -> AbsenceReport {
    AbsenceReport {
        faculty_uid: FacultyId::new(uid),
        date,
        start_time: start.to_string(),
        end_time: end.to_string(),
        reason: Some("Medical appointment".to_string()),
    }
}

pub(super) fn free_monday_nine() -> Vec<ScheduleSlot> {
    vec![
        ScheduleSlot::leisure(Weekday::Monday, "09:00", "10:00"),
        ScheduleSlot::class(Weekday::Monday, "10:00", "11:00", "Algorithms"),
    ]
}

pub(super) fn teaching_monday_nine() -> Vec<ScheduleSlot> {
    vec![ScheduleSlot::class(Weekday::Monday, "09:00", "10:00", "Databases")]
}

/// In-memory collaborators shared between the service and the assertions.
pub(super) struct Fixture {
    pub(super) directory: Arc<InMemoryDirectory>,
    pub(super) ledger: Arc<InMemoryLedger>,
    pub(super) notifications: Arc<InMemoryNotifications>,
    pub(super) audit: Arc<InMemoryAuditLog>,
}

impl Fixture {
    pub(super) fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::default()),
            ledger: Arc::new(InMemoryLedger::default()),
            notifications: Arc::new(InMemoryNotifications::default()),
            audit: Arc::new(InMemoryAuditLog::default()),
        }
    }

    pub(super) fn add_faculty(
        &self,
        uid: &str,
        name: &str,
        department: &str,
        slots: Option<Vec<ScheduleSlot>>,
    ) -> &Self {
        self.directory
            .upsert_user(faculty(uid, name, department))
            .expect("user stored");
        if let Some(slots) = slots {
            self.directory
                .save(FacultySchedule {
                    faculty_uid: FacultyId::new(uid),
                    slots,
                    updated_at: Utc::now(),
                })
                .expect("schedule stored");
        }
        self
    }

    pub(super) fn add_admin(&self, uid: &str, name: &str, department: &str) -> &Self {
        let mut profile = faculty(uid, name, department);
        profile.role = UserRole::Admin;
        self.directory.upsert_user(profile).expect("user stored");
        self
    }

    /// Gives `uid` `count` active substitutions on unrelated dates.
    pub(super) fn seed_load(&self, uid: &str, count: u32) -> &Self {
        for index in 0..count {
            let date = NaiveDate::from_ymd_opt(2025, 10, 1 + index).expect("valid date");
            self.ledger
                .insert_substitution(Substitution {
                    id: SubstitutionId(format!("seed-{uid}-{index}")),
                    absence_id: AbsenceId(format!("seed-abs-{uid}-{index}")),
                    original_faculty_id: FacultyId::new("someone-else"),
                    substitute_faculty_id: FacultyId::new(uid),
                    substitute_name: uid.to_string(),
                    date,
                    start_time: "14:00".to_string(),
                    end_time: "15:00".to_string(),
                    status: SubstitutionStatus::Active,
                    created_at: Utc::now(),
                })
                .expect("seed substitution stored");
        }
        self
    }

    pub(super) fn ports(&self) -> SubstitutionPorts {
        SubstitutionPorts {
            users: self.directory.clone(),
            schedules: self.directory.clone(),
            ledger: self.ledger.clone(),
            notifications: self.notifications.clone(),
            audit: self.audit.clone(),
        }
    }

    pub(super) fn service(&self) -> SubstitutionService {
        SubstitutionService::new(self.ports(), &SubstitutionConfig::default())
    }

    pub(super) fn absence(&self, id: &AbsenceId) -> AbsenceRecord {
        self.ledger
            .fetch_absence(id)
            .expect("fetch succeeds")
            .expect("absence stored")
    }

    pub(super) fn substitution(&self, id: &SubstitutionId) -> Substitution {
        self.ledger
            .fetch_substitution(id)
            .expect("fetch succeeds")
            .expect("substitution stored")
    }
}

/// Scenario used across the service tests: F1 (CS) absent on Monday 09:00,
/// F2 (CS) and F3 (Math) both free at that slot.
pub(super) fn department_scenario() -> Fixture {
    let fixture = Fixture::new();
    fixture
        .add_faculty("f1", "Farah Iqbal", "CS", Some(teaching_monday_nine()))
        .add_faculty("f2", "Gustavo Lima", "CS", Some(free_monday_nine()))
        .add_faculty("f3", "Hana Sato", "Math", Some(free_monday_nine()));
    fixture
}

pub(super) struct UnavailableLedger;

impl SubstitutionLedger for UnavailableLedger {
    fn insert_absence(&self, _record: AbsenceRecord) -> Result<AbsenceRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_absence(&self, _record: AbsenceRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_absence(&self, _id: &AbsenceId) -> Result<Option<AbsenceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_substitution(&self, _record: Substitution) -> Result<Substitution, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_substitution(&self, _record: Substitution) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_substitution(
        &self,
        _id: &SubstitutionId,
    ) -> Result<Option<Substitution>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_substitutions(&self) -> Result<Vec<Substitution>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_substitutions_for(
        &self,
        _substitute: &FacultyId,
    ) -> Result<Vec<Substitution>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Stores absences but refuses to store substitutions.
#[derive(Default)]
pub(super) struct SubstitutionWriteFailure {
    pub(super) inner: InMemoryLedger,
}

impl SubstitutionLedger for SubstitutionWriteFailure {
    fn insert_absence(&self, record: AbsenceRecord) -> Result<AbsenceRecord, RepositoryError> {
        self.inner.insert_absence(record)
    }

    fn update_absence(&self, record: AbsenceRecord) -> Result<(), RepositoryError> {
        self.inner.update_absence(record)
    }

    fn fetch_absence(&self, id: &AbsenceId) -> Result<Option<AbsenceRecord>, RepositoryError> {
        self.inner.fetch_absence(id)
    }

    fn insert_substitution(&self, _record: Substitution) -> Result<Substitution, RepositoryError> {
        Err(RepositoryError::Unavailable("write quota exceeded".to_string()))
    }

    fn update_substitution(&self, record: Substitution) -> Result<(), RepositoryError> {
        self.inner.update_substitution(record)
    }

    fn fetch_substitution(
        &self,
        id: &SubstitutionId,
    ) -> Result<Option<Substitution>, RepositoryError> {
        self.inner.fetch_substitution(id)
    }

    fn active_substitutions(&self) -> Result<Vec<Substitution>, RepositoryError> {
        self.inner.active_substitutions()
    }

    fn active_substitutions_for(
        &self,
        substitute: &FacultyId,
    ) -> Result<Vec<Substitution>, RepositoryError> {
        self.inner.active_substitutions_for(substitute)
    }
}

/// Stores substitutions but cannot approve the absence they cover.
#[derive(Default)]
pub(super) struct ApprovalWriteFailure {
    pub(super) inner: InMemoryLedger,
}

impl SubstitutionLedger for ApprovalWriteFailure {
    fn insert_absence(&self, record: AbsenceRecord) -> Result<AbsenceRecord, RepositoryError> {
        self.inner.insert_absence(record)
    }

    fn update_absence(&self, _record: AbsenceRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("absence shard read-only".to_string()))
    }

    fn fetch_absence(&self, id: &AbsenceId) -> Result<Option<AbsenceRecord>, RepositoryError> {
        self.inner.fetch_absence(id)
    }

    fn insert_substitution(&self, record: Substitution) -> Result<Substitution, RepositoryError> {
        self.inner.insert_substitution(record)
    }

    fn update_substitution(&self, record: Substitution) -> Result<(), RepositoryError> {
        self.inner.update_substitution(record)
    }

    fn fetch_substitution(
        &self,
        id: &SubstitutionId,
    ) -> Result<Option<Substitution>, RepositoryError> {
        self.inner.fetch_substitution(id)
    }

    fn active_substitutions(&self) -> Result<Vec<Substitution>, RepositoryError> {
        self.inner.active_substitutions()
    }

    fn active_substitutions_for(
        &self,
        substitute: &FacultyId,
    ) -> Result<Vec<Substitution>, RepositoryError> {
        self.inner.active_substitutions_for(substitute)
    }
}

/// Directory whose schedule reads fail for one faculty member.
pub(super) struct FlakySchedules {
    pub(super) inner: Arc<InMemoryDirectory>,
    pub(super) broken: FacultyId,
}

impl ScheduleStore for FlakySchedules {
    fn schedule(&self, faculty_uid: &FacultyId) -> Result<Option<FacultySchedule>, RepositoryError> {
        if faculty_uid == &self.broken {
            return Err(RepositoryError::Unavailable("schedule shard offline".to_string()));
        }
        self.inner.schedule(faculty_uid)
    }

    fn save(&self, schedule: FacultySchedule) -> Result<(), RepositoryError> {
        self.inner.save(schedule)
    }
}

pub(super) struct UnavailableDirectory;

impl UserDirectory for UnavailableDirectory {
    fn get_user(&self, _uid: &FacultyId) -> Result<Option<FacultyProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("directory offline".to_string()))
    }

    fn list_faculty(
        &self,
        _department: Option<&str>,
    ) -> Result<Vec<FacultyProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("directory offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct FailingNotifications {
    pub(super) attempts: Mutex<u32>,
}

impl NotificationSink for FailingNotifications {
    fn notify(&self, _notification: Notification) -> Result<(), NotificationError> {
        *self.attempts.lock().expect("attempt mutex poisoned") += 1;
        Err(NotificationError::Transport("push gateway down".to_string()))
    }
}

pub(super) struct FailingAudit;

impl AuditSink for FailingAudit {
    fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("audit store read-only".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
