use chrono::{Datelike, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use staffdesk::config::SubstitutionConfig;
use staffdesk::workflows::substitution::{
    FacultyId, FacultyProfile, FacultySchedule, InMemoryAuditLog, InMemoryDirectory,
    InMemoryLedger, InMemoryNotifications, RepositoryError, ScheduleSlot, ScheduleStore,
    SubstitutionPorts, SubstitutionService, UserRole, Weekday,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory collaborators kept around so callers can inspect side effects.
pub(crate) struct InMemoryBackend {
    pub(crate) directory: Arc<InMemoryDirectory>,
    pub(crate) ledger: Arc<InMemoryLedger>,
    pub(crate) notifications: Arc<InMemoryNotifications>,
    pub(crate) audit: Arc<InMemoryAuditLog>,
}

impl InMemoryBackend {
    pub(crate) fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::default()),
            ledger: Arc::new(InMemoryLedger::default()),
            notifications: Arc::new(InMemoryNotifications::default()),
            audit: Arc::new(InMemoryAuditLog::default()),
        }
    }

    pub(crate) fn service(&self, config: &SubstitutionConfig) -> SubstitutionService {
        SubstitutionService::new(
            SubstitutionPorts {
                users: self.directory.clone(),
                schedules: self.directory.clone(),
                ledger: self.ledger.clone(),
                notifications: self.notifications.clone(),
                audit: self.audit.clone(),
            },
            config,
        )
    }

    pub(crate) fn enroll(
        &self,
        uid: &str,
        name: &str,
        department: &str,
        slots: Vec<ScheduleSlot>,
    ) -> Result<(), RepositoryError> {
        let uid = FacultyId::new(uid);
        self.directory.upsert_user(FacultyProfile {
            uid: uid.clone(),
            name: name.to_string(),
            department: department.to_string(),
            role: UserRole::Faculty,
        })?;
        self.directory.save(FacultySchedule {
            faculty_uid: uid,
            slots,
            updated_at: Utc::now(),
        })
    }

    /// Small two-department roster: one CS lecturer teaching Monday 09:00,
    /// a CS colleague and a Math colleague both free at that slot.
    pub(crate) fn seed_sample_roster(&self) -> Result<(), RepositoryError> {
        self.enroll(
            "f1",
            "Farah Iqbal",
            "CS",
            vec![
                ScheduleSlot::class(Weekday::Monday, "09:00", "10:00", "Data Structures"),
                ScheduleSlot::leisure(Weekday::Monday, "10:00", "11:00"),
            ],
        )?;
        self.enroll(
            "f2",
            "Gustavo Lima",
            "CS",
            vec![
                ScheduleSlot::leisure(Weekday::Monday, "09:00", "10:00"),
                ScheduleSlot::class(Weekday::Monday, "10:00", "11:00", "Compilers"),
            ],
        )?;
        self.enroll(
            "f3",
            "Hana Sato",
            "Math",
            vec![
                ScheduleSlot::leisure(Weekday::Monday, "09:00", "10:00"),
                ScheduleSlot::class(Weekday::Tuesday, "09:00", "10:00", "Calculus"),
            ],
        )
    }
}

/// First Monday on or after `from`.
pub(crate) fn next_monday(from: NaiveDate) -> NaiveDate {
    let offset = (7 - from.weekday().num_days_from_monday()) % 7;
    from + chrono::Duration::days(i64::from(offset))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
