//! Process-local adapters for the storage and notification ports.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    AbsenceId, AbsenceRecord, FacultyId, FacultyProfile, FacultySchedule, Substitution,
    SubstitutionId, UserRole,
};
use super::repository::{
    AuditEntry, AuditError, AuditSink, Notification, NotificationError, NotificationSink,
    RepositoryError, ScheduleStore, SubstitutionLedger, UserDirectory,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
}

/// Users keyed by uid; listing order is uid order.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<BTreeMap<FacultyId, FacultyProfile>>,
    schedules: Mutex<HashMap<FacultyId, FacultySchedule>>,
}

impl InMemoryDirectory {
    pub fn upsert_user(&self, profile: FacultyProfile) -> Result<(), RepositoryError> {
        lock(&self.users)?.insert(profile.uid.clone(), profile);
        Ok(())
    }
}

impl UserDirectory for InMemoryDirectory {
    fn get_user(&self, uid: &FacultyId) -> Result<Option<FacultyProfile>, RepositoryError> {
        Ok(lock(&self.users)?.get(uid).cloned())
    }

    fn list_faculty(
        &self,
        department: Option<&str>,
    ) -> Result<Vec<FacultyProfile>, RepositoryError> {
        Ok(lock(&self.users)?
            .values()
            .filter(|user| user.role == UserRole::Faculty)
            .filter(|user| department.map_or(true, |dept| user.department == dept))
            .cloned()
            .collect())
    }
}

impl ScheduleStore for InMemoryDirectory {
    fn schedule(&self, faculty_uid: &FacultyId) -> Result<Option<FacultySchedule>, RepositoryError> {
        Ok(lock(&self.schedules)?.get(faculty_uid).cloned())
    }

    fn save(&self, schedule: FacultySchedule) -> Result<(), RepositoryError> {
        lock(&self.schedules)?.insert(schedule.faculty_uid.clone(), schedule);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLedger {
    absences: Mutex<HashMap<AbsenceId, AbsenceRecord>>,
    substitutions: Mutex<HashMap<SubstitutionId, Substitution>>,
}

impl InMemoryLedger {
    /// Every stored absence regardless of status.
    pub fn absences(&self) -> Result<Vec<AbsenceRecord>, RepositoryError> {
        Ok(lock(&self.absences)?.values().cloned().collect())
    }

    /// Every stored substitution regardless of status.
    pub fn substitutions(&self) -> Result<Vec<Substitution>, RepositoryError> {
        Ok(lock(&self.substitutions)?.values().cloned().collect())
    }
}

impl SubstitutionLedger for InMemoryLedger {
    fn insert_absence(&self, record: AbsenceRecord) -> Result<AbsenceRecord, RepositoryError> {
        let mut guard = lock(&self.absences)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_absence(&self, record: AbsenceRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.absences)?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_absence(&self, id: &AbsenceId) -> Result<Option<AbsenceRecord>, RepositoryError> {
        Ok(lock(&self.absences)?.get(id).cloned())
    }

    fn insert_substitution(&self, record: Substitution) -> Result<Substitution, RepositoryError> {
        let mut guard = lock(&self.substitutions)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_substitution(&self, record: Substitution) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.substitutions)?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_substitution(
        &self,
        id: &SubstitutionId,
    ) -> Result<Option<Substitution>, RepositoryError> {
        Ok(lock(&self.substitutions)?.get(id).cloned())
    }

    fn active_substitutions(&self) -> Result<Vec<Substitution>, RepositoryError> {
        Ok(lock(&self.substitutions)?
            .values()
            .filter(|record| record.is_active())
            .cloned()
            .collect())
    }

    fn active_substitutions_for(
        &self,
        substitute: &FacultyId,
    ) -> Result<Vec<Substitution>, RepositoryError> {
        Ok(lock(&self.substitutions)?
            .values()
            .filter(|record| record.is_active() && &record.substitute_faculty_id == substitute)
            .cloned()
            .collect())
    }
}

/// Keeps delivered notifications so callers can inspect them.
#[derive(Default)]
pub struct InMemoryNotifications {
    events: Mutex<Vec<Notification>>,
}

impl InMemoryNotifications {
    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for InMemoryNotifications {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .map_err(|_| NotificationError::Transport("notification lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .map_err(|_| AuditError::Unavailable("audit lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}
