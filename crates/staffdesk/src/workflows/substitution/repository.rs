use serde::{Deserialize, Serialize};

use super::domain::{
    AbsenceId, AbsenceRecord, FacultyId, FacultyProfile, FacultySchedule, Substitution,
    SubstitutionId,
};

/// Read access to the staff directory.
pub trait UserDirectory: Send + Sync {
    fn get_user(&self, uid: &FacultyId) -> Result<Option<FacultyProfile>, RepositoryError>;
    /// Faculty-role users, optionally narrowed to one department.
    fn list_faculty(&self, department: Option<&str>)
        -> Result<Vec<FacultyProfile>, RepositoryError>;
}

/// Weekly routine storage keyed by faculty id.
pub trait ScheduleStore: Send + Sync {
    fn schedule(&self, faculty_uid: &FacultyId) -> Result<Option<FacultySchedule>, RepositoryError>;
    fn save(&self, schedule: FacultySchedule) -> Result<(), RepositoryError>;
}

/// Persisted absences and the substitutions attached to them.
pub trait SubstitutionLedger: Send + Sync {
    fn insert_absence(&self, record: AbsenceRecord) -> Result<AbsenceRecord, RepositoryError>;
    fn update_absence(&self, record: AbsenceRecord) -> Result<(), RepositoryError>;
    fn fetch_absence(&self, id: &AbsenceId) -> Result<Option<AbsenceRecord>, RepositoryError>;
    fn insert_substitution(&self, record: Substitution) -> Result<Substitution, RepositoryError>;
    fn update_substitution(&self, record: Substitution) -> Result<(), RepositoryError>;
    fn fetch_substitution(
        &self,
        id: &SubstitutionId,
    ) -> Result<Option<Substitution>, RepositoryError>;
    /// Every `active` substitution, in no particular order.
    fn active_substitutions(&self) -> Result<Vec<Substitution>, RepositoryError>;
    /// `active` substitutions where `substitute` is the covering faculty member.
    fn active_substitutions_for(
        &self,
        substitute: &FacultyId,
    ) -> Result<Vec<Substitution>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound in-app notification hook; push delivery happens behind it.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LeaveRequest,
    LeaveStatus,
    TaskStatus,
    CommentAdded,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: FacultyId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Append-only audit trail.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Created,
    Updated,
    Completed,
    Deleted,
    #[serde(rename = "Status Changed")]
    StatusChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub subject_id: String,
    pub action: AuditAction,
    pub performed_by: String,
    pub details: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    Unavailable(String),
}
