//! Absence reporting and automatic substitute assignment.
//!
//! An absence is matched against every faculty member's weekly routine, the
//! free candidates are scored by department affinity and current load, and the
//! best one is committed as a substitution in the same call.

pub mod domain;
pub(crate) mod matcher;
pub mod memory;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AbsenceId, AbsenceOutcome, AbsenceRecord, AbsenceReport, AbsenceStatus, FacultyId,
    FacultyProfile, FacultySchedule, ScheduleSlot, SlotType, Substitution, SubstitutionId,
    SubstitutionStatus, TransitionError, UserRole, Weekday,
};
pub use matcher::AvailabilityMatcher;
pub use memory::{InMemoryAuditLog, InMemoryDirectory, InMemoryLedger, InMemoryNotifications};
pub use repository::{
    AuditAction, AuditEntry, AuditError, AuditSink, Notification, NotificationError,
    NotificationKind, NotificationSink, RepositoryError, ScheduleStore, SubstitutionLedger,
    UserDirectory,
};
pub use router::substitution_router;
pub use scoring::{
    rank, ScoreComponent, ScoreFactor, ScoredCandidate, ScoringContext, ScoringPolicy,
    WorkloadScorer,
};
pub use service::{SubstitutionPorts, SubstitutionService, SubstitutionServiceError};
