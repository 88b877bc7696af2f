use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    AbsenceId, AbsenceOutcome, AbsenceRecord, AbsenceReport, AbsenceStatus, FacultyId,
    FacultyProfile, FacultySchedule, ScheduleSlot, Substitution, SubstitutionId,
    SubstitutionStatus, Weekday,
};
use super::matcher::AvailabilityMatcher;
use super::repository::{
    AuditAction, AuditEntry, AuditSink, Notification, NotificationKind, NotificationSink,
    RepositoryError, ScheduleStore, SubstitutionLedger, UserDirectory,
};
use super::scoring::{ScoredCandidate, ScoringContext, WorkloadScorer};
use crate::config::SubstitutionConfig;

const AUDIT_SUBJECT: &str = "SUBSTITUTION";
const AUDIT_ACTOR: &str = "auto-substitution";

/// Collaborators the service reads from and writes to.
///
/// The ports are synchronous and the HTTP handlers call the service inline.
/// Adapters backed by a remote store should be driven from
/// `tokio::task::spawn_blocking` so they do not stall the executor.
#[derive(Clone)]
pub struct SubstitutionPorts {
    pub users: Arc<dyn UserDirectory>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub ledger: Arc<dyn SubstitutionLedger>,
    pub notifications: Arc<dyn NotificationSink>,
    pub audit: Arc<dyn AuditSink>,
}

/// Records absences and assigns the best available substitute in the same call.
pub struct SubstitutionService {
    users: Arc<dyn UserDirectory>,
    schedules: Arc<dyn ScheduleStore>,
    ledger: Arc<dyn SubstitutionLedger>,
    notifications: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
    matcher: AvailabilityMatcher,
    scorer: WorkloadScorer,
    max_active_load: Option<u32>,
}

static ABSENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SUBSTITUTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_absence_id() -> AbsenceId {
    let id = ABSENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AbsenceId(format!("abs-{id:06}"))
}

fn next_substitution_id() -> SubstitutionId {
    let id = SUBSTITUTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubstitutionId(format!("sub-{id:06}"))
}

impl SubstitutionService {
    pub fn new(ports: SubstitutionPorts, config: &SubstitutionConfig) -> Self {
        let matcher = AvailabilityMatcher::new(ports.users.clone(), ports.schedules.clone());
        let scorer = WorkloadScorer::new(ports.ledger.clone(), config.scoring_policy());

        Self {
            users: ports.users,
            schedules: ports.schedules,
            ledger: ports.ledger,
            notifications: ports.notifications,
            audit: ports.audit,
            matcher,
            scorer,
            max_active_load: config.max_active_load,
        }
    }

    /// Record an absence and try to cover it.
    ///
    /// Fails only when the window is malformed, the reporter is unknown, or the
    /// absence itself cannot be stored. Once the absence exists every later
    /// problem degrades to an uncovered outcome.
    pub fn report_absence(
        &self,
        report: AbsenceReport,
    ) -> Result<AbsenceOutcome, SubstitutionServiceError> {
        report
            .validate_window()
            .map_err(SubstitutionServiceError::InvalidWindow)?;

        let reporter = self
            .users
            .get_user(&report.faculty_uid)?
            .ok_or_else(|| SubstitutionServiceError::FacultyNotFound(report.faculty_uid.clone()))?;

        let absence = self.ledger.insert_absence(AbsenceRecord {
            id: next_absence_id(),
            faculty_uid: reporter.uid.clone(),
            faculty_name: reporter.name.clone(),
            date: report.date,
            start_time: report.start_time,
            end_time: report.end_time,
            reason: report.reason,
            status: AbsenceStatus::Pending,
            substitution_id: None,
            created_at: Utc::now(),
        })?;
        info!(
            absence_id = %absence.id,
            faculty = reporter.uid.as_str(),
            date = %absence.date,
            start_time = %absence.start_time,
            "absence recorded"
        );

        let ranked = self.rank_substitutes(&reporter, &absence);
        if ranked.is_empty() {
            info!(absence_id = %absence.id, "no substitute available, absence left pending");
            return Ok(AbsenceOutcome {
                absence_id: absence.id,
                substitution_id: None,
            });
        }

        let absence_id = absence.id.clone();
        let Some((chosen, substitution)) = self.commit(absence, &ranked) else {
            return Ok(AbsenceOutcome {
                absence_id,
                substitution_id: None,
            });
        };

        info!(
            absence_id = %absence_id,
            substitution_id = %substitution.id,
            substitute = chosen.uid.as_str(),
            score = chosen.score,
            "substitute assigned"
        );
        self.announce(&reporter, &chosen, &substitution, &absence_id);

        Ok(AbsenceOutcome {
            absence_id,
            substitution_id: Some(substitution.id),
        })
    }

    /// Candidates for the absence window, best first. Read failures yield none.
    fn rank_substitutes(
        &self,
        reporter: &FacultyProfile,
        absence: &AbsenceRecord,
    ) -> Vec<ScoredCandidate> {
        let Some(day) = Weekday::from_date(absence.date) else {
            info!(date = %absence.date, "absence falls outside the working week");
            return Vec::new();
        };

        let candidates: Vec<FacultyProfile> = self
            .matcher
            .find_candidates(day, &absence.start_time, None)
            .into_iter()
            .filter(|candidate| candidate.uid != reporter.uid)
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let context = ScoringContext {
            target_department: Some(reporter.department.as_str()),
            reference_date: absence.date,
        };
        match self.scorer.rank_candidates(&candidates, &context) {
            Ok(ranked) => ranked,
            Err(err) => {
                warn!(absence_id = %absence.id, error = %err, "candidate scoring aborted");
                Vec::new()
            }
        }
    }

    /// Persist the substitution for the first acceptable candidate and approve the absence.
    fn commit(
        &self,
        mut absence: AbsenceRecord,
        ranked: &[ScoredCandidate],
    ) -> Option<(ScoredCandidate, Substitution)> {
        let chosen = self.select(ranked)?;

        let substitution = Substitution {
            id: next_substitution_id(),
            absence_id: absence.id.clone(),
            original_faculty_id: absence.faculty_uid.clone(),
            substitute_faculty_id: chosen.uid.clone(),
            substitute_name: chosen.name.clone(),
            date: absence.date,
            start_time: absence.start_time.clone(),
            end_time: absence.end_time.clone(),
            status: SubstitutionStatus::Active,
            created_at: Utc::now(),
        };

        let substitution = match self.ledger.insert_substitution(substitution) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(absence_id = %absence.id, error = %err, "substitution commit failed, absence left pending");
                return None;
            }
        };

        if let Err(err) = absence.approve_with(substitution.id.clone()) {
            warn!(error = %err, "absence could not be approved");
            self.withdraw(substitution);
            return None;
        }
        if let Err(err) = self.ledger.update_absence(absence.clone()) {
            warn!(
                absence_id = %absence.id,
                substitution_id = %substitution.id,
                error = %err,
                "absence approval failed after substitution was stored"
            );
            self.withdraw(substitution);
            return None;
        }

        Some((chosen.clone(), substitution))
    }

    /// Cancels a stored substitution whose absence never got approved so it
    /// stops counting towards the substitute's load.
    fn withdraw(&self, mut substitution: Substitution) {
        substitution.status = SubstitutionStatus::Cancelled;
        let substitution_id = substitution.id.clone();
        if let Err(err) = self.ledger.update_substitution(substitution) {
            warn!(substitution_id = %substitution_id, error = %err, "orphaned substitution left active");
        }
    }

    /// Top candidate, or with a load cap the best one still under it at commit time.
    fn select<'a>(&self, ranked: &'a [ScoredCandidate]) -> Option<&'a ScoredCandidate> {
        let Some(cap) = self.max_active_load else {
            return ranked.first();
        };

        for candidate in ranked {
            match self.scorer.active_load(&candidate.uid) {
                Ok(load) if load < cap => return Some(candidate),
                Ok(load) => {
                    info!(candidate = candidate.uid.as_str(), load, cap, "candidate over load cap, skipping");
                }
                Err(err) => {
                    warn!(candidate = candidate.uid.as_str(), error = %err, "load recheck failed");
                    return None;
                }
            }
        }
        None
    }

    /// Notify both parties and audit the decision. Failures are logged only.
    fn announce(
        &self,
        reporter: &FacultyProfile,
        chosen: &ScoredCandidate,
        substitution: &Substitution,
        absence_id: &AbsenceId,
    ) {
        let day = substitution.date.format("%a %b %d %Y");

        self.send(Notification {
            user_id: chosen.uid.clone(),
            kind: NotificationKind::System,
            title: "Substitution Assigned".to_string(),
            message: format!(
                "You have been assigned to substitute for {} on {} at {}.",
                reporter.name, day, substitution.start_time
            ),
            related_id: Some(substitution.id.0.clone()),
        });

        self.send(Notification {
            user_id: reporter.uid.clone(),
            kind: NotificationKind::System,
            title: "Substitution Arranged".to_string(),
            message: format!(
                "Your absence on {} has been covered. {} will be your substitute.",
                day, chosen.name
            ),
            related_id: Some(absence_id.0.clone()),
        });

        let entry = AuditEntry {
            subject_id: AUDIT_SUBJECT.to_string(),
            action: AuditAction::Updated,
            performed_by: AUDIT_ACTOR.to_string(),
            details: format!(
                "Assigned {} (score: {}) to substitute {} on {} at {}",
                chosen.name, chosen.score, reporter.name, day, substitution.start_time
            ),
        };
        if let Err(err) = self.audit.record(entry) {
            warn!(substitution_id = %substitution.id, error = %err, "audit entry dropped");
        }
    }

    fn send(&self, notification: Notification) {
        let recipient = notification.user_id.clone();
        if let Err(err) = self.notifications.notify(notification) {
            warn!(recipient = recipient.as_str(), error = %err, "notification dropped");
        }
    }

    /// Replace a faculty member's weekly routine.
    pub fn save_schedule(
        &self,
        faculty_uid: &FacultyId,
        slots: Vec<ScheduleSlot>,
    ) -> Result<FacultySchedule, SubstitutionServiceError> {
        self.users
            .get_user(faculty_uid)?
            .ok_or_else(|| SubstitutionServiceError::FacultyNotFound(faculty_uid.clone()))?;

        let schedule = FacultySchedule {
            faculty_uid: faculty_uid.clone(),
            slots,
            updated_at: Utc::now(),
        };
        self.schedules.save(schedule.clone())?;
        Ok(schedule)
    }

    pub fn schedule(
        &self,
        faculty_uid: &FacultyId,
    ) -> Result<Option<FacultySchedule>, SubstitutionServiceError> {
        Ok(self.schedules.schedule(faculty_uid)?)
    }

    pub fn absence(&self, id: &AbsenceId) -> Result<AbsenceRecord, SubstitutionServiceError> {
        self.ledger
            .fetch_absence(id)?
            .ok_or_else(|| SubstitutionServiceError::AbsenceNotFound(id.clone()))
    }

    pub fn substitution(
        &self,
        id: &SubstitutionId,
    ) -> Result<Option<Substitution>, SubstitutionServiceError> {
        Ok(self.ledger.fetch_substitution(id)?)
    }

    /// All active substitutions, most recently created first.
    pub fn active_substitutions(&self) -> Result<Vec<Substitution>, SubstitutionServiceError> {
        let mut active = self.ledger.active_substitutions()?;
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    /// Active assignments a faculty member is covering, soonest first.
    pub fn substitutions_for(
        &self,
        substitute: &FacultyId,
    ) -> Result<Vec<Substitution>, SubstitutionServiceError> {
        let mut assigned = self.ledger.active_substitutions_for(substitute)?;
        assigned.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(assigned)
    }

    pub fn active_substitution_count(&self) -> Result<usize, SubstitutionServiceError> {
        Ok(self.ledger.active_substitutions()?.len())
    }
}

/// Error raised by the substitution service.
#[derive(Debug, thiserror::Error)]
pub enum SubstitutionServiceError {
    #[error("faculty {0} not found")]
    FacultyNotFound(FacultyId),
    #[error("absence {0} not found")]
    AbsenceNotFound(AbsenceId),
    #[error("invalid absence window: {0}")]
    InvalidWindow(String),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl SubstitutionServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FacultyNotFound(_) | Self::AbsenceNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidWindow(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
