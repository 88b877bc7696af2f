mod config;
mod rules;

pub use config::ScoringPolicy;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{FacultyId, FacultyProfile};
use super::repository::{RepositoryError, SubstitutionLedger};

/// Terms that can contribute to a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    DepartmentAffinity,
    ActiveLoad,
    /// Classes immediately before or after the slot. Not scored yet.
    ScheduleProximity,
}

/// Discrete contribution to a score, kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: i32,
    pub notes: String,
}

/// A free faculty member with the score computed for one matching call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub uid: FacultyId,
    pub name: String,
    pub department: String,
    pub score: i32,
    pub active_load: u32,
    pub components: Vec<ScoreComponent>,
}

/// What the candidates are being scored against.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub target_department: Option<&'a str>,
    /// Date of the absence. Only the reserved proximity term would use it.
    pub reference_date: NaiveDate,
}

/// Scores candidates by department affinity and current substitution load.
pub struct WorkloadScorer {
    ledger: Arc<dyn SubstitutionLedger>,
    policy: ScoringPolicy,
}

impl WorkloadScorer {
    pub fn new(ledger: Arc<dyn SubstitutionLedger>, policy: ScoringPolicy) -> Self {
        Self { ledger, policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Number of `active` substitutions the faculty member is covering, on any date.
    pub fn active_load(&self, uid: &FacultyId) -> Result<u32, RepositoryError> {
        let active = self.ledger.active_substitutions_for(uid)?;
        Ok(u32::try_from(active.len()).unwrap_or(u32::MAX))
    }

    pub fn score(
        &self,
        candidate: &FacultyProfile,
        context: &ScoringContext<'_>,
    ) -> Result<ScoredCandidate, RepositoryError> {
        let active_load = self.active_load(&candidate.uid)?;
        let (components, score) = rules::score_candidate(
            candidate,
            context.target_department,
            active_load,
            &self.policy,
        );

        debug!(
            candidate = candidate.uid.as_str(),
            score,
            active_load,
            "scored substitute candidate"
        );

        Ok(ScoredCandidate {
            uid: candidate.uid.clone(),
            name: candidate.name.clone(),
            department: candidate.department.clone(),
            score,
            active_load,
            components,
        })
    }

    /// Scores every candidate and returns them best first.
    pub fn rank_candidates(
        &self,
        candidates: &[FacultyProfile],
        context: &ScoringContext<'_>,
    ) -> Result<Vec<ScoredCandidate>, RepositoryError> {
        let scored = candidates
            .iter()
            .map(|candidate| self.score(candidate, context))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rank(scored))
    }
}

/// Sorts by score, highest first. Equal scores keep their input order.
pub fn rank(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}
