use super::config::ScoringPolicy;
use super::{ScoreComponent, ScoreFactor};
use crate::workflows::substitution::domain::FacultyProfile;

pub(crate) fn score_candidate(
    candidate: &FacultyProfile,
    target_department: Option<&str>,
    active_load: u32,
    policy: &ScoringPolicy,
) -> (Vec<ScoreComponent>, i32) {
    let mut components = Vec::new();
    let mut total_score: i32 = 0;

    match target_department {
        Some(department) if candidate.department == department => {
            components.push(ScoreComponent {
                factor: ScoreFactor::DepartmentAffinity,
                score: policy.affinity_bonus,
                notes: format!("same department ({department})"),
            });
            total_score += policy.affinity_bonus;
        }
        Some(department) => {
            components.push(ScoreComponent {
                factor: ScoreFactor::DepartmentAffinity,
                score: 0,
                notes: format!("{} differs from {department}", candidate.department),
            });
        }
        None => {}
    }

    // Load counts every active assignment, not only those on the reference date.
    let penalty = policy
        .load_penalty
        .saturating_mul(i32::try_from(active_load).unwrap_or(i32::MAX));
    components.push(ScoreComponent {
        factor: ScoreFactor::ActiveLoad,
        score: -penalty,
        notes: format!("{active_load} active substitution(s)"),
    });
    total_score = total_score.saturating_sub(penalty);

    // ScoreFactor::ScheduleProximity is reserved and contributes nothing yet.

    (components, total_score)
}
