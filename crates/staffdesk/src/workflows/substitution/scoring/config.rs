use serde::{Deserialize, Serialize};

/// Weights for the additive candidate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Added when the candidate shares the absent faculty's department.
    pub affinity_bonus: i32,
    /// Subtracted once per active substitution the candidate already covers.
    pub load_penalty: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            affinity_bonus: 50,
            load_penalty: 15,
        }
    }
}
