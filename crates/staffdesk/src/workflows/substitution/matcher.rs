use std::sync::Arc;

use tracing::warn;

use super::domain::{FacultyProfile, Weekday};
use super::repository::{RepositoryError, ScheduleStore, UserDirectory};

/// Finds faculty whose weekly routine leaves them free at a given slot.
pub struct AvailabilityMatcher {
    users: Arc<dyn UserDirectory>,
    schedules: Arc<dyn ScheduleStore>,
}

impl AvailabilityMatcher {
    pub fn new(users: Arc<dyn UserDirectory>, schedules: Arc<dyn ScheduleStore>) -> Self {
        Self { users, schedules }
    }

    /// Faculty with a leisure slot on `day` starting exactly at `start_time`.
    ///
    /// Results come back in directory order. A faculty member without a saved
    /// schedule is never free. Any read failure discards the whole scan and
    /// yields an empty list rather than a partial pool.
    pub fn find_candidates(
        &self,
        day: Weekday,
        start_time: &str,
        department: Option<&str>,
    ) -> Vec<FacultyProfile> {
        match self.scan(day, start_time, department) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(day = day.label(), start_time, error = %err, "availability scan aborted");
                Vec::new()
            }
        }
    }

    fn scan(
        &self,
        day: Weekday,
        start_time: &str,
        department: Option<&str>,
    ) -> Result<Vec<FacultyProfile>, RepositoryError> {
        let faculty = self.users.list_faculty(department)?;

        let mut available = Vec::new();
        for member in faculty {
            let free = self
                .schedules
                .schedule(&member.uid)?
                .map(|schedule| schedule.is_free_at(day, start_time))
                .unwrap_or(false);

            if free {
                available.push(member);
            }
        }

        Ok(available)
    }
}
