use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory users.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacultyId(pub String);

impl FacultyId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacultyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for reported absences.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbsenceId(pub String);

impl fmt::Display for AbsenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for substitution assignments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubstitutionId(pub String);

impl fmt::Display for SubstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Faculty,
}

/// Directory entry for a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyProfile {
    pub uid: FacultyId,
    pub name: String,
    pub department: String,
    pub role: UserRole,
}

/// Working days of the six-day teaching week. Sunday has no slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Maps a calendar date onto the working week, `None` on Sundays.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat => Some(Self::Saturday),
            chrono::Weekday::Sun => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Class,
    Leisure,
}

/// One recurring weekly block. Times are `HH:mm` strings compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ScheduleSlot {
    pub fn leisure(day: Weekday, start_time: &str, end_time: &str) -> Self {
        Self {
            day,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            slot_type: SlotType::Leisure,
            subject: None,
            location: None,
        }
    }

    pub fn class(day: Weekday, start_time: &str, end_time: &str, subject: &str) -> Self {
        Self {
            day,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            slot_type: SlotType::Class,
            subject: Some(subject.to_string()),
            location: None,
        }
    }
}

/// Weekly routine owned by a single faculty member, replaced wholesale on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultySchedule {
    pub faculty_uid: FacultyId,
    pub slots: Vec<ScheduleSlot>,
    pub updated_at: DateTime<Utc>,
}

impl FacultySchedule {
    /// True when some slot is a leisure block starting exactly at `start_time` on `day`.
    pub fn is_free_at(&self, day: Weekday, start_time: &str) -> bool {
        self.slots.iter().any(|slot| {
            slot.day == day && slot.start_time == start_time && slot.slot_type == SlotType::Leisure
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

impl AbsenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Self-reported unavailability for a single window on a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    pub id: AbsenceId,
    pub faculty_uid: FacultyId,
    pub faculty_name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: AbsenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution_id: Option<SubstitutionId>,
    pub created_at: DateTime<Utc>,
}

impl AbsenceRecord {
    /// Marks the absence as covered. Only a pending absence may be approved, and only once.
    pub fn approve_with(&mut self, substitution_id: SubstitutionId) -> Result<(), TransitionError> {
        if self.status != AbsenceStatus::Pending {
            return Err(TransitionError {
                absence_id: self.id.clone(),
                from: self.status,
            });
        }
        self.status = AbsenceStatus::Approved;
        self.substitution_id = Some(substitution_id);
        Ok(())
    }
}

/// Raised when an absence is asked to leave a state it cannot leave.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("absence {absence_id} cannot be approved from status {}", .from.label())]
pub struct TransitionError {
    pub absence_id: AbsenceId,
    pub from: AbsenceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionStatus {
    Active,
    Completed,
    Cancelled,
}

/// One covering assignment for one absence window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub id: SubstitutionId,
    pub absence_id: AbsenceId,
    pub original_faculty_id: FacultyId,
    pub substitute_faculty_id: FacultyId,
    pub substitute_name: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: SubstitutionStatus,
    pub created_at: DateTime<Utc>,
}

impl Substitution {
    pub fn is_active(&self) -> bool {
        self.status == SubstitutionStatus::Active
    }
}

/// Inbound absence report as submitted by a faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceReport {
    pub faculty_uid: FacultyId,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AbsenceReport {
    /// Checks both times are `HH:mm` and the window is not empty.
    pub fn validate_window(&self) -> Result<(), String> {
        let start = parse_clock(&self.start_time)?;
        let end = parse_clock(&self.end_time)?;
        if end <= start {
            return Err(format!(
                "end time {} must be after start time {}",
                self.end_time, self.start_time
            ));
        }
        Ok(())
    }
}

/// Slots are matched by exact string, so only the zero-padded form is accepted.
fn parse_clock(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .ok()
        .filter(|time| time.format("%H:%M").to_string() == raw)
        .ok_or_else(|| format!("'{raw}' is not an HH:mm time"))
}

/// Result of reporting an absence. `substitution_id` is absent when nobody was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceOutcome {
    pub absence_id: AbsenceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_id: Option<SubstitutionId>,
}

impl AbsenceOutcome {
    pub fn is_covered(&self) -> bool {
        self.substitution_id.is_some()
    }
}
