use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "validation")]
use crate::AppError;

/// Attendance mark for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Late arrivals count as attended.
    pub fn counts_as_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored attendance row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Attendance rate in percent over a set of records; `None` when empty.
pub fn attendance_rate(records: &[AttendanceRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let attended = records
        .iter()
        .filter(|r| r.status.counts_as_present())
        .count();
    Some(attended as f64 / records.len() as f64 * 100.0)
}

/// One line of a batch submitted to `POST /teacher/classes/{id}/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceEntry {
    pub class_id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(feature = "validation")]
impl AttendanceEntry {
    /// Checks a whole batch before it is sent.
    pub fn check_batch(entries: &[AttendanceEntry]) -> Result<(), AppError> {
        let Some(first) = entries.first() else {
            return Err(AppError::field(
                "attendance",
                "Mark attendance for at least one student",
            ));
        };
        if entries
            .iter()
            .any(|e| e.class_id != first.class_id || e.date != first.date)
        {
            return Err(AppError::field(
                "attendance",
                "All entries must share the same class and date",
            ));
        }
        Ok(())
    }
}

/// Partial update of a single attendance row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(feature = "validation")]
impl AttendanceUpdate {
    pub fn check(&self) -> Result<(), AppError> {
        if self.status.is_none() && self.notes.is_none() {
            return Err(AppError::bad_request("Nothing to update"));
        }
        Ok(())
    }
}

/// Year and month of a student's attendance calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceMonth {
    pub year: i32,
    pub month: u32,
}

#[cfg(feature = "validation")]
impl AttendanceMonth {
    pub fn check(&self) -> Result<(), AppError> {
        if !(1..=12).contains(&self.month) {
            return Err(AppError::field("month", "Month must be between 1 and 12"));
        }
        Ok(())
    }
}
