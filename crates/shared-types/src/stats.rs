use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::grade::Grade;

/// Aggregates shown on the teacher dashboard; cached per session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeacherDashboardStats {
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub total_classes: i64,
    #[serde(default)]
    pub active_assignments: i64,
    #[serde(default)]
    pub average_attendance: f64,
    #[serde(default)]
    pub recent_submissions: i64,
    #[serde(default)]
    pub average_grade: f64,
    #[serde(default)]
    pub total_grades: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Head counts for the admin overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub students: i64,
    pub teachers: i64,
    pub parents: i64,
    pub classes: i64,
}

/// One entry of the teacher's recent-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Student landing page summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentDashboard {
    #[serde(default)]
    pub total_classes: i64,
    #[serde(default)]
    pub pending_assignments: i64,
    #[serde(default)]
    pub average_grade: f64,
    #[serde(default)]
    pub attendance_rate: f64,
    #[serde(default)]
    pub upcoming_assignments: Vec<Assignment>,
    #[serde(default)]
    pub recent_grades: Vec<Grade>,
}
