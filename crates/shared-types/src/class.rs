use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use crate::validation::FieldErrors;
#[cfg(feature = "validation")]
use crate::AppError;
#[cfg(feature = "validation")]
use validator::Validate;

/// Teacher summary nested in a class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeacherInfo {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Student summary nested in a class roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrolledStudent {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// A class (course section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchoolClass {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub current_students: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherInfo>,
    #[serde(default)]
    pub enrolled_students: Vec<EnrolledStudent>,
}

fn default_status() -> String {
    "active".to_string()
}

impl SchoolClass {
    /// "Grade 10 - A" style label.
    pub fn grade_section(&self) -> String {
        match (self.grade.is_empty(), self.section.is_empty()) {
            (false, false) => format!("Grade {} - {}", self.grade, self.section),
            (false, true) => format!("Grade {}", self.grade),
            _ => String::new(),
        }
    }
}

/// Enrollment of one student in one class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassEnrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<EnrolledStudent>,
}

/// Request DTO for creating a class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct NewClass {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Class name is required"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Grade is required"))
    )]
    pub grade: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Section is required"))
    )]
    pub section: String,
    pub subject: String,
    pub teacher_id: Option<i64>,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 500, message = "Capacity must be between 1 and 500"))
    )]
    pub capacity: i64,
    pub schedule: String,
    pub room: String,
}

#[cfg(feature = "validation")]
impl NewClass {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::from_result(self.validate());
        errors.require("name", &self.name, "Class name is required");
        errors.require("grade", &self.grade, "Grade is required");
        errors.require("section", &self.section, "Section is required");
        errors.into_result()
    }
}

/// Partial update of a class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(feature = "validation")]
impl ClassUpdate {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            errors.require("name", name, "Class name cannot be empty");
        }
        if let Some(capacity) = self.capacity {
            if !(1..=500).contains(&capacity) {
                errors.add("capacity", "Capacity must be between 1 and 500");
            }
        }
        if let Some(status) = &self.status {
            if !matches!(status.as_str(), "active" | "inactive" | "archived") {
                errors.add("status", "Status must be active, inactive or archived");
            }
        }
        errors.into_result()
    }
}

/// Request DTO for enrolling students into a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollStudentsRequest {
    pub student_ids: Vec<i64>,
}

#[cfg(feature = "validation")]
impl EnrollStudentsRequest {
    pub fn check(&self) -> Result<(), AppError> {
        if self.student_ids.is_empty() {
            return Err(AppError::field("student_ids", "Select at least one student"));
        }
        Ok(())
    }
}

/// Per-class aggregates shown on the class detail view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassStats {
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub average_grade: f64,
    #[serde(default)]
    pub attendance_rate: f64,
    #[serde(default)]
    pub total_assignments: i64,
}
