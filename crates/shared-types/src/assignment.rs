use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use crate::validation::FieldErrors;
#[cfg(feature = "validation")]
use crate::AppError;
#[cfg(feature = "validation")]
use validator::Validate;

pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// Submission counters attached to an assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubmissionStats {
    pub total_submissions: i64,
    pub graded_submissions: i64,
    pub pending_submissions: i64,
}

/// An assignment set for a class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub class_id: i64,
    pub due_date: NaiveDate,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_stats: Option<SubmissionStats>,
}

fn default_max_score() -> f64 {
    DEFAULT_MAX_SCORE
}

fn default_status() -> String {
    "active".to_string()
}

impl Assignment {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == "active" && self.due_date < today
    }
}

/// A student's submission for an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default = "default_submission_status")]
    pub status: String,
}

fn default_submission_status() -> String {
    "submitted".to_string()
}

/// Request DTO for creating an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct NewAssignment {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))
    )]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub class_id: i64,
    pub due_date: NaiveDate,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1.0, max = 1000.0, message = "Max score must be between 1 and 1000"))
    )]
    pub max_score: f64,
}

#[cfg(feature = "validation")]
impl NewAssignment {
    pub fn check(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut errors = FieldErrors::from_result(self.validate());
        errors.require("title", &self.title, "Title is required");
        if self.class_id <= 0 {
            errors.add("class_id", "Please select a class");
        }
        if self.due_date < today {
            errors.add("due_date", "Due date cannot be in the past");
        }
        errors.into_result()
    }
}

/// Partial update of an assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(feature = "validation")]
impl AssignmentUpdate {
    pub fn check(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        if let Some(title) = &self.title {
            errors.require("title", title, "Title cannot be empty");
        }
        if let Some(due) = self.due_date {
            if due < today {
                errors.add("due_date", "Due date cannot be in the past");
            }
        }
        if let Some(max) = self.max_score {
            if !(1.0..=1000.0).contains(&max) {
                errors.add("max_score", "Max score must be between 1 and 1000");
            }
        }
        if let Some(status) = &self.status {
            if !matches!(status.as_str(), "active" | "closed") {
                errors.add("status", "Status must be active or closed");
            }
        }
        errors.into_result()
    }
}

/// Teacher's review of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReview {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub status: String,
    /// Upper bound for `score`; not sent to the backend.
    #[serde(skip, default = "default_max_score")]
    pub max_score: f64,
}

impl SubmissionReview {
    pub fn graded(score: f64, feedback: Option<String>) -> Self {
        Self {
            score,
            feedback,
            status: "graded".to_string(),
            max_score: DEFAULT_MAX_SCORE,
        }
    }
}

#[cfg(feature = "validation")]
impl SubmissionReview {
    pub fn check(&self) -> Result<(), AppError> {
        if !(0.0..=self.max_score).contains(&self.score) {
            return Err(AppError::field(
                "score",
                format!("Score must be between 0 and {}", self.max_score),
            ));
        }
        Ok(())
    }
}

/// Student upload for `POST /student/assignments/{id}/submit`.
#[derive(Debug, Clone, Default)]
pub struct SubmissionUpload {
    pub content: String,
    pub file: Option<UploadFile>,
}

/// A file attached to a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Response of a successful upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub submission_id: Option<i64>,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[cfg(feature = "validation")]
impl SubmissionUpload {
    pub fn check(&self) -> Result<(), AppError> {
        let has_file = self.file.as_ref().is_some_and(|f| !f.bytes.is_empty());
        if self.content.trim().is_empty() && !has_file {
            return Err(AppError::field("content", "Add an answer or attach a file"));
        }
        Ok(())
    }
}
