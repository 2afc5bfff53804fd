use serde::{Deserialize, Serialize};

use crate::assignment::DEFAULT_MAX_SCORE;
#[cfg(feature = "validation")]
use crate::AppError;

/// A grade row as returned by the class grade book and student grade views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub student_id: i64,
    #[serde(default)]
    pub student_name: String,
    pub class_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    #[serde(default = "default_grade_type")]
    pub grade_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default = "default_pending")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_status: Option<String>,
}

fn default_max_score() -> f64 {
    DEFAULT_MAX_SCORE
}

fn default_grade_type() -> String {
    "assignment".to_string()
}

fn default_pending() -> String {
    "pending".to_string()
}

impl Grade {
    /// Score as a percentage of `max_score`, if graded.
    pub fn percent(&self) -> Option<f64> {
        match self.score {
            Some(score) if self.max_score > 0.0 => Some(score / self.max_score * 100.0),
            _ => None,
        }
    }
}

/// Letter band for a percentage.
pub fn letter_grade(percent: f64) -> &'static str {
    match percent {
        p if p >= 90.0 => "A",
        p if p >= 80.0 => "B",
        p if p >= 70.0 => "C",
        p if p >= 60.0 => "D",
        _ => "F",
    }
}

/// Request DTO for `POST /teacher/classes/{id}/grades`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeEntry {
    pub student_id: i64,
    pub class_id: i64,
    pub assignment_id: i64,
    pub score: f64,
    pub max_score: f64,
    pub grade_type: String,
    pub weight: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl GradeEntry {
    pub fn new(class_id: i64, assignment_id: i64, student_id: i64, score: f64) -> Self {
        Self {
            student_id,
            class_id,
            assignment_id,
            score,
            max_score: DEFAULT_MAX_SCORE,
            grade_type: "assignment".to_string(),
            weight: 1.0,
            status: "graded".to_string(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.trim().is_empty()).then_some(comment);
        self
    }
}

#[cfg(feature = "validation")]
impl GradeEntry {
    pub fn check(&self) -> Result<(), AppError> {
        if !self.score.is_finite() || !(0.0..=self.max_score).contains(&self.score) {
            return Err(AppError::field(
                "score",
                format!("Score must be between 0 and {}", self.max_score),
            ));
        }
        if self.weight <= 0.0 {
            return Err(AppError::field("weight", "Weight must be positive"));
        }
        Ok(())
    }
}

/// Request DTO for `POST /teacher/classes/{id}/grades/comment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeComment {
    pub student_id: i64,
    pub assignment_id: i64,
    pub comment: String,
}

#[cfg(feature = "validation")]
impl GradeComment {
    pub fn check(&self) -> Result<(), AppError> {
        if self.comment.trim().is_empty() {
            return Err(AppError::field("comment", "Comment cannot be empty"));
        }
        Ok(())
    }
}
