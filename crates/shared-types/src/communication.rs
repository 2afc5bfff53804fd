use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use crate::validation::FieldErrors;
#[cfg(feature = "validation")]
use crate::AppError;

/// School-wide announcement shown to parents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    "normal".to_string()
}

/// A message in a parent's inbox.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub read: bool,
}

/// Request DTO for `POST /parent/messages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMessage {
    pub recipient_id: i64,
    pub subject: String,
    pub content: String,
}

#[cfg(feature = "validation")]
impl NewMessage {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        if self.recipient_id <= 0 {
            errors.add("recipient_id", "Please select a recipient");
        }
        errors.require("subject", &self.subject, "Subject is required");
        errors.require("content", &self.content, "Message cannot be empty");
        errors.into_result()
    }
}

/// A student notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Unread count helper for the notification badge.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Request DTO for `POST /student/feedback`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[cfg(feature = "validation")]
impl Feedback {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.require("subject", &self.subject, "Subject is required");
        errors.require("message", &self.message, "Feedback cannot be empty");
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                errors.add("rating", "Rating must be between 1 and 5");
            }
        }
        errors.into_result()
    }
}
