use serde::{Deserialize, Serialize};

use crate::AppError;

// ---------------------------------------------------------------------------
// Realtime events pushed over the notification stream
// ---------------------------------------------------------------------------

/// Coarse category of a realtime event, used to decide which views refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Attendance,
    Grade,
    Submission,
    Message,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceChange {
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeChange {
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub assignment_id: Option<i64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceived {
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub assignment_id: Option<i64>,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageReceived {
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A typed message from the realtime stream, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    AttendanceUpdate(AttendanceChange),
    GradeUpdate(GradeChange),
    AssignmentSubmission(SubmissionReceived),
    MessageReceived(MessageReceived),
}

impl RealtimeEvent {
    pub const KNOWN_TYPES: [&'static str; 4] = [
        "attendance_update",
        "grade_update",
        "assignment_submission",
        "message_received",
    ];

    /// Decodes one frame of JSON text.
    ///
    /// `Ok(Some(_))` for a recognized event, `Ok(None)` for a well-formed
    /// message whose `type` is not one we handle, and `Err` when the frame
    /// is not a JSON object with a string `type` or a known type carries a
    /// malformed payload.
    pub fn decode(raw: &str) -> Result<Option<Self>, AppError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| AppError::decode(format!("Invalid realtime message: {e}")))?;
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| AppError::decode("Realtime message has no type tag"))?;
        if !Self::KNOWN_TYPES.contains(&tag) {
            return Ok(None);
        }
        let tag = tag.to_owned();
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::decode(format!("Invalid {tag} payload: {e}")))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            RealtimeEvent::AttendanceUpdate(_) => EventKind::Attendance,
            RealtimeEvent::GradeUpdate(_) => EventKind::Grade,
            RealtimeEvent::AssignmentSubmission(_) => EventKind::Submission,
            RealtimeEvent::MessageReceived(_) => EventKind::Message,
        }
    }

    /// Text for the notification shown when the event arrives.
    pub fn summary(&self) -> String {
        let (custom, fallback) = match self {
            RealtimeEvent::AttendanceUpdate(e) => {
                (&e.message, "Attendance has been updated".to_string())
            }
            RealtimeEvent::GradeUpdate(e) => {
                (&e.message, "A new grade has been posted".to_string())
            }
            RealtimeEvent::AssignmentSubmission(e) => (
                &e.message,
                match &e.student_name {
                    Some(name) => format!("{name} submitted an assignment"),
                    None => "New assignment submission received".to_string(),
                },
            ),
            RealtimeEvent::MessageReceived(e) => (
                &e.message,
                match &e.sender {
                    Some(sender) => format!("New message from {sender}"),
                    None => "New message received".to_string(),
                },
            ),
        };
        custom
            .as_ref()
            .filter(|m| !m.trim().is_empty())
            .cloned()
            .unwrap_or(fallback)
    }

    /// Class the event concerns, when the payload names one.
    pub fn class_id(&self) -> Option<i64> {
        match self {
            RealtimeEvent::AttendanceUpdate(e) => e.class_id,
            RealtimeEvent::GradeUpdate(e) => e.class_id,
            RealtimeEvent::AssignmentSubmission(e) => e.class_id,
            RealtimeEvent::MessageReceived(_) => None,
        }
    }
}
