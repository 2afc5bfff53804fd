use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Categorization of application errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppErrorKind {
    NotFound,
    BadRequest,
    ValidationError,
    Conflict,
    Unauthorized,
    Forbidden,
    RateLimited,
    Timeout,
    Network,
    Decode,
    InternalError,
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::NotFound => write!(f, "NotFound"),
            AppErrorKind::BadRequest => write!(f, "BadRequest"),
            AppErrorKind::ValidationError => write!(f, "ValidationError"),
            AppErrorKind::Conflict => write!(f, "Conflict"),
            AppErrorKind::Unauthorized => write!(f, "Unauthorized"),
            AppErrorKind::Forbidden => write!(f, "Forbidden"),
            AppErrorKind::RateLimited => write!(f, "RateLimited"),
            AppErrorKind::Timeout => write!(f, "Timeout"),
            AppErrorKind::Network => write!(f, "Network"),
            AppErrorKind::Decode => write!(f, "Decode"),
            AppErrorKind::InternalError => write!(f, "InternalError"),
        }
    }
}

impl AppErrorKind {
    /// Map an HTTP status code onto an error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => AppErrorKind::BadRequest,
            401 => AppErrorKind::Unauthorized,
            403 => AppErrorKind::Forbidden,
            404 => AppErrorKind::NotFound,
            408 | 504 => AppErrorKind::Timeout,
            409 => AppErrorKind::Conflict,
            422 => AppErrorKind::ValidationError,
            429 => AppErrorKind::RateLimited,
            _ => AppErrorKind::InternalError,
        }
    }

    /// True for failures that end the authenticated session.
    pub fn is_auth(&self) -> bool {
        matches!(self, AppErrorKind::Unauthorized | AppErrorKind::Forbidden)
    }
}

/// Structured application error shared by the API clients and controllers.
///
/// `code` is the machine-readable application code a backend attaches to
/// domain failures (e.g. `class_has_students`); `field_errors` holds
/// per-field messages for inline form decoration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            field_errors: HashMap::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::BadRequest, message)
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        Self {
            kind: AppErrorKind::ValidationError,
            message: message.into(),
            code: None,
            field_errors,
        }
    }

    /// Validation failure pinned to a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        Self::validation(message, field_errors)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Conflict, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Forbidden, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Decode, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::InternalError, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_validation(&self) -> bool {
        self.kind == AppErrorKind::ValidationError
    }

    /// Build the error for a non-2xx response.
    ///
    /// The message is taken from the body when the server sent one:
    /// `{"detail": "..."}`, `{"detail": {"code": .., "message": ..}}`,
    /// `{"message": "..."}` or a serialized `AppError`. Otherwise a generic
    /// message naming the method and path is used.
    pub fn from_status(status: u16, body: &str, method: &str, path: &str) -> Self {
        let kind = AppErrorKind::from_status(status);
        let generic = || format!("Request failed: {} {}", method, path);

        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return Self::new(kind, generic());
        };

        if let Ok(mut embedded) = serde_json::from_value::<AppError>(value.clone()) {
            embedded.kind = kind;
            return embedded;
        }

        let mut error = Self::new(kind, generic());
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
                error.message = detail.clone();
            }
            Some(serde_json::Value::Object(detail)) => {
                if let Some(message) = detail.get("message").and_then(|m| m.as_str()) {
                    error.message = message.to_string();
                }
                if let Some(code) = detail.get("code").and_then(|c| c.as_str()) {
                    error.code = Some(code.to_string());
                }
            }
            Some(serde_json::Value::Array(items)) => {
                // Request validation failures: [{"loc": [.., "field"], "msg": ".."}]
                for item in items {
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|f| f.as_str());
                    let msg = item.get("msg").and_then(|m| m.as_str());
                    if let (Some(field), Some(msg)) = (field, msg) {
                        error.field_errors.insert(field.to_string(), msg.to_string());
                    }
                }
                if !error.field_errors.is_empty() {
                    error.message = "Invalid data provided".to_string();
                }
            }
            _ => {
                if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                    error.message = message.to_string();
                }
            }
        }
        if error.code.is_none() {
            if let Some(code) = value.get("code").and_then(|c| c.as_str()) {
                error.code = Some(code.to_string());
            }
        }
        error
    }

    /// User-facing text for a toast.
    pub fn friendly_message(&self) -> String {
        match self.kind {
            AppErrorKind::Network => {
                "Unable to connect to the server. Please check your connection.".to_string()
            }
            AppErrorKind::Timeout => {
                "Request timed out. The server is taking too long to respond.".to_string()
            }
            AppErrorKind::Unauthorized => {
                "Your session has expired. Please log in again.".to_string()
            }
            _ if self.message.is_empty() => "Something went wrong. Please try again.".to_string(),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(feature = "validation")]
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = HashMap::new();
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                let msg = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                field_errors.insert(field.to_string(), msg);
            }
        }
        AppError::validation("Validation failed", field_errors)
    }
}
