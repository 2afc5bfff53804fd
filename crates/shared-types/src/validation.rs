//! Helpers shared by the request DTO `check` methods.

use crate::AppError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use validator::ValidationErrors;

static PHONE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{3}-\d{4}$").ok());

/// Phone numbers are entered as `123-456-7890`.
pub fn is_valid_phone(phone: &str) -> bool {
    match PHONE_RE.as_ref() {
        Some(re) => re.is_match(phone),
        None => has_phone_shape(phone),
    }
}

fn has_phone_shape(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 12
        && bytes.iter().enumerate().all(|(i, b)| match i {
            3 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Accumulates per-field messages; the first message recorded for a field wins.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    /// Seed from a derived `Validate` result.
    pub fn from_result(result: Result<(), ValidationErrors>) -> Self {
        match result {
            Ok(()) => Self::default(),
            Err(errors) => Self(AppError::from(errors).field_errors),
        }
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) {
        if let Some(phone) = value.filter(|p| !p.trim().is_empty()) {
            if !is_valid_phone(phone.trim()) {
                self.add(field, "Invalid phone format (use: 123-456-7890)");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            return Ok(());
        }
        let message = if self.0.len() == 1 {
            self.0.values().next().cloned().unwrap_or_default()
        } else {
            let mut fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
            fields.sort_unstable();
            format!("Please correct: {}", fields.join(", "))
        };
        Err(AppError::validation(message, self.0))
    }
}
