//! Modal dialogs and the forms inside them.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use parking_lot::Mutex;
use shared_types::AppError;

use crate::view::View;

/// Field values of one form, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// Trimmed value, empty when the field was never filled.
    pub fn text(&self, field: &str) -> String {
        self.values
            .get(field)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn optional(&self, field: &str) -> Option<String> {
        Some(self.text(field)).filter(|v| !v.is_empty())
    }

    pub fn required(&self, field: &str, label: &str) -> Result<String, AppError> {
        self.optional(field)
            .ok_or_else(|| AppError::field(field, format!("{label} is required")))
    }

    /// Parse a numeric field; `missing` is the message for an empty one.
    pub fn number<T: FromStr>(&self, field: &str, missing: &str) -> Result<T, AppError> {
        let raw = self.text(field);
        if raw.is_empty() {
            return Err(AppError::field(field, missing));
        }
        raw.parse()
            .map_err(|_| AppError::field(field, format!("'{raw}' is not a valid number")))
    }

    pub fn date(&self, field: &str, missing: &str) -> Result<NaiveDate, AppError> {
        let raw = self.text(field);
        if raw.is_empty() {
            return Err(AppError::field(field, missing));
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| AppError::field(field, "Please enter a valid date"))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Creates a record; values are wiped on open and close.
    Add,
    /// Edits or shows an existing record; values are kept.
    Edit,
}

#[derive(Debug)]
struct ModalState {
    visible: bool,
    form: FormState,
}

/// A dialog holding one form. The modal id doubles as the form id for
/// field-error decorations.
#[derive(Debug)]
pub struct Modal {
    id: &'static str,
    kind: ModalKind,
    state: Mutex<ModalState>,
}

impl Modal {
    pub fn new(id: &'static str, kind: ModalKind) -> Self {
        Self {
            id,
            kind,
            state: Mutex::new(ModalState {
                visible: false,
                form: FormState::new(),
            }),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn kind(&self) -> ModalKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().visible
    }

    pub fn open(&self, view: &dyn View) {
        {
            let mut state = self.state.lock();
            if self.kind == ModalKind::Add {
                state.form.clear();
            }
            state.visible = true;
        }
        if self.kind == ModalKind::Add {
            view.clear_field_values(self.id);
        }
        view.clear_field_errors(self.id);
        view.set_modal_visible(self.id, true);
    }

    /// Open pre-filled, for edit dialogs.
    pub fn open_with(&self, view: &dyn View, values: &[(&str, String)]) {
        self.open(view);
        for (field, value) in values {
            self.set(view, field, value.clone());
        }
    }

    pub fn close(&self, view: &dyn View) {
        {
            let mut state = self.state.lock();
            state.visible = false;
            if self.kind == ModalKind::Add {
                state.form.clear();
            }
        }
        if self.kind == ModalKind::Add {
            view.clear_field_values(self.id);
        }
        view.set_modal_visible(self.id, false);
    }

    /// Escape closes an open modal. Returns whether the key was handled.
    pub fn handle_key(&self, view: &dyn View, key: &str) -> bool {
        if key == "Escape" && self.is_open() {
            self.close(view);
            return true;
        }
        false
    }

    /// A click outside the dialog body closes it.
    pub fn handle_backdrop_click(&self, view: &dyn View) {
        if self.is_open() {
            self.close(view);
        }
    }

    pub fn set(&self, view: &dyn View, field: &str, value: impl Into<String>) {
        let value = value.into();
        view.set_field_value(self.id, field, &value);
        self.state.lock().form.set(field, value);
    }

    pub fn form(&self) -> FormState {
        self.state.lock().form.clone()
    }

    /// Decorate the fields named by a validation error. Returns whether any
    /// field was decorated.
    pub fn show_errors(&self, view: &dyn View, err: &AppError) -> bool {
        view.clear_field_errors(self.id);
        for (field, message) in &err.field_errors {
            view.set_field_error(self.id, field, message);
        }
        !err.field_errors.is_empty()
    }
}
