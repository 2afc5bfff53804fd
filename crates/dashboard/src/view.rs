//! The surface controllers draw on.
//!
//! A host UI implements [`View`] against its widget tree. [`HeadlessView`]
//! keeps the same state in memory, which is what the tests assert on.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::render::Content;

pub trait View: Send + Sync {
    /// Mark a tab button and its panel active or inactive.
    fn set_tab_active(&self, tab: &str, active: bool);

    fn set_loading(&self, region: &str, loading: bool);

    /// Replace whatever the region currently shows.
    fn render(&self, region: &str, content: Content);

    fn set_field_error(&self, form: &str, field: &str, message: &str);

    fn clear_field_errors(&self, form: &str);

    fn set_field_value(&self, form: &str, field: &str, value: &str);

    /// Empty every input of a form.
    fn clear_field_values(&self, form: &str);

    fn set_modal_visible(&self, modal: &str, visible: bool);
}

/// Observable state of a [`HeadlessView`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    pub active_tabs: BTreeMap<String, bool>,
    pub loading: BTreeSet<String>,
    pub regions: BTreeMap<String, Content>,
    pub field_errors: BTreeMap<String, BTreeMap<String, String>>,
    pub field_values: BTreeMap<String, BTreeMap<String, String>>,
    pub modals: BTreeMap<String, bool>,
}

impl ViewSnapshot {
    pub fn active_tab(&self) -> Option<&str> {
        let mut active = self
            .active_tabs
            .iter()
            .filter(|(_, on)| **on)
            .map(|(tab, _)| tab.as_str());
        match (active.next(), active.next()) {
            (Some(tab), None) => Some(tab),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct HeadlessView {
    state: RwLock<ViewSnapshot>,
    renders: RwLock<BTreeMap<String, usize>>,
}

impl HeadlessView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.read().clone()
    }

    pub fn region(&self, region: &str) -> Option<Content> {
        self.state.read().regions.get(region).cloned()
    }

    pub fn is_loading(&self, region: &str) -> bool {
        self.state.read().loading.contains(region)
    }

    pub fn is_tab_active(&self, tab: &str) -> bool {
        self.state
            .read()
            .active_tabs
            .get(tab)
            .copied()
            .unwrap_or(false)
    }

    pub fn field_error(&self, form: &str, field: &str) -> Option<String> {
        self.state
            .read()
            .field_errors
            .get(form)
            .and_then(|errors| errors.get(field))
            .cloned()
    }

    pub fn field_value(&self, form: &str, field: &str) -> Option<String> {
        self.state
            .read()
            .field_values
            .get(form)
            .and_then(|values| values.get(field))
            .cloned()
    }

    pub fn is_modal_visible(&self, modal: &str) -> bool {
        self.state.read().modals.get(modal).copied().unwrap_or(false)
    }

    /// How many times a region has been rendered, placeholders included.
    pub fn render_count(&self, region: &str) -> usize {
        self.renders.read().get(region).copied().unwrap_or(0)
    }
}

impl View for HeadlessView {
    fn set_tab_active(&self, tab: &str, active: bool) {
        self.state.write().active_tabs.insert(tab.to_string(), active);
    }

    fn set_loading(&self, region: &str, loading: bool) {
        let mut state = self.state.write();
        if loading {
            state.loading.insert(region.to_string());
        } else {
            state.loading.remove(region);
        }
    }

    fn render(&self, region: &str, content: Content) {
        self.state.write().regions.insert(region.to_string(), content);
        *self.renders.write().entry(region.to_string()).or_default() += 1;
    }

    fn set_field_error(&self, form: &str, field: &str, message: &str) {
        self.state
            .write()
            .field_errors
            .entry(form.to_string())
            .or_default()
            .insert(field.to_string(), message.to_string());
    }

    fn clear_field_errors(&self, form: &str) {
        self.state.write().field_errors.remove(form);
    }

    fn set_field_value(&self, form: &str, field: &str, value: &str) {
        self.state
            .write()
            .field_values
            .entry(form.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    fn clear_field_values(&self, form: &str) {
        self.state.write().field_values.remove(form);
    }

    fn set_modal_visible(&self, modal: &str, visible: bool) {
        self.state.write().modals.insert(modal.to_string(), visible);
    }
}
