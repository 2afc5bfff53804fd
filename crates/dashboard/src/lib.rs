//! Headless dashboard controllers.
//!
//! Each role dashboard pairs a [`Controller`] over its [`Page`] with the
//! form flows of that role. Everything renders through the [`View`] trait,
//! so the same controllers drive a real UI or the in-memory
//! [`HeadlessView`].

pub mod controller;
pub mod login;
pub mod modal;
pub mod pages;
pub mod render;
pub mod tabs;
pub mod toast;
pub mod view;

pub use controller::{Controller, LoadOutcome, Page};
pub use login::LoginController;
pub use modal::{FormState, Modal, ModalKind};
pub use pages::{
    AdminDashboard, AdminTab, ParentDashboard, ParentTab, StudentDashboard, StudentTab,
    TeacherDashboard, TeacherTab,
};
pub use render::{Card, Content, Stat, Table};
pub use tabs::{TabKind, TabState};
pub use toast::ToastTray;
pub use view::{HeadlessView, View, ViewSnapshot};
