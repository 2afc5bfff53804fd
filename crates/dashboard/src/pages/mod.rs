pub mod admin;
pub mod parent;
pub mod student;
pub mod teacher;

pub use admin::{AdminDashboard, AdminPage, AdminTab};
pub use parent::{ParentDashboard, ParentPage, ParentTab};
pub use student::{StudentDashboard, StudentPage, StudentTab};
pub use teacher::{TeacherDashboard, TeacherPage, TeacherTab};

use client::Notifier;
use shared_types::AppError;

/// Surface what the HTTP layer leaves to the controllers: pre-flight
/// validation failures and coded application errors.
pub(crate) fn present_error(notifier: &dyn Notifier, err: &AppError) {
    if err.is_validation() || err.code.is_some() {
        notifier.error(&err.friendly_message());
    }
}
