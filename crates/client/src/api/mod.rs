pub mod admin;
pub mod auth;
pub mod parent;
pub mod student;
pub mod teacher;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use parent::ParentApi;
pub use student::StudentApi;
pub use teacher::TeacherApi;

use shared_types::AppError;
use std::future::Future;

/// Await a collection read, falling back to an empty list on failure so
/// the view can render its empty state. The failure has already been
/// reported by the HTTP layer; here it is only logged.
pub(crate) async fn or_empty<T>(
    what: &str,
    read: impl Future<Output = Result<Vec<T>, AppError>>,
) -> Vec<T> {
    match read.await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "{what} unavailable, showing empty list");
            Vec::new()
        }
    }
}
