use std::sync::Arc;

use shared_types::{
    Announcement, AppError, ChildSummary, Fee, Grade, Message, NewMessage, SchoolClass, User,
};

use super::or_empty;
use crate::http::HttpClient;

/// Endpoints under `/parent`.
#[derive(Clone)]
pub struct ParentApi {
    http: Arc<HttpClient>,
}

impl ParentApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn children(&self) -> Vec<ChildSummary> {
        or_empty("children", self.http.get("/parent/children")).await
    }

    pub async fn announcements(&self) -> Vec<Announcement> {
        or_empty("announcements", self.http.get("/parent/announcements")).await
    }

    pub async fn child_grades(&self, child_id: i64) -> Result<Vec<Grade>, AppError> {
        self.http.get(&format!("/parent/grades/{child_id}")).await
    }

    pub async fn child_schedule(&self, child_id: i64) -> Result<Vec<SchoolClass>, AppError> {
        self.http.get(&format!("/parent/schedule/{child_id}")).await
    }

    pub async fn fees(&self) -> Result<Vec<Fee>, AppError> {
        self.http.get("/parent/fees").await
    }

    pub async fn messages(&self) -> Vec<Message> {
        or_empty("messages", self.http.get("/parent/messages")).await
    }

    pub async fn send_message(&self, message: &NewMessage) -> Result<Message, AppError> {
        message.check()?;
        self.http.post("/parent/messages", message).await
    }

    pub async fn profile(&self) -> Result<User, AppError> {
        self.http.get("/parent/profile").await
    }
}
