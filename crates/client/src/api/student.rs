use std::sync::Arc;

use serde_json::Value;
use shared_types::{
    AppError, Assignment, AttendanceMonth, AttendanceRecord, Feedback, Grade, Notification,
    SchoolClass, StudentDashboard, Submission, SubmissionReceipt, SubmissionUpload, User,
};

use super::or_empty;
use crate::http::{ApiRequest, HttpClient};

/// Endpoints under `/student`.
#[derive(Clone)]
pub struct StudentApi {
    http: Arc<HttpClient>,
}

impl StudentApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn profile(&self) -> Result<User, AppError> {
        self.http.get("/student/profile").await
    }

    pub async fn dashboard(&self) -> Result<StudentDashboard, AppError> {
        self.http.get("/student/dashboard").await
    }

    pub async fn schedule(&self) -> Vec<SchoolClass> {
        or_empty("schedule", self.http.get("/student/schedule")).await
    }

    pub async fn classes(&self) -> Vec<SchoolClass> {
        or_empty("classes", self.http.get("/student/classes")).await
    }

    /// Assignments, optionally filtered by status (`pending`, `submitted`, ...).
    pub async fn assignments(&self, status: Option<&str>) -> Vec<Assignment> {
        let mut request = ApiRequest::get("/student/assignments");
        if let Some(status) = status.filter(|s| !s.trim().is_empty()) {
            request = request.query("status", status.trim());
        }
        or_empty("assignments", self.http.fetch(request)).await
    }

    pub async fn assignment(&self, assignment_id: i64) -> Result<Assignment, AppError> {
        self.http
            .get(&format!("/student/assignment/{assignment_id}"))
            .await
    }

    /// Upload a submission as multipart form data: `notes` plus an
    /// optional `file` part.
    #[tracing::instrument(skip(self, upload))]
    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        upload: SubmissionUpload,
    ) -> Result<SubmissionReceipt, AppError> {
        upload.check()?;
        let fields = vec![("notes".to_string(), upload.content)];
        let files = upload
            .file
            .into_iter()
            .map(|file| ("file".to_string(), file))
            .collect();
        let request = ApiRequest::post(format!("/student/assignments/{assignment_id}/submit"))
            .multipart(fields, files);
        self.http.fetch(request).await
    }

    pub async fn submission(&self, assignment_id: i64) -> Result<Submission, AppError> {
        self.http
            .get(&format!("/student/submission/{assignment_id}"))
            .await
    }

    pub async fn grades(&self) -> Vec<Grade> {
        or_empty("grades", self.http.get("/student/grades")).await
    }

    pub async fn class_grades(&self, class_id: i64) -> Vec<Grade> {
        or_empty("class grades", self.http.get(&format!("/student/grades/{class_id}"))).await
    }

    pub async fn attendance(&self) -> Vec<AttendanceRecord> {
        or_empty("attendance", self.http.get("/student/attendance")).await
    }

    pub async fn attendance_for_month(
        &self,
        month: AttendanceMonth,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        month.check()?;
        self.http
            .get(&format!("/student/attendance/{}/{}", month.year, month.month))
            .await
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        or_empty("notifications", self.http.get("/student/notifications")).await
    }

    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<(), AppError> {
        self.http
            .execute(ApiRequest::post(format!(
                "/student/notification/{notification_id}/read"
            )))
            .await
    }

    pub async fn send_feedback(&self, feedback: &Feedback) -> Result<Value, AppError> {
        feedback.check()?;
        self.http.post("/student/feedback", feedback).await
    }
}
