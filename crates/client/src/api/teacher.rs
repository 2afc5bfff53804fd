use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use shared_types::{
    Activity, AppError, Assignment, AssignmentUpdate, AttendanceEntry, AttendanceRecord,
    AttendanceUpdate, ClassStats, EnrolledStudent, Grade, GradeComment, GradeEntry,
    NewAssignment, PersonUpdate, SchoolClass, Submission, SubmissionReview,
    TeacherDashboardStats, User,
};

use super::or_empty;
use crate::cache::SessionCache;
use crate::clock::Clock;
use crate::http::{ApiRequest, HttpClient};
use crate::session::keys;

/// Endpoints under `/teacher`.
#[derive(Clone)]
pub struct TeacherApi {
    http: Arc<HttpClient>,
    cache: Arc<SessionCache>,
    clock: Arc<dyn Clock>,
}

impl TeacherApi {
    pub fn new(http: Arc<HttpClient>, cache: Arc<SessionCache>, clock: Arc<dyn Clock>) -> Self {
        Self { http, cache, clock }
    }

    // --- Profile & dashboard ---

    pub async fn profile(&self) -> Result<User, AppError> {
        self.http.get("/teacher/profile").await
    }

    pub async fn update_profile(&self, update: &PersonUpdate) -> Result<User, AppError> {
        update.check()?;
        self.http.put("/teacher/profile", update).await
    }

    /// Dashboard aggregates, served from the session cache while fresh.
    pub async fn dashboard_stats(&self) -> Result<TeacherDashboardStats, AppError> {
        if let Some(stats) = self.cache.get(keys::TEACHER_STATS) {
            return Ok(stats);
        }
        self.refresh_dashboard_stats().await
    }

    /// Fetch the aggregates regardless of the cache and overwrite it.
    pub async fn refresh_dashboard_stats(&self) -> Result<TeacherDashboardStats, AppError> {
        let stats: TeacherDashboardStats = self.http.get("/teacher/dashboard/stats").await?;
        self.cache.put(keys::TEACHER_STATS, &stats);
        Ok(stats)
    }

    /// Drop the cached aggregates so the next read goes to the server.
    pub fn invalidate_dashboard_stats(&self) {
        self.cache.invalidate(keys::TEACHER_STATS);
    }

    pub async fn activities(&self) -> Vec<Activity> {
        or_empty("activities", self.http.get("/teacher/activities")).await
    }

    pub async fn schedule(&self) -> Vec<SchoolClass> {
        or_empty("schedule", self.http.get("/teacher/schedule")).await
    }

    // --- Classes ---

    pub async fn classes(&self) -> Vec<SchoolClass> {
        or_empty("classes", self.http.get("/teacher/classes")).await
    }

    pub async fn class(&self, class_id: i64) -> Result<SchoolClass, AppError> {
        self.http.get(&format!("/teacher/classes/{class_id}")).await
    }

    pub async fn class_students(&self, class_id: i64) -> Vec<EnrolledStudent> {
        or_empty(
            "class students",
            self.http.get(&format!("/teacher/classes/{class_id}/students")),
        )
        .await
    }

    pub async fn class_stats(&self, class_id: i64) -> Result<ClassStats, AppError> {
        self.http.get(&format!("/teacher/classes/{class_id}/stats")).await
    }

    pub async fn student(&self, student_id: i64) -> Result<User, AppError> {
        self.http.get(&format!("/teacher/students/{student_id}")).await
    }

    // --- Assignments ---

    pub async fn assignments(&self) -> Vec<Assignment> {
        or_empty("assignments", self.http.get("/teacher/assignments")).await
    }

    pub async fn assignment(&self, assignment_id: i64) -> Result<Assignment, AppError> {
        self.http
            .get(&format!("/teacher/assignments/{assignment_id}"))
            .await
    }

    pub async fn class_assignments(&self, class_id: i64) -> Vec<Assignment> {
        or_empty(
            "class assignments",
            self.http.get(&format!("/teacher/classes/{class_id}/assignments")),
        )
        .await
    }

    pub async fn assignment_submissions(&self, assignment_id: i64) -> Vec<Submission> {
        or_empty(
            "submissions",
            self.http
                .get(&format!("/teacher/assignments/{assignment_id}/submissions")),
        )
        .await
    }

    #[tracing::instrument(skip(self, assignment), fields(class_id = assignment.class_id))]
    pub async fn create_assignment(
        &self,
        assignment: &NewAssignment,
    ) -> Result<Assignment, AppError> {
        assignment.check(self.clock.today())?;
        let created: Assignment = self.http.post("/teacher/assignments", assignment).await?;
        self.cache.invalidate(keys::TEACHER_STATS);
        Ok(created)
    }

    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        update: &AssignmentUpdate,
    ) -> Result<Assignment, AppError> {
        update.check(self.clock.today())?;
        self.http
            .put(&format!("/teacher/assignments/{assignment_id}"), update)
            .await
    }

    pub async fn delete_assignment(&self, assignment_id: i64) -> Result<(), AppError> {
        self.http
            .delete(&format!("/teacher/assignments/{assignment_id}"))
            .await?;
        self.cache.invalidate(keys::TEACHER_STATS);
        Ok(())
    }

    // --- Grades ---

    /// Grade book of a class, optionally narrowed to one assignment.
    pub async fn class_grades(&self, class_id: i64, assignment_id: Option<i64>) -> Vec<Grade> {
        let mut request = ApiRequest::get(format!("/teacher/classes/{class_id}/grades"));
        if let Some(id) = assignment_id {
            request = request.query("assignment_id", id);
        }
        or_empty("grades", self.http.fetch(request)).await
    }

    #[tracing::instrument(
        skip(self, entry),
        fields(class_id = entry.class_id, student_id = entry.student_id)
    )]
    pub async fn record_grade(&self, entry: &GradeEntry) -> Result<Value, AppError> {
        entry.check()?;
        self.http
            .post(&format!("/teacher/classes/{}/grades", entry.class_id), entry)
            .await
    }

    pub async fn add_grade_comment(
        &self,
        class_id: i64,
        comment: &GradeComment,
    ) -> Result<Value, AppError> {
        comment.check()?;
        self.http
            .post(&format!("/teacher/classes/{class_id}/grades/comment"), comment)
            .await
    }

    // --- Attendance ---

    pub async fn attendance(&self, class_id: i64, date: NaiveDate) -> Vec<AttendanceRecord> {
        let request = ApiRequest::get(format!("/teacher/classes/{class_id}/attendance"))
            .query("date", date.format("%Y-%m-%d"));
        or_empty("attendance", self.http.fetch(request)).await
    }

    /// Submit a whole class's marks for one day.
    pub async fn mark_attendance(&self, entries: &[AttendanceEntry]) -> Result<Value, AppError> {
        AttendanceEntry::check_batch(entries)?;
        let class_id = entries[0].class_id;
        let result = self
            .http
            .post(&format!("/teacher/classes/{class_id}/attendance"), entries)
            .await?;
        self.cache.invalidate(keys::TEACHER_STATS);
        Ok(result)
    }

    pub async fn update_attendance(
        &self,
        attendance_id: i64,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, AppError> {
        update.check()?;
        self.http
            .put(&format!("/teacher/attendance/{attendance_id}"), update)
            .await
    }

    pub async fn student_attendance(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Vec<AttendanceRecord> {
        or_empty(
            "attendance history",
            self.http.get(&format!(
                "/teacher/classes/{class_id}/students/{student_id}/attendance"
            )),
        )
        .await
    }

    // --- Submissions ---

    pub async fn submission(&self, submission_id: i64) -> Result<Submission, AppError> {
        self.http
            .get(&format!("/teacher/submissions/{submission_id}"))
            .await
    }

    pub async fn review_submission(
        &self,
        submission_id: i64,
        review: &SubmissionReview,
    ) -> Result<Submission, AppError> {
        review.check()?;
        self.http
            .put(&format!("/teacher/submissions/{submission_id}"), review)
            .await
    }

    /// Download link for an uploaded file; the stored path is sent as a
    /// single encoded segment.
    pub fn submission_file_url(&self, file_path: &str) -> String {
        self.http.url(&format!(
            "/teacher/assignments/submissions/{}",
            urlencoding::encode(file_path)
        ))
    }
}
