use std::sync::Arc;

use serde_json::Value;
use shared_types::{
    AdminStats, AppError, ClassEnrollment, ClassUpdate, EnrollStudentsRequest, NewClass,
    NewPerson, PeopleQuery, PersonKind, PersonUpdate, SchoolClass, StudentPromotion, User,
};

use super::or_empty;
use crate::http::{ApiRequest, HttpClient};

/// Application code the backend attaches when a class still has students.
pub const CLASS_HAS_STUDENTS: &str = "class_has_students";

/// Endpoints under `/admin`.
#[derive(Clone)]
pub struct AdminApi {
    http: Arc<HttpClient>,
}

impl AdminApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn stats(&self) -> Result<AdminStats, AppError> {
        self.http.get("/admin/stats").await
    }

    // --- People ---

    pub async fn people(&self, kind: PersonKind, query: &PeopleQuery) -> Vec<User> {
        let request =
            ApiRequest::get(format!("/admin/{}", kind.segment())).query_pairs(query.pairs());
        or_empty(kind.segment(), self.http.fetch(request)).await
    }

    pub async fn person(&self, kind: PersonKind, id: i64) -> Result<User, AppError> {
        self.http
            .get(&format!("/admin/{}/{id}", kind.segment()))
            .await
    }

    #[tracing::instrument(skip(self, person))]
    pub async fn create_person(
        &self,
        kind: PersonKind,
        person: NewPerson,
    ) -> Result<User, AppError> {
        person.check()?;
        let person = person.normalized(kind);
        self.http
            .post(&format!("/admin/{}", kind.segment()), &person)
            .await
    }

    pub async fn update_person(
        &self,
        kind: PersonKind,
        id: i64,
        update: &PersonUpdate,
    ) -> Result<User, AppError> {
        update.check()?;
        self.http
            .put(&format!("/admin/{}/{id}", kind.segment()), update)
            .await
    }

    pub async fn delete_person(&self, kind: PersonKind, id: i64) -> Result<(), AppError> {
        self.http
            .delete(&format!("/admin/{}/{id}", kind.segment()))
            .await
    }

    // --- Parent links ---

    pub async fn parent_students(&self, parent_id: i64) -> Vec<User> {
        or_empty(
            "linked students",
            self.http.get(&format!("/admin/parents/{parent_id}/students")),
        )
        .await
    }

    pub async fn link_student(&self, parent_id: i64, student_id: i64) -> Result<Value, AppError> {
        self.http
            .fetch(ApiRequest::post(format!(
                "/admin/parents/{parent_id}/students/{student_id}"
            )))
            .await
    }

    pub async fn unlink_student(&self, parent_id: i64, student_id: i64) -> Result<(), AppError> {
        self.http
            .delete(&format!("/admin/parents/{parent_id}/students/{student_id}"))
            .await
    }

    /// Move a whole grade/section to another.
    pub async fn promote_students(
        &self,
        promotion: &StudentPromotion,
    ) -> Result<Vec<User>, AppError> {
        promotion.check()?;
        self.http.post("/admin/students/promote", promotion).await
    }

    // --- Classes ---

    pub async fn classes(&self) -> Vec<SchoolClass> {
        or_empty("classes", self.http.get("/admin/classes")).await
    }

    pub async fn class(&self, class_id: i64) -> Result<SchoolClass, AppError> {
        self.http.get(&format!("/admin/classes/{class_id}")).await
    }

    pub async fn create_class(&self, class: &NewClass) -> Result<SchoolClass, AppError> {
        class.check()?;
        self.http.post("/admin/classes", class).await
    }

    pub async fn update_class(
        &self,
        class_id: i64,
        update: &ClassUpdate,
    ) -> Result<SchoolClass, AppError> {
        update.check()?;
        self.http
            .put(&format!("/admin/classes/{class_id}"), update)
            .await
    }

    /// Delete a class. A class that still has students fails with code
    /// [`CLASS_HAS_STUDENTS`], which the caller presents.
    pub async fn delete_class(&self, class_id: i64) -> Result<(), AppError> {
        self.http
            .delete(&format!("/admin/classes/{class_id}"))
            .await
    }

    // --- Enrollments ---

    pub async fn enrollments(&self, class_id: i64) -> Vec<ClassEnrollment> {
        or_empty(
            "enrollments",
            self.http.get(&format!("/admin/classes/{class_id}/enrollments")),
        )
        .await
    }

    /// The backend takes the bare list of student ids as the body.
    pub async fn enroll_students(
        &self,
        class_id: i64,
        request: &EnrollStudentsRequest,
    ) -> Result<Vec<ClassEnrollment>, AppError> {
        request.check()?;
        self.http
            .post(
                &format!("/admin/classes/{class_id}/enrollments"),
                &request.student_ids,
            )
            .await
    }

    pub async fn remove_enrollment(&self, class_id: i64, student_id: i64) -> Result<(), AppError> {
        self.http
            .delete(&format!("/admin/classes/{class_id}/enrollments/{student_id}"))
            .await
    }
}
