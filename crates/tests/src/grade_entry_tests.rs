use axum::http::Method;
use client::NoticeLevel;
use dashboard::pages::teacher::GRADE_FORM;
use dashboard::TeacherDashboard;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::AttendanceStatus;

use crate::common::{self, MockBackend, Reply};

const GRADES_PATH: &str = "/teacher/classes/3/grades";

#[tokio::test]
async fn test_out_of_range_score_never_reaches_server() {
    let backend = MockBackend::start().await;
    backend.on_post(GRADES_PATH, Reply::json(json!({ "message": "Grade saved" })));
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    let err = dashboard
        .record_grade(3, 11, 21, "150", "")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(backend.count(Method::POST, GRADES_PATH), 0);
    assert_eq!(
        t.view.field_error(GRADE_FORM, "score").as_deref(),
        Some("Score must be between 0 and 100")
    );
    assert_eq!(t.notifier.count(NoticeLevel::Error), 1);
}

#[tokio::test]
async fn test_valid_score_is_sent() {
    let backend = MockBackend::start().await;
    backend.on_post(GRADES_PATH, Reply::json(json!({ "message": "Grade saved" })));
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard
        .record_grade(3, 11, 21, "85", "Good work")
        .await
        .unwrap();

    let posts = backend.requests_to(Method::POST, GRADES_PATH);
    assert_eq!(posts.len(), 1);
    let body = posts[0].json();
    assert_eq!(body["score"], 85.0);
    assert_eq!(body["student_id"], 21);
    assert_eq!(body["assignment_id"], 11);
    assert_eq!(body["comment"], "Good work");
    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["Grade saved successfully".to_string()]
    );
    assert_eq!(t.view.field_error(GRADE_FORM, "score"), None);
}

#[tokio::test]
async fn test_non_numeric_score_is_flagged() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard.record_grade(3, 11, 21, "A+", "").await.unwrap_err();

    assert!(backend.requests().is_empty());
    assert_eq!(
        t.view.field_error(GRADE_FORM, "score").as_deref(),
        Some("Score must be a number")
    );
}

#[tokio::test]
async fn test_attendance_batch_is_posted_for_today() {
    let backend = MockBackend::start().await;
    backend.on_post(
        "/teacher/classes/3/attendance",
        Reply::json(json!({ "message": "Attendance recorded" })),
    );
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard
        .mark_attendance(
            3,
            &[(21, AttendanceStatus::Present), (22, AttendanceStatus::Late)],
        )
        .await
        .unwrap();

    let posts = backend.requests_to(Method::POST, "/teacher/classes/3/attendance");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].json(),
        json!([
            { "class_id": 3, "student_id": 21, "date": "2026-03-10", "status": "present" },
            { "class_id": 3, "student_id": 22, "date": "2026-03-10", "status": "late" },
        ])
    );
}

#[tokio::test]
async fn test_empty_attendance_batch_is_rejected() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    let err = dashboard.mark_attendance(3, &[]).await.unwrap_err();

    assert!(err.is_validation());
    assert!(backend.requests().is_empty());
}
