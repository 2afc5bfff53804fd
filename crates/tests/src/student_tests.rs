use axum::http::Method;
use client::NoticeLevel;
use dashboard::pages::student::{FEEDBACK_MODAL, SUBMIT_MODAL};
use dashboard::{Content, StudentDashboard, StudentTab};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::UploadFile;

use crate::common::{self, MockBackend, Reply};

#[tokio::test]
async fn test_submission_uploads_notes_and_file() {
    let backend = MockBackend::start().await;
    backend.on_post(
        "/student/assignments/5/submit",
        Reply::json(json!({ "message": "Submission received", "submission_id": 44 })),
    );
    let t = common::signed_in(&backend, "student");
    let student = StudentDashboard::new(t.client.clone(), t.view.clone(), None);

    student.open_submit(5);
    student
        .submit_modal()
        .set(t.view.as_ref(), "content", "My answers are attached.");
    let file = UploadFile {
        file_name: "answers.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: b"%PDF-1.4".to_vec(),
    };
    student.submit_assignment(Some(file)).await.unwrap();

    let sent = &backend.requests_to(Method::POST, "/student/assignments/5/submit")[0];
    assert!(sent
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    assert_eq!(sent.header("authorization").as_deref(), Some("Bearer test-token"));
    let body = sent.body_text();
    assert!(body.contains("name=\"notes\""));
    assert!(body.contains("My answers are attached."));
    assert!(body.contains("filename=\"answers.pdf\""));
    assert!(body.to_lowercase().contains("content-type: application/pdf"));

    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["Submission received".to_string()]
    );
    assert!(!t.view.is_modal_visible(SUBMIT_MODAL));
}

#[tokio::test]
async fn test_empty_submission_is_rejected() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "student");
    let student = StudentDashboard::new(t.client.clone(), t.view.clone(), None);

    student.open_submit(5);
    let err = student.submit_assignment(None).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        t.view.field_error(SUBMIT_MODAL, "content").as_deref(),
        Some("Add an answer or attach a file")
    );
    assert!(t.view.is_modal_visible(SUBMIT_MODAL));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_feedback_rating_out_of_range() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "student");
    let student = StudentDashboard::new(t.client.clone(), t.view.clone(), None);
    let modal = student.feedback_modal();
    let view = t.view.as_ref();

    modal.open(view);
    modal.set(view, "subject", "Library hours");
    modal.set(view, "message", "Please open on Saturdays.");
    modal.set(view, "rating", "9");
    student.send_feedback().await.unwrap_err();

    assert_eq!(
        t.view.field_error(FEEDBACK_MODAL, "rating").as_deref(),
        Some("Rating must be between 1 and 5")
    );
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_overdue_pending_assignment_is_marked() {
    let backend = MockBackend::start().await;
    let mut late = common::assignment_json(1, "Essay", 3, common::today() - chrono::Days::new(2));
    late["status"] = json!("pending");
    let mut done = common::assignment_json(2, "Quiz", 3, common::today() - chrono::Days::new(2));
    done["status"] = json!("submitted");
    backend.on_get("/student/assignments", Reply::json(json!([late, done])));
    let t = common::signed_in(&backend, "student");
    let student = StudentDashboard::new(t.client.clone(), t.view.clone(), Some("tab=assignments"));

    student.controller().start().await;

    let Some(Content::Table(table)) = t.view.region("assignments") else {
        panic!("assignments region should hold a table");
    };
    assert_eq!(table.rows[0][3], "Overdue");
    assert_eq!(table.rows[1][3], "Submitted");
}

#[tokio::test]
async fn test_marking_notification_read_redraws_list() {
    let backend = MockBackend::start().await;
    backend
        .on_get(
            "/student/notifications",
            Reply::json(json!([
                { "id": 3, "title": "Exam moved", "message": "Now Friday", "read": false }
            ])),
        )
        .on_get(
            "/student/notifications",
            Reply::json(json!([
                { "id": 3, "title": "Exam moved", "message": "Now Friday", "read": true }
            ])),
        )
        .on_post("/student/notification/3/read", Reply::json(json!({ "ok": true })));
    let t = common::signed_in(&backend, "student");
    let student = StudentDashboard::new(t.client.clone(), t.view.clone(), None);
    student.controller().activate(StudentTab::Notifications).await;
    assert!(t.view.region("notifications").unwrap().contains_text("New"));

    student.mark_notification_read(3).await.unwrap();

    assert!(!t.view.region("notifications").unwrap().contains_text("New"));
    assert_eq!(backend.count(Method::GET, "/student/notifications"), 2);
}
