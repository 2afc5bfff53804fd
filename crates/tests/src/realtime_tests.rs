use std::time::Duration;

use axum::http::{Method, StatusCode};
use client::realtime::GAVE_UP_MESSAGE;
use client::{ListenerStatus, NoticeLevel};
use dashboard::{Content, TeacherDashboard, TeacherTab};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::{GradeChange, RealtimeEvent};

use crate::common::{self, MockBackend, Reply, TestClient};

const STREAM_PATH: &str = "/notifications/stream";

/// A client whose listener waits a long time before reconnecting, so a
/// finished stream is not replayed during the test.
fn patient_client(backend: &MockBackend) -> TestClient {
    let mut config = common::test_config(backend);
    config.realtime.initial_retry_ms = 60_000;
    config.realtime.max_retry_ms = 60_000;
    let t = common::test_client_with(config);
    common::sign_in(&t.client, "teacher");
    t
}

#[tokio::test]
async fn test_unknown_event_type_is_skipped() {
    let backend = MockBackend::start().await;
    backend.on_get(
        STREAM_PATH,
        Reply::events(&[
            r#"{"type":"library_overdue","book":"Dune"}"#,
            r#"{"type":"grade_update","class_id":3,"student_id":7,"score":91.0}"#,
        ]),
    );
    let t = patient_client(&backend);
    let mut events = t.client.bus().subscribe();

    let listener = t.client.start_realtime().unwrap();
    let received = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within timeout")
        .unwrap();

    assert_eq!(
        received,
        RealtimeEvent::GradeUpdate(GradeChange {
            class_id: Some(3),
            student_id: Some(7),
            score: Some(91.0),
            ..Default::default()
        })
    );
    assert!(events.try_recv().is_err());
    listener.shutdown().await;
}

#[tokio::test]
async fn test_stream_request_carries_token() {
    let backend = MockBackend::start().await;
    backend.on_get(STREAM_PATH, Reply::events(&[]));
    let t = patient_client(&backend);

    let listener = t.client.start_realtime().unwrap();
    listener
        .wait_for(|s| matches!(s, ListenerStatus::Reconnecting { .. }))
        .await;

    let sent = &backend.requests_to(Method::GET, STREAM_PATH)[0];
    assert_eq!(sent.query.as_deref(), Some("token=test-token"));
    assert_eq!(sent.header("accept").as_deref(), Some("text/event-stream"));
    listener.shutdown().await;
}

#[tokio::test]
async fn test_listener_gives_up_after_repeated_failures() {
    let backend = MockBackend::start().await;
    backend.on_get(STREAM_PATH, Reply::status(StatusCode::SERVICE_UNAVAILABLE));
    let t = common::signed_in(&backend, "student");

    let listener = t.client.start_realtime().unwrap();
    let status = tokio::time::timeout(
        Duration::from_secs(2),
        listener.wait_for(ListenerStatus::is_terminal),
    )
    .await
    .expect("listener settles");

    assert_eq!(status, ListenerStatus::GaveUp);
    assert_eq!(backend.count(Method::GET, STREAM_PATH), 3);
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec![GAVE_UP_MESSAGE.to_string()]
    );
}

#[tokio::test]
async fn test_rejected_token_stops_listener() {
    let backend = MockBackend::start().await;
    backend.on_get(STREAM_PATH, Reply::status(StatusCode::UNAUTHORIZED));
    let t = common::signed_in(&backend, "parent");

    let listener = t.client.start_realtime().unwrap();
    let status = tokio::time::timeout(
        Duration::from_secs(2),
        listener.wait_for(ListenerStatus::is_terminal),
    )
    .await
    .expect("listener settles");

    assert_eq!(status, ListenerStatus::Unauthorized);
    assert_eq!(backend.count(Method::GET, STREAM_PATH), 1);
    assert_eq!(t.notifier.count(NoticeLevel::Error), 0);
}

#[tokio::test]
async fn test_disabled_realtime_starts_nothing() {
    let backend = MockBackend::start().await;
    let mut config = common::test_config(&backend);
    config.realtime.enabled = false;
    let t = common::test_client_with(config);

    assert!(t.client.start_realtime().is_none());
}

#[tokio::test]
async fn test_pushed_grade_refreshes_grades_tab() {
    let backend = MockBackend::start().await;
    let grade = |score: f64| {
        json!([{
            "student_id": 7,
            "student_name": "Ana Lopez",
            "class_id": 3,
            "assignment_id": 1,
            "score": score,
            "max_score": 100.0,
            "status": "graded",
        }])
    };
    backend
        .on_get(
            "/teacher/classes",
            Reply::json(json!([common::class_json(3, "Algebra I")])),
        )
        .on_get("/teacher/classes/3/grades", Reply::json(grade(70.0)))
        .on_get("/teacher/classes/3/grades", Reply::json(grade(91.0)))
        .on_get(
            STREAM_PATH,
            Reply::events(&[r#"{"type":"grade_update","class_id":3,"student_id":7,"score":91.0}"#]),
        );
    let t = patient_client(&backend);
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), Some("tab=grades"));
    dashboard.controller().start().await;
    assert!(t.view.region("grades").unwrap().contains_text("70/100"));

    let mut events = t.client.bus().subscribe();
    let listener = t.client.start_realtime().unwrap();
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within timeout")
        .unwrap();

    assert!(dashboard.controller().handle_event(&event).await);
    let Some(Content::Table(table)) = t.view.region("grades") else {
        panic!("grades region should hold a table");
    };
    assert_eq!(table.rows[0][1], "91/100");
    assert_eq!(
        t.notifier.messages(NoticeLevel::Info),
        vec!["A new grade has been posted".to_string()]
    );
    listener.shutdown().await;
}

#[tokio::test]
async fn test_unrelated_event_only_notifies() {
    let backend = MockBackend::start().await;
    backend.on_get(
        "/teacher/classes",
        Reply::json(json!([common::class_json(3, "Algebra I")])),
    );
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);
    dashboard.controller().activate(TeacherTab::Classes).await;

    let event = RealtimeEvent::decode(r#"{"type":"grade_update","class_id":3}"#)
        .unwrap()
        .unwrap();
    assert!(!dashboard.controller().handle_event(&event).await);

    assert_eq!(backend.count(Method::GET, "/teacher/classes"), 1);
    assert_eq!(t.notifier.count(NoticeLevel::Info), 1);
}
