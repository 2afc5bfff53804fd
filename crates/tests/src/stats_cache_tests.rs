use axum::http::Method;
use client::session::keys;
use client::KeyValueStore;
use dashboard::{Content, TeacherDashboard};
use pretty_assertions::assert_eq;

use crate::common::{self, MockBackend, Reply};

const STATS_PATH: &str = "/teacher/dashboard/stats";

#[tokio::test]
async fn test_stats_served_from_cache_within_window() {
    let backend = MockBackend::start().await;
    backend
        .on_get(STATS_PATH, Reply::json(common::teacher_stats_json(40)))
        .on_get(STATS_PATH, Reply::json(common::teacher_stats_json(41)));
    let t = common::signed_in(&backend, "teacher");
    let teacher = t.client.teacher();

    let first = teacher.dashboard_stats().await.unwrap();
    t.clock.advance(chrono::Duration::seconds(120));
    let second = teacher.dashboard_stats().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_students, 40);
    assert_eq!(backend.count(Method::GET, STATS_PATH), 1);
}

#[tokio::test]
async fn test_stats_refetched_after_window_expires() {
    let backend = MockBackend::start().await;
    backend
        .on_get(STATS_PATH, Reply::json(common::teacher_stats_json(40)))
        .on_get(STATS_PATH, Reply::json(common::teacher_stats_json(41)));
    let t = common::signed_in(&backend, "teacher");
    let teacher = t.client.teacher();

    teacher.dashboard_stats().await.unwrap();
    teacher.dashboard_stats().await.unwrap();
    t.clock.advance(chrono::Duration::seconds(301));
    let third = teacher.dashboard_stats().await.unwrap();

    assert_eq!(third.total_students, 41);
    assert_eq!(backend.count(Method::GET, STATS_PATH), 2);
}

#[tokio::test]
async fn test_cache_entry_is_session_scoped_with_timestamp() {
    let backend = MockBackend::start().await;
    backend.on_get(STATS_PATH, Reply::json(common::teacher_stats_json(40)));
    let t = common::signed_in(&backend, "teacher");

    t.client.teacher().dashboard_stats().await.unwrap();

    let raw = t
        .client
        .session()
        .scoped_store()
        .get(keys::TEACHER_STATS)
        .unwrap();
    let entry: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(entry["value"]["total_students"], 40);
    assert_eq!(entry["timestamp"], common::start_time().timestamp_millis());
    assert!(t
        .client
        .session()
        .persistent_store()
        .get(keys::TEACHER_STATS)
        .is_none());
}

#[tokio::test]
async fn test_creating_assignment_invalidates_cached_stats() {
    let backend = MockBackend::start().await;
    let due = common::today() + chrono::Days::new(3);
    backend
        .on_get(STATS_PATH, Reply::json(common::teacher_stats_json(40)))
        .on_post(
            "/teacher/assignments",
            Reply::json(common::assignment_json(9, "Lab report", 3, due)),
        );
    let t = common::signed_in(&backend, "teacher");
    let teacher = t.client.teacher();

    teacher.dashboard_stats().await.unwrap();
    teacher
        .create_assignment(&shared_types::NewAssignment {
            title: "Lab report".into(),
            description: String::new(),
            class_id: 3,
            due_date: due,
            max_score: 50.0,
        })
        .await
        .unwrap();
    teacher.dashboard_stats().await.unwrap();

    assert_eq!(backend.count(Method::GET, STATS_PATH), 2);
}

#[tokio::test]
async fn test_dashboard_tab_renders_stats() {
    let backend = MockBackend::start().await;
    backend.on_get(STATS_PATH, Reply::json(common::teacher_stats_json(40)));
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard.controller().start().await;

    let Some(Content::Stats(stats)) = t.view.region("dashboard") else {
        panic!("dashboard region should show stats");
    };
    assert_eq!(stats[0].label, "Students");
    assert_eq!(stats[0].value, "40");
    assert_eq!(stats[3].value, "92.5%");
    assert!(!t.view.is_loading("dashboard"));
}
