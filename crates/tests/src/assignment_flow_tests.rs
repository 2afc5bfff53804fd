use axum::http::Method;
use chrono::Days;
use client::NoticeLevel;
use dashboard::pages::teacher::ASSIGNMENT_MODAL;
use dashboard::{HeadlessView, TeacherDashboard, TeacherTab};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{self, MockBackend, Reply};

fn fill_form(dashboard: &TeacherDashboard, view: &HeadlessView, due: &str) {
    let modal = dashboard.assignment_modal();
    modal.set(view, "title", "Algebra HW");
    modal.set(view, "class_id", "3");
    modal.set(view, "due_date", due);
    modal.set(view, "max_score", "100");
}

#[tokio::test]
async fn test_create_assignment_posts_once_and_rerenders_grid() {
    let backend = MockBackend::start().await;
    let due = common::today() + Days::new(1);
    let created = common::assignment_json(7, "Algebra HW", 3, due);
    backend
        .on_get("/teacher/assignments", Reply::json(json!([])))
        .on_get("/teacher/assignments", Reply::json(json!([created.clone()])))
        .on_post("/teacher/assignments", Reply::json(created));
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(
        t.client.clone(),
        t.view.clone(),
        Some("?tab=assignments"),
    );

    dashboard.controller().start().await;
    assert!(t.view.region("assignments").is_some_and(|c| !c.contains_text("Algebra HW")));

    dashboard.open_create_assignment();
    assert!(t.view.is_modal_visible(ASSIGNMENT_MODAL));
    fill_form(&dashboard, &t.view, &due.format("%Y-%m-%d").to_string());
    dashboard.submit_create_assignment().await.unwrap();

    let posts = backend.requests_to(Method::POST, "/teacher/assignments");
    assert_eq!(posts.len(), 1);
    let body = posts[0].json();
    assert_eq!(body["title"], "Algebra HW");
    assert_eq!(body["class_id"], 3);
    assert_eq!(body["due_date"], "2026-03-11");
    assert_eq!(body["max_score"], 100.0);

    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["Assignment created successfully".to_string()]
    );
    assert!(!t.view.is_modal_visible(ASSIGNMENT_MODAL));
    assert_eq!(dashboard.controller().current_tab(), TeacherTab::Assignments);
    let grid = t.view.region("assignments").unwrap();
    assert!(grid.contains_text("Algebra HW"));
    assert_eq!(grid.item_count(), 1);
}

#[tokio::test]
async fn test_past_due_date_is_rejected_without_network_call() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard.open_create_assignment();
    let yesterday = common::today() - Days::new(1);
    fill_form(&dashboard, &t.view, &yesterday.format("%Y-%m-%d").to_string());
    let err = dashboard.submit_create_assignment().await.unwrap_err();

    assert!(err.is_validation());
    assert!(backend.requests().is_empty());
    assert_eq!(
        t.view.field_error(ASSIGNMENT_MODAL, "due_date").as_deref(),
        Some("Due date cannot be in the past")
    );
    assert!(t.view.is_modal_visible(ASSIGNMENT_MODAL));
    assert_eq!(t.notifier.count(NoticeLevel::Error), 1);
}

#[tokio::test]
async fn test_missing_class_is_flagged_inline() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard.open_create_assignment();
    let modal = dashboard.assignment_modal();
    modal.set(t.view.as_ref(), "title", "Essay");
    modal.set(t.view.as_ref(), "due_date", "2026-04-01");
    dashboard.submit_create_assignment().await.unwrap_err();

    assert!(t.view.field_error(ASSIGNMENT_MODAL, "class_id").is_some());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_reopening_add_modal_clears_previous_input() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard.open_create_assignment();
    fill_form(&dashboard, &t.view, "2020-01-01");
    dashboard.submit_create_assignment().await.unwrap_err();
    assert!(dashboard.assignment_modal().handle_key(t.view.as_ref(), "Escape"));
    assert_eq!(t.view.field_value(ASSIGNMENT_MODAL, "title"), None);

    dashboard.open_create_assignment();
    assert!(dashboard.assignment_modal().form().is_empty());
    assert_eq!(t.view.field_value(ASSIGNMENT_MODAL, "title"), None);
    assert_eq!(t.view.field_value(ASSIGNMENT_MODAL, "due_date"), None);
    assert_eq!(t.view.field_error(ASSIGNMENT_MODAL, "due_date"), None);
}

#[tokio::test]
async fn test_backdrop_close_empties_rendered_inputs() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "teacher");
    let dashboard = TeacherDashboard::new(t.client.clone(), t.view.clone(), None);

    dashboard.open_create_assignment();
    fill_form(&dashboard, &t.view, "2026-04-01");
    assert_eq!(
        t.view.field_value(ASSIGNMENT_MODAL, "title").as_deref(),
        Some("Algebra HW")
    );
    dashboard
        .assignment_modal()
        .handle_backdrop_click(t.view.as_ref());

    let snapshot = t.view.snapshot();
    assert!(!snapshot.field_values.contains_key(ASSIGNMENT_MODAL));
    assert!(backend.requests().is_empty());
}
