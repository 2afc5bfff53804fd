use axum::http::{Method, StatusCode};
use client::session::keys;
use client::{KeyValueStore, NoticeLevel, Route};
use dashboard::LoginController;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::UserRole;

use crate::common::{self, MockBackend, Reply};

fn token_reply(role: &str) -> Reply {
    Reply::json(json!({
        "access_token": "fresh-token",
        "token_type": "bearer",
        "user_role": role,
    }))
}

#[tokio::test]
async fn test_login_redirects_to_role_dashboard() {
    let backend = MockBackend::start().await;
    backend.on_post("/auth/token", token_reply("teacher"));
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());

    let role = login
        .submit("teacher@school.edu", "secret", false)
        .await
        .unwrap();

    assert_eq!(role, UserRole::Teacher);
    assert_eq!(t.navigator.last(), Some(Route::Dashboard(UserRole::Teacher)));
    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["Login successful! Redirecting...".to_string()]
    );
    assert_eq!(t.client.session().token().as_deref(), Some("fresh-token"));

    let sent = backend.requests_to(Method::POST, "/auth/token");
    assert_eq!(sent.len(), 1);
    let body = sent[0].body_text();
    assert!(body.contains("username=teacher%40school.edu"), "{body}");
    assert!(body.contains("password=secret"), "{body}");
    assert!(sent[0].header("authorization").is_none());
}

#[tokio::test]
async fn test_role_field_accepted_under_either_name() {
    let backend = MockBackend::start().await;
    backend.on_post(
        "/auth/token",
        Reply::json(json!({ "access_token": "t", "role": "Parent" })),
    );
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());

    let role = login.submit("p@school.edu", "pw", false).await.unwrap();

    assert_eq!(role, UserRole::Parent);
    assert_eq!(t.navigator.last(), Some(Route::Dashboard(UserRole::Parent)));
}

#[tokio::test]
async fn test_unknown_role_stays_on_login() {
    let backend = MockBackend::start().await;
    backend.on_post("/auth/token", token_reply("janitor"));
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());

    let err = login.submit("j@school.edu", "pw", false).await.unwrap_err();

    assert_eq!(err.code.as_deref(), Some(client::api::auth::UNKNOWN_ROLE));
    assert!(t.navigator.routes().is_empty());
    assert!(!t.client.session().is_authenticated());
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec!["Invalid user role received from server".to_string()]
    );
}

#[tokio::test]
async fn test_bad_credentials_show_server_message() {
    let backend = MockBackend::start().await;
    backend.on_post(
        "/auth/token",
        Reply::status_json(
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Incorrect email or password" }),
        ),
    );
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());

    let err = login
        .submit("teacher@school.edu", "wrong", false)
        .await
        .unwrap_err();

    assert!(err.kind.is_auth());
    assert!(t.navigator.routes().is_empty());
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec!["Incorrect email or password".to_string()]
    );
}

#[tokio::test]
async fn test_invalid_email_flagged_without_request() {
    let backend = MockBackend::start().await;
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());

    let err = login.submit("not-an-email", "pw", false).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        t.view.field_error("login", "email").as_deref(),
        Some("Please enter a valid email address")
    );
    assert!(backend.requests().is_empty());
    assert_eq!(t.notifier.count(NoticeLevel::Error), 1);
}

#[tokio::test]
async fn test_remember_me_persists_token_and_email() {
    let backend = MockBackend::start().await;
    backend.on_post("/auth/token", token_reply("student"));
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());

    login.submit("s@school.edu", "pw", true).await.unwrap();

    let session = t.client.session();
    let persistent = session.persistent_store();
    assert_eq!(persistent.get(keys::TOKEN).as_deref(), Some("fresh-token"));
    assert_eq!(session.remembered_email().as_deref(), Some("s@school.edu"));
    assert!(session.scoped_store().get(keys::TOKEN).is_none());

    // The next visit to the login page sees the remembered email.
    session.clear_credentials();
    let again = LoginController::new(t.client.clone(), t.view.clone());
    assert_eq!(again.start(), None);
    assert_eq!(
        t.view.field_value("login", "email").as_deref(),
        Some("s@school.edu")
    );
}

#[tokio::test]
async fn test_signed_in_user_skips_login_page() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "admin");
    let login = LoginController::new(t.client.clone(), t.view.clone());

    assert_eq!(login.start(), Some(UserRole::Admin));
    assert_eq!(t.navigator.last(), Some(Route::Dashboard(UserRole::Admin)));
}

#[tokio::test]
async fn test_expired_token_clears_session_from_any_endpoint() {
    let backend = MockBackend::start().await;
    let rejected = || {
        Reply::status_json(
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Could not validate credentials" }),
        )
    };
    backend
        .on_get("/teacher/dashboard/stats", rejected())
        .on_get("/student/dashboard", rejected())
        .on_get("/parent/fees", rejected())
        .on_get("/admin/stats", rejected());

    let t = common::signed_in(&backend, "teacher");
    let err = t.client.teacher().dashboard_stats().await.unwrap_err();
    assert!(err.kind.is_auth());
    assert!(t.client.session().token().is_none());
    assert_eq!(t.navigator.last(), Some(Route::Login));

    common::sign_in(&t.client, "student");
    assert!(t.client.student().dashboard().await.is_err());
    assert!(t.client.session().token().is_none());

    common::sign_in(&t.client, "parent");
    assert!(t.client.parent().fees().await.is_err());
    assert!(t.client.session().token().is_none());

    common::sign_in(&t.client, "admin");
    assert!(t.client.admin().stats().await.is_err());
    assert!(t.client.session().token().is_none());

    assert_eq!(t.navigator.routes(), vec![Route::Login; 4]);
    assert!(t
        .notifier
        .messages(NoticeLevel::Error)
        .iter()
        .all(|m| m == "Your session has expired. Please log in again."));
}

#[tokio::test]
async fn test_forbidden_also_ends_session() {
    let backend = MockBackend::start().await;
    backend.on_get("/admin/stats", Reply::status(StatusCode::FORBIDDEN));
    let t = common::signed_in(&backend, "admin");

    t.client.admin().stats().await.unwrap_err();

    assert!(!t.client.session().is_authenticated());
    assert_eq!(t.navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_missing_token_makes_no_request() {
    let backend = MockBackend::start().await;
    let t = common::test_client(&backend);

    let err = t.client.teacher().dashboard_stats().await.unwrap_err();

    assert!(err.kind.is_auth());
    assert!(backend.requests().is_empty());
    assert_eq!(t.navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_logout_keeps_remembered_email() {
    let backend = MockBackend::start().await;
    backend.on_post("/auth/token", token_reply("parent"));
    let t = common::test_client(&backend);
    let login = LoginController::new(t.client.clone(), t.view.clone());
    login.submit("p@school.edu", "pw", true).await.unwrap();

    login.logout();

    let session = t.client.session();
    assert!(session.token().is_none());
    assert!(session.role().is_none());
    assert_eq!(session.remembered_email().as_deref(), Some("p@school.edu"));
    assert_eq!(t.navigator.last(), Some(Route::Login));
}
