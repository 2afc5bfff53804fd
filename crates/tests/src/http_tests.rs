use std::time::Duration;

use axum::http::{Method, StatusCode};
use client::{ApiRequest, ApiResponse, NoticeLevel};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::{AppErrorKind, UploadFile};

use crate::common::{self, MockBackend, Reply};

#[tokio::test]
async fn test_authenticated_request_headers() {
    let backend = MockBackend::start().await;
    backend.on_get("/teacher/classes", Reply::json(json!([])));
    let t = common::signed_in(&backend, "teacher");

    t.client.teacher().classes().await;

    let sent = backend.requests_to(Method::GET, "/teacher/classes");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].header("authorization").as_deref(), Some("Bearer test-token"));
    assert_eq!(sent[0].header("content-type").as_deref(), Some("application/json"));
    assert_eq!(sent[0].header("accept").as_deref(), Some("application/json"));
    assert!(sent[0].header("x-request-id").is_some());
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let backend = MockBackend::start().await;
    backend.on_get("/teacher/classes", Reply::json(json!([])));
    let t = common::signed_in(&backend, "teacher");

    t.client.teacher().classes().await;
    t.client.teacher().classes().await;

    let ids: Vec<_> = backend
        .requests()
        .iter()
        .filter_map(|r| r.header("x-request-id"))
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_multipart_upload_keeps_transport_content_type() {
    let backend = MockBackend::start().await;
    backend.on_post("/upload", Reply::json(json!({ "ok": true })));
    let t = common::signed_in(&backend, "student");

    let file = UploadFile {
        file_name: "essay.txt".into(),
        mime_type: "text/plain".into(),
        bytes: b"hello".to_vec(),
    };
    let request = ApiRequest::post("/upload")
        .multipart(vec![("content".into(), "see file".into())], vec![("file".into(), file)]);
    t.client.http().send(request).await.unwrap();

    let sent = &backend.requests_to(Method::POST, "/upload")[0];
    let content_type = sent.header("content-type").unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="), "{content_type}");
    let body = sent.body_text();
    assert!(body.contains("filename=\"essay.txt\""));
    assert!(body.contains("see file"));
}

#[tokio::test]
async fn test_text_response_returned_raw() {
    let backend = MockBackend::start().await;
    backend.on_get("/health", Reply::text("ok"));
    let t = common::signed_in(&backend, "admin");

    let response = t.client.http().send(ApiRequest::get("/health")).await.unwrap();

    assert_eq!(response, ApiResponse::Text("ok".into()));
}

#[tokio::test]
async fn test_query_parameters_are_encoded() {
    let backend = MockBackend::start().await;
    backend.on_get("/search", Reply::json(json!([])));
    let t = common::signed_in(&backend, "admin");

    t.client
        .http()
        .send(ApiRequest::get("/search").query("search", "Ana María").query("page", 2))
        .await
        .unwrap();

    let sent = &backend.requests_to(Method::GET, "/search")[0];
    assert_eq!(sent.query.as_deref(), Some("search=Ana+Mar%C3%ADa&page=2"));
}

#[tokio::test]
async fn test_server_detail_becomes_error_message() {
    let backend = MockBackend::start().await;
    backend.on_get(
        "/teacher/classes/7",
        Reply::status_json(StatusCode::NOT_FOUND, json!({ "detail": "Class not found" })),
    );
    let t = common::signed_in(&backend, "teacher");

    let err = t.client.teacher().class(7).await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::NotFound);
    assert_eq!(err.message, "Class not found");
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec!["Class not found".to_string()]
    );
    assert!(t.client.session().is_authenticated());
}

#[tokio::test]
async fn test_bodyless_failure_names_method_and_path() {
    let backend = MockBackend::start().await;
    backend.on_get("/admin/stats", Reply::status(StatusCode::INTERNAL_SERVER_ERROR));
    let t = common::signed_in(&backend, "admin");

    let err = t.client.admin().stats().await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::InternalError);
    assert_eq!(err.message, "Request failed: GET /admin/stats");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let backend = MockBackend::start().await;
    backend.on_get(
        "/admin/stats",
        Reply::json(json!({})).delayed(Duration::from_millis(1500)),
    );
    let mut config = common::test_config(&backend);
    config.api.timeout_secs = 1;
    let t = common::test_client_with(config);
    common::sign_in(&t.client, "admin");

    let err = t.client.admin().stats().await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Timeout);
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec!["Request timed out. The server is taking too long to respond.".to_string()]
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = MockBackend::start().await;
    let mut config = common::test_config(&backend);
    config.api.base_url = format!("http://{addr}");
    let t = common::test_client_with(config);
    common::sign_in(&t.client, "admin");

    let err = t.client.admin().stats().await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Network);
    assert_eq!(t.notifier.count(NoticeLevel::Error), 1);
    assert!(t.client.session().is_authenticated());
}

#[tokio::test]
async fn test_list_reads_degrade_to_empty() {
    let backend = MockBackend::start().await;
    backend.on_get("/student/grades", Reply::status(StatusCode::SERVICE_UNAVAILABLE));
    let t = common::signed_in(&backend, "student");

    let grades = t.client.student().grades().await;

    assert!(grades.is_empty());
    assert_eq!(t.notifier.count(NoticeLevel::Error), 1);
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let backend = MockBackend::start().await;
    backend.on_get("/admin/stats", Reply::json(json!({ "students": "many" })));
    let t = common::signed_in(&backend, "admin");

    let err = t.client.admin().stats().await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Decode);
    assert_eq!(t.notifier.count(NoticeLevel::Error), 1);
}
