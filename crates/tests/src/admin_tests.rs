use axum::http::{Method, StatusCode};
use client::NoticeLevel;
use dashboard::pages::admin::{CLASS_HAS_STUDENTS_MESSAGE, CLASS_MODAL, PERSON_MODAL};
use dashboard::{AdminDashboard, AdminTab};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::{PeopleQuery, PersonKind};

use crate::common::{self, MockBackend, Reply};

fn person_json(id: i64, name: &str, role: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": format!("{}@school.edu", name.to_lowercase().replace(' ', ".")),
        "full_name": name,
        "role": role,
        "is_active": true,
    })
}

#[tokio::test]
async fn test_create_teacher_sends_normalized_person() {
    let backend = MockBackend::start().await;
    backend
        .on_post("/admin/teachers", Reply::json(person_json(12, "Grace Hopper", "teacher")))
        .on_get(
            "/admin/teachers",
            Reply::json(json!([person_json(12, "Grace Hopper", "teacher")])),
        );
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);
    let modal = admin.person_modal();
    let view = t.view.as_ref();

    modal.open(view);
    modal.set(view, "full_name", "Grace Hopper");
    modal.set(view, "email", "grace.hopper@school.edu");
    modal.set(view, "password", "changeme");
    modal.set(view, "subject", "Computer Science");
    modal.set(view, "contact", "   ");
    admin.submit_person(PersonKind::Teacher).await.unwrap();

    let sent = backend.requests_to(Method::POST, "/admin/teachers");
    assert_eq!(sent.len(), 1);
    let body = sent[0].json();
    assert_eq!(body["role"], "teacher");
    assert_eq!(body["subject"], "Computer Science");
    assert_eq!(body["contact"], serde_json::Value::Null);
    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["Teacher added successfully".to_string()]
    );
    assert!(!t.view.is_modal_visible(PERSON_MODAL));
    assert_eq!(admin.controller().current_tab(), AdminTab::Teachers);
    assert!(t.view.region("teachers").unwrap().contains_text("Grace Hopper"));
}

#[tokio::test]
async fn test_invalid_phone_flagged_inline() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);
    let modal = admin.person_modal();
    let view = t.view.as_ref();

    modal.open(view);
    modal.set(view, "full_name", "Ada Lovelace");
    modal.set(view, "email", "ada@school.edu");
    modal.set(view, "contact", "5551234567");
    let err = admin.submit_person(PersonKind::Parent).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        t.view.field_error(PERSON_MODAL, "contact").as_deref(),
        Some("Invalid phone format (use: 123-456-7890)")
    );
    assert!(t.view.is_modal_visible(PERSON_MODAL));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_search_filters_people_listing() {
    let backend = MockBackend::start().await;
    backend.on_get("/admin/students", Reply::json(json!([])));
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), Some("tab=students"));
    admin.controller().start().await;

    admin
        .search(PeopleQuery {
            search: Some(" lopez ".into()),
            grade: Some("10".into()),
            section: Some("".into()),
        })
        .await;

    let sent = backend.requests_to(Method::GET, "/admin/students");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].query, None);
    assert_eq!(sent[1].query.as_deref(), Some("search=lopez&grade=10"));
}

#[tokio::test]
async fn test_enroll_sends_bare_id_list() {
    let backend = MockBackend::start().await;
    backend.on_post(
        "/admin/classes/4/enrollments",
        Reply::json(json!([
            { "id": 1, "student_id": 7, "class_id": 4 },
            { "id": 2, "student_id": 9, "class_id": 4 },
        ])),
    );
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);

    let enrolled = admin.enroll_students(4, vec![7, 9]).await.unwrap();

    assert_eq!(enrolled, 2);
    let sent = &backend.requests_to(Method::POST, "/admin/classes/4/enrollments")[0];
    assert_eq!(sent.json(), json!([7, 9]));
    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["2 student(s) enrolled".to_string()]
    );
}

#[tokio::test]
async fn test_enroll_nobody_is_rejected_locally() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);

    let err = admin.enroll_students(4, Vec::new()).await.unwrap_err();

    assert!(err.field_errors.contains_key("student_ids"));
    assert!(backend.requests().is_empty());
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec!["Select at least one student".to_string()]
    );
}

#[tokio::test]
async fn test_deleting_class_with_students_shows_tailored_message() {
    let backend = MockBackend::start().await;
    backend.on_delete(
        "/admin/classes/4",
        Reply::status_json(
            StatusCode::BAD_REQUEST,
            json!({ "detail": { "code": "class_has_students", "message": "Cannot delete class" } }),
        ),
    );
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);

    let err = admin.delete_class(4).await.unwrap_err();

    assert_eq!(err.code.as_deref(), Some("class_has_students"));
    assert_eq!(
        t.notifier.messages(NoticeLevel::Error),
        vec![CLASS_HAS_STUDENTS_MESSAGE.to_string()]
    );
    assert!(t.client.session().is_authenticated());
}

#[tokio::test]
async fn test_delete_class_refreshes_class_list() {
    let backend = MockBackend::start().await;
    backend
        .on_get(
            "/admin/classes",
            Reply::json(json!([
                common::class_json(4, "Biology"),
                common::class_json(5, "Chemistry")
            ])),
        )
        .on_get("/admin/classes", Reply::json(json!([common::class_json(5, "Chemistry")])))
        .on_delete("/admin/classes/4", Reply::status(StatusCode::NO_CONTENT));
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), Some("tab=classes"));
    admin.controller().start().await;
    assert!(t.view.region("classes").unwrap().contains_text("Biology"));

    admin.delete_class(4).await.unwrap();

    let classes = t.view.region("classes").unwrap();
    assert!(!classes.contains_text("Biology"));
    assert_eq!(classes.item_count(), 1);
    assert_eq!(
        t.notifier.messages(NoticeLevel::Success),
        vec!["Class deleted successfully".to_string()]
    );
}

#[tokio::test]
async fn test_class_form_requires_name_grade_and_section() {
    let backend = MockBackend::start().await;
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);
    let modal = admin.class_modal();
    let view = t.view.as_ref();

    modal.open(view);
    modal.set(view, "subject", "Biology");
    let err = admin.submit_class().await.unwrap_err();

    for field in ["name", "grade", "section"] {
        assert!(t.view.field_error(CLASS_MODAL, field).is_some(), "{field}");
    }
    assert_eq!(err.message, "Please correct: grade, name, section");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_create_class_uses_default_capacity() {
    let backend = MockBackend::start().await;
    backend
        .on_post("/admin/classes", Reply::json(common::class_json(8, "Physics")))
        .on_get("/admin/classes", Reply::json(json!([common::class_json(8, "Physics")])));
    let t = common::signed_in(&backend, "admin");
    let admin = AdminDashboard::new(t.client.clone(), t.view.clone(), None);
    let modal = admin.class_modal();
    let view = t.view.as_ref();

    modal.open(view);
    modal.set(view, "name", "Physics");
    modal.set(view, "grade", "11");
    modal.set(view, "section", "B");
    modal.set(view, "teacher_id", "12");
    admin.submit_class().await.unwrap();

    let body = backend.requests_to(Method::POST, "/admin/classes")[0].json();
    assert_eq!(body["capacity"], 30);
    assert_eq!(body["teacher_id"], 12);
    assert_eq!(admin.controller().current_tab(), AdminTab::Classes);
    assert!(!t.view.is_modal_visible(CLASS_MODAL));
}
