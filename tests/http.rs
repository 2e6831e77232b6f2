use attendance_server::models::AttendanceStatus;
use attendance_server::{router, AttendanceStore};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

async fn setup() -> (Router, AttendanceStore) {
    let store = AttendanceStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();
    (router(store.clone()), store)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn submit_records_attendance() {
    let (app, store) = setup().await;

    let (status, body) = send(&app, post_json("/submit", r#"{"studentName":"Alice"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Attendance saved successfully!");

    let records = store.list_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_name, "Alice");
    assert_eq!(records[0].status, AttendanceStatus::Absent);
}

#[tokio::test]
async fn submit_accepts_form_bodies() {
    let (app, store) = setup().await;

    let (status, _) = send(&app, post_form("/submit", "studentName=Bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.list_all().await.unwrap()[0].student_name, "Bob");
}

#[tokio::test]
async fn submit_without_name_is_rejected() {
    let (app, store) = setup().await;

    for body in [r#"{}"#, r#"{"studentName":""}"#, r#"{"studentName":"   "}"#, ""] {
        let (status, text) = send(&app, post_json("/submit", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(text, "Student name is required.");
    }
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (app, _) = setup().await;

    let (status, text) = send(&app, post_json("/submit", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Malformed payload.");
}

#[tokio::test]
async fn update_status_changes_the_record() {
    let (app, store) = setup().await;
    let id = store.create("Alice").await.unwrap();

    let (status, body) = send(
        &app,
        post_json("/update-status", &format!(r#"{{"id":{},"status":"Present"}}"#, id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Status updated successfully!");
    assert_eq!(
        store.get(id).await.unwrap().unwrap().status,
        AttendanceStatus::Present
    );

    let (status, _) = send(
        &app,
        post_form("/update-status", &format!("id={}&status=Absent", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        store.get(id).await.unwrap().unwrap().status,
        AttendanceStatus::Absent
    );
}

#[tokio::test]
async fn update_status_validates_input() {
    let (app, store) = setup().await;
    let id = store.create("Alice").await.unwrap();

    let (status, text) = send(&app, post_json("/update-status", r#"{"status":"Present"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "ID and status are required.");

    let (status, text) = send(
        &app,
        post_json("/update-status", &format!(r#"{{"id":{}}}"#, id)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "ID and status are required.");

    let (status, text) = send(
        &app,
        post_json("/update-status", r#"{"id":0,"status":"Present"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "ID and status are required.");

    let (status, _) = send(
        &app,
        post_json("/update-status", &format!(r#"{{"id":{},"status":"Late"}}"#, id)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post_form("/update-status", "id=abc&status=Present")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(
        store.get(id).await.unwrap().unwrap().status,
        AttendanceStatus::Absent
    );
}

#[tokio::test]
async fn update_status_on_unknown_id_is_not_found() {
    let (app, store) = setup().await;

    let (status, text) = send(
        &app,
        post_json("/update-status", r#"{"id":999,"status":"Present"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Attendance record 999 not found.");
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn attendance_page_lists_records_in_id_order() {
    let (app, store) = setup().await;
    let alice = store.create("Alice").await.unwrap();
    store
        .update_status(alice, AttendanceStatus::Present)
        .await
        .unwrap();
    store.create("Bob").await.unwrap();

    let (status, page) = send(&app, get("/attendance")).await;
    assert_eq!(status, StatusCode::OK);
    let alice_at = page.find("<td>Alice</td>").unwrap();
    let bob_at = page.find("<td>Bob</td>").unwrap();
    assert!(alice_at < bob_at);
    assert!(page.contains("<option value=\"Present\" selected>Present</option>"));
}

#[tokio::test]
async fn attendance_json_lists_records() {
    let (app, store) = setup().await;
    store.create("Alice").await.unwrap();
    store.create("Bob").await.unwrap();

    let (status, body) = send(&app, get("/attendance.json")).await;
    assert_eq!(status, StatusCode::OK);
    let records: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[0]["student_name"], "Alice");
    assert_eq!(records[1]["status"], "Absent");
}

#[tokio::test]
async fn single_record_lookup() {
    let (app, store) = setup().await;
    let id = store.create("Alice").await.unwrap();
    store
        .update_status(id, AttendanceStatus::Present)
        .await
        .unwrap();

    let (status, body) = send(&app, get(&format!("/attendance/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let record: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["student_name"], "Alice");
    assert_eq!(record["status"], "Present");

    let (status, text) = send(&app, get("/attendance/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Attendance record 999 not found.");
}

#[tokio::test]
async fn attendance_page_shows_names_verbatim() {
    let (app, store) = setup().await;
    store.create("{{empty}}").await.unwrap();

    let (status, page) = send(&app, get("/attendance")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<td>{{empty}}</td>"));
}

#[tokio::test]
async fn serves_the_form_and_its_script() {
    let (app, _) = setup().await;

    let (status, page) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("attendance-form"));

    let (status, script) = send(&app, get("/script.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(script.contains("/submit"));
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let (app, _) = setup().await;

    let (status, text) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Invalid path: /nope");
}

#[tokio::test]
async fn storage_failures_are_500() {
    let (app, store) = setup().await;
    store.close().await;

    let (status, text) = send(&app, post_json("/submit", r#"{"studentName":"Alice"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text, "Failed to save attendance.");

    let (status, text) = send(&app, get("/attendance")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text, "Failed to fetch attendance data.");
}
