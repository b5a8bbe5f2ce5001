//! Endpoint tests driving the full router, one request at a time.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use empdesk_server::api::{self, AppState};
use empdesk_server::models::Employee;
use empdesk_server::store::Store;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app(name: &str) -> (Router, Store, String) {
    let path = format!("/tmp/empdesk_api_test_{name}_{}.redb", std::process::id());
    let _ = fs::remove_file(&path);
    let store = Store::open(&path).unwrap();
    let app = api::router(Arc::new(AppState {
        store: store.clone(),
    }));
    (app, store, path)
}

fn cleanup(path: &str) {
    let _ = fs::remove_file(path);
}

fn employee(
    employee_id: &str,
    name: &str,
    department: Option<&str>,
    joining_month: Option<u32>,
) -> Employee {
    Employee {
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        date_of_joining: joining_month
            .map(|m| Utc.with_ymd_and_hms(2023, m, 10, 0, 0, 0).unwrap()),
        department: department.map(str::to_string),
        task_ids: Vec::new(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json_body(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ── /task group ────────────────────────────────────────────────

#[tokio::test]
async fn create_then_fetch_round_trip() {
    let (app, _store, path) = test_app("create_fetch");

    let payload = json!({
        "task_title": "Jump from 9th floor",
        "task_description": "Fly like vadivelu",
        "task_status": "In Progress",
        "emp_id": "E003",
        "due_date": "2024-12-31T00:00:00Z",
    });
    let response = app
        .clone()
        .oneshot(with_json_body("POST", "/task/submitForm", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Task created successfully");
    assert_eq!(body["task"]["task_id"], "T001");

    let response = app
        .oneshot(get("/task/showAllById/T001"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let task = body_json(response).await;
    assert_eq!(task["task_title"], "Jump from 9th floor");
    assert_eq!(task["task_description"], "Fly like vadivelu");
    assert_eq!(task["task_status"], "In Progress");
    assert_eq!(task["emp_id"], "E003");
    let due: chrono::DateTime<Utc> = task["due_date"].as_str().unwrap().parse().unwrap();
    assert_eq!(due, Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());

    cleanup(&path);
}

#[tokio::test]
async fn missing_task_is_plain_text_404() {
    let (app, _store, path) = test_app("missing_task");

    let response = app.oneshot(get("/task/showAllById/T999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Task not Found");

    cleanup(&path);
}

#[tokio::test]
async fn create_without_required_field_is_400() {
    let (app, _store, path) = test_app("create_invalid");

    let payload = json!({ "task_title": "No description" });
    let response = app
        .oneshot(with_json_body("POST", "/task/submitForm", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to create task");
    assert_eq!(body["details"], "task_description is required");

    cleanup(&path);
}

#[tokio::test]
async fn update_merges_then_reports_no_change() {
    let (app, _store, path) = test_app("update");

    let payload = json!({
        "task_title": "Original",
        "task_description": "Unchanged by the patch",
        "task_status": "Pending",
    });
    let response = app
        .clone()
        .oneshot(with_json_body("POST", "/task/submitForm", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let patch = json!({ "task_status": "Completed" });
    let response = app
        .clone()
        .oneshot(with_json_body("PUT", "/task/updateTask/T001", &patch))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Task updated successfully"
    );

    // Untouched fields survived
    let response = app
        .clone()
        .oneshot(get("/task/showAllById/T001"))
        .await
        .unwrap();
    let task = body_json(response).await;
    assert_eq!(task["task_title"], "Original");
    assert_eq!(task["task_status"], "Completed");

    // Re-applying the same patch changes nothing: 404, same as a missing id
    let response = app
        .clone()
        .oneshot(with_json_body("PUT", "/task/updateTask/T001", &patch))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        "Task not found or no changes made"
    );

    let response = app
        .oneshot(with_json_body("PUT", "/task/updateTask/T999", &patch))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        "Task not found or no changes made"
    );

    cleanup(&path);
}

#[tokio::test]
async fn delete_twice_is_not_found_the_second_time() {
    let (app, _store, path) = test_app("delete");

    let payload = json!({
        "task_title": "Doomed",
        "task_description": "Will be deleted",
    });
    let response = app
        .clone()
        .oneshot(with_json_body("POST", "/task/submitForm", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/task/deleteTask/T001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Task deleted successfully"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/task/deleteTask/T001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Task not found");

    cleanup(&path);
}

#[tokio::test]
async fn tasks_by_owner_filters_and_may_be_empty() {
    let (app, _store, path) = test_app("by_owner");

    for (title, emp) in [("a", "E001"), ("b", "E002"), ("c", "E001")] {
        let payload = json!({
            "task_title": title,
            "task_description": "d",
            "emp_id": emp,
        });
        let response = app
            .clone()
            .oneshot(with_json_body("POST", "/task/submitForm", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/task/showTasksByTaskId/E001"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(get("/task/showTasksByTaskId/E999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    cleanup(&path);
}

// ── /user group ────────────────────────────────────────────────

#[tokio::test]
async fn employee_lookup_and_json_404() {
    let (app, store, path) = test_app("emp_lookup");

    store
        .insert_employee(&employee("E003", "Ravi", Some("IT"), Some(6)))
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/user/getUserByUserId/E003"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["employee_id"], "E003");
    assert_eq!(body["name"], "Ravi");

    let response = app
        .oneshot(get("/user/getUserByUserId/E999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Employee not found" })
    );

    cleanup(&path);
}

#[tokio::test]
async fn summary_list_projects_three_fields() {
    let (app, store, path) = test_app("summary");

    store
        .insert_employee(&employee("E001", "Asha", Some("HR"), Some(1)))
        .unwrap();

    let response = app.oneshot(get("/user/getAllEmp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let first = &body.as_array().unwrap()[0];
    assert_eq!(first["name"], "Asha");
    assert_eq!(first["employee_id"], "E001");
    assert_eq!(first["task_ids"], json!([]));
    // projection only: no department or joining date in the summary
    assert!(first.get("department").is_none());
    assert!(first.get("date_of_joining").is_none());

    cleanup(&path);
}

#[tokio::test]
async fn pie_chart_counts_departments() {
    let (app, store, path) = test_app("pie");

    for emp in [
        employee("E001", "Asha", Some("HR"), None),
        employee("E002", "Binu", Some("HR"), None),
        employee("E003", "Ravi", Some("IT"), None),
    ] {
        store.insert_employee(&emp).unwrap();
    }

    let response = app.oneshot(get("/user/showPieChart")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "HR": 2, "IT": 1 }));

    cleanup(&path);
}

#[tokio::test]
async fn bar_chart_always_has_twelve_months() {
    let (app, store, path) = test_app("bar");

    for emp in [
        employee("E001", "Asha", None, Some(1)),
        employee("E002", "Binu", None, Some(1)),
        employee("E003", "Ravi", None, Some(12)),
        employee("E004", "Devi", None, None),
    ] {
        store.insert_employee(&emp).unwrap();
    }

    let response = app.oneshot(get("/user/showbarChart")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let months = body.as_object().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months["January"], 2);
    assert_eq!(months["December"], 1);
    assert_eq!(months["February"], 0);

    let total: u64 = months.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 3); // E004 has no joining date

    cleanup(&path);
}

#[tokio::test]
async fn joined_listing_skips_stale_and_empty() {
    let (app, store, path) = test_app("joined");

    store
        .insert_employee(&employee("E001", "Asha", Some("HR"), Some(3)))
        .unwrap();
    store
        .insert_employee(&employee("E002", "Binu", Some("IT"), Some(4)))
        .unwrap();

    // Two real tasks for E001, then delete one to leave a stale id behind
    for title in ["Live", "Doomed"] {
        let payload = json!({
            "task_title": title,
            "task_description": "d",
            "emp_id": "E001",
        });
        let response = app
            .clone()
            .oneshot(with_json_body("POST", "/task/submitForm", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/task/deleteTask/T002")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/user/showAllEmp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{
            "employee_id": "E001",
            "name": "Asha",
            "task_id": "T001",
            "task_title": "Live",
        }])
    );

    cleanup(&path);
}
