//! HTTP surface: the `/user` (employee) and `/task` route groups.
//!
//! Error body shapes differ per group on purpose, for compatibility with
//! the existing clients: the `/task` group answers failures in plain text,
//! the `/user` group in JSON.

use crate::models::{
    CreateTaskRequest, CreateTaskResponse, Employee, EmployeeSummary, EmployeeTaskRow,
    MessageResponse, Task, UpdateTaskRequest,
};
use crate::reports;
use crate::store::Store;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

pub struct AppState {
    pub store: Store,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    let user_routes = Router::new()
        .route("/showAllEmp", get(show_all_employees))
        .route("/getUserByUserId/:employee_id", get(get_employee_by_id))
        .route("/showPieChart", get(show_pie_chart))
        .route("/showbarChart", get(show_bar_chart))
        .route("/getAllEmp", get(get_all_employees));

    let task_routes = Router::new()
        .route("/showAllById/:task_id", get(get_task_by_id))
        .route("/showTasksByTaskId/:emp_id", get(get_tasks_by_employee))
        .route("/submitForm", post(submit_task))
        .route("/updateTask/:task_id", put(update_task))
        .route("/deleteTask/:task_id", delete(delete_task));

    Router::new()
        .nest("/user", user_routes)
        .nest("/task", task_routes)
        .with_state(state)
}

// Storage failures collapse into one 500 per group; the detail only goes
// to the log, never to the client.
fn task_internal_error<E: Display>(err: E) -> (StatusCode, String) {
    tracing::error!("store error: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".to_string(),
    )
}

fn user_internal_error<E: Display>(err: E) -> (StatusCode, Json<Value>) {
    tracing::error!("store error: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
}

// ── /task group ────────────────────────────────────────────────

// GET /task/showAllById/:task_id
pub async fn get_task_by_id(
    State(state): State<SharedState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .store
        .get_task(&task_id)
        .map_err(task_internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Task not Found".to_string()))?;

    Ok(Json(task))
}

// GET /task/showTasksByTaskId/:emp_id
pub async fn get_tasks_by_employee(
    State(state): State<SharedState>,
    Path(emp_id): Path<String>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state
        .store
        .list_tasks_by_employee(&emp_id)
        .map_err(task_internal_error)?;

    Ok(Json(tasks))
}

// POST /task/submitForm
pub async fn submit_task(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), (StatusCode, Json<Value>)> {
    let create_failed = |details: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Failed to create task", "details": details })),
        )
    };

    let new = payload.into_new().map_err(create_failed)?;
    let (task, linked) = state
        .store
        .create_task(new)
        .map_err(|e| create_failed(e.to_string()))?;

    if task.emp_id.is_some() && !linked {
        // Creation still succeeds; the owner list just stays as it was.
        tracing::warn!(
            task_id = %task.task_id,
            emp_id = task.emp_id.as_deref().unwrap_or(""),
            "owner not found, task left unlinked"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created successfully",
            task,
        }),
    ))
}

// PUT /task/updateTask/:task_id
pub async fn update_task(
    State(state): State<SharedState>,
    Path(task_id): Path<String>,
    Json(patch): Json<UpdateTaskRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let changed = state
        .store
        .update_task(&task_id, patch)
        .map_err(task_internal_error)?;

    if !changed {
        return Err((
            StatusCode::NOT_FOUND,
            "Task not found or no changes made".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Task updated successfully",
    }))
}

// DELETE /task/deleteTask/:task_id
pub async fn delete_task(
    State(state): State<SharedState>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let deleted = state
        .store
        .delete_task(&task_id)
        .map_err(task_internal_error)?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Task not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Task deleted successfully",
    }))
}

// ── /user group ────────────────────────────────────────────────

// GET /user/showAllEmp
pub async fn show_all_employees(
    State(state): State<SharedState>,
) -> Result<Json<Vec<EmployeeTaskRow>>, (StatusCode, Json<Value>)> {
    let employees = state.store.list_employees().map_err(user_internal_error)?;
    let tasks = state.store.list_tasks().map_err(user_internal_error)?;

    Ok(Json(reports::employee_task_rows(&employees, &tasks)))
}

// GET /user/getUserByUserId/:employee_id
pub async fn get_employee_by_id(
    State(state): State<SharedState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Employee>, (StatusCode, Json<Value>)> {
    let employee = state
        .store
        .get_employee(&employee_id)
        .map_err(user_internal_error)?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Employee not found" })),
        ))?;

    Ok(Json(employee))
}

// GET /user/showPieChart
pub async fn show_pie_chart(
    State(state): State<SharedState>,
) -> Result<Json<HashMap<String, u64>>, (StatusCode, Json<Value>)> {
    let employees = state.store.list_employees().map_err(user_internal_error)?;

    Ok(Json(reports::department_distribution(&employees)))
}

// GET /user/showbarChart
pub async fn show_bar_chart(
    State(state): State<SharedState>,
) -> Result<Json<Map<String, Value>>, (StatusCode, Json<Value>)> {
    let employees = state.store.list_employees().map_err(user_internal_error)?;

    Ok(Json(reports::monthly_joining_distribution(&employees)))
}

// GET /user/getAllEmp
pub async fn get_all_employees(
    State(state): State<SharedState>,
) -> Result<Json<Vec<EmployeeSummary>>, (StatusCode, Json<Value>)> {
    let employees = state.store.list_employees().map_err(user_internal_error)?;

    Ok(Json(
        employees.into_iter().map(EmployeeSummary::from).collect(),
    ))
}
