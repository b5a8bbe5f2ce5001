use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Employee record as stored. Employees are provisioned externally — there
/// is no creation endpoint — so this only ever changes through task linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_joining: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub task_ids: Vec<String>,
}

/// Task record. `task_id` is allocated by the store (`T001`, `T002`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub task_title: String,
    pub task_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

// API request/response types

/// Body of POST /task/submitForm. Required fields are Options here so a
/// missing title/description surfaces as a 400 with details rather than an
/// extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub task_title: Option<String>,
    pub task_description: Option<String>,
    pub emp_id: Option<String>,
    pub task_status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// A create request with required fields checked.
#[derive(Debug)]
pub struct NewTask {
    pub task_title: String,
    pub task_description: String,
    pub emp_id: Option<String>,
    pub task_status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    pub fn into_new(self) -> Result<NewTask, String> {
        let task_title = self.task_title.ok_or("task_title is required")?;
        let task_description = self.task_description.ok_or("task_description is required")?;
        Ok(NewTask {
            task_title,
            task_description,
            emp_id: self.emp_id,
            task_status: self.task_status,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub task_title: Option<String>,
    pub task_description: Option<String>,
    pub emp_id: Option<String>,
    pub task_status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    /// Merge-patch: only supplied fields overwrite.
    pub fn apply(self, task: &mut Task) {
        if let Some(task_title) = self.task_title {
            task.task_title = task_title;
        }
        if let Some(task_description) = self.task_description {
            task.task_description = task_description;
        }
        if let Some(emp_id) = self.emp_id {
            task.emp_id = Some(emp_id);
        }
        if let Some(task_status) = self.task_status {
            task.task_status = Some(task_status);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub message: &'static str,
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Projection for GET /user/getAllEmp.
#[derive(Debug, Serialize)]
pub struct EmployeeSummary {
    pub name: String,
    pub employee_id: String,
    pub task_ids: Vec<String>,
}

impl From<Employee> for EmployeeSummary {
    fn from(emp: Employee) -> Self {
        EmployeeSummary {
            name: emp.name,
            employee_id: emp.employee_id,
            task_ids: emp.task_ids,
        }
    }
}

/// One row of the joined employee+task listing, GET /user/showAllEmp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeTaskRow {
    pub employee_id: String,
    pub name: String,
    pub task_id: String,
    pub task_title: String,
}
