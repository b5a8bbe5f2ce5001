//! Reporting aggregations over in-memory employee/task listings.
//!
//! These are plain folds over what the store returns; there is no
//! aggregation pushdown. The chart endpoints serialize the maps as-is.

use crate::models::{Employee, EmployeeTaskRow, Task};
use chrono::Datelike;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Department → employee count. Employees without a department group under
/// the literal key "null", which is what the pie-chart client expects.
pub fn department_distribution(employees: &[Employee]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for employee in employees {
        let department = employee
            .department
            .clone()
            .unwrap_or_else(|| "null".to_string());
        *counts.entry(department).or_insert(0) += 1;
    }
    counts
}

/// Month name → joining count, always all twelve months in calendar order,
/// zero-defaulted. Employees without a joining date land in no bucket.
pub fn monthly_joining_distribution(employees: &[Employee]) -> Map<String, Value> {
    let mut counts = [0u64; 12];
    for employee in employees {
        if let Some(date) = employee.date_of_joining {
            counts[date.month0() as usize] += 1;
        }
    }

    MONTH_NAMES
        .iter()
        .zip(counts)
        .map(|(name, count)| (name.to_string(), Value::from(count)))
        .collect()
}

/// The joined employee+task listing: one row per (employee, matched task)
/// pair. Ids in task_ids with no matching task contribute nothing, so an
/// employee whose every id is stale disappears from the output entirely.
pub fn employee_task_rows(employees: &[Employee], tasks: &[Task]) -> Vec<EmployeeTaskRow> {
    let tasks_by_id: HashMap<&str, &Task> =
        tasks.iter().map(|t| (t.task_id.as_str(), t)).collect();

    let mut rows = Vec::new();
    for employee in employees {
        if employee.task_ids.is_empty() {
            continue;
        }
        for task_id in &employee.task_ids {
            if let Some(task) = tasks_by_id.get(task_id.as_str()) {
                rows.push(EmployeeTaskRow {
                    employee_id: employee.employee_id.clone(),
                    name: employee.name.clone(),
                    task_id: task.task_id.clone(),
                    task_title: task.task_title.clone(),
                });
            }
        }
    }
    rows
}
