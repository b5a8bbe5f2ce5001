//! Employee/task store over redb.
//!
//! One database file, three tables: employees (keyed by an internal uuid,
//! never exposed), tasks (keyed by task_id) and a meta table holding the
//! task id sequence counter. Every operation is its own transaction; the
//! create path is the only multi-step write and it stays inside a single
//! transaction so a task, its id and its owner linkage land together.

use crate::models::{Employee, NewTask, Task, UpdateTaskRequest};
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use std::sync::Arc;
use uuid::Uuid;

const EMPLOYEES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("employees");
const TASKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("tasks");
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const TASK_SEQ_KEY: &str = "task_seq";

/// Format a sequence number as a task id: zero-padded to 3 digits,
/// growing past that (T999 is followed by T1000).
pub(crate) fn format_task_id(seq: u64) -> String {
    format!("T{seq:03}")
}

/// Numeric suffix of a task id, if it has the expected shape.
pub(crate) fn parse_task_seq(task_id: &str) -> Option<u64> {
    task_id.strip_prefix('T')?.parse().ok()
}

fn decode_seq(bytes: &[u8]) -> u64 {
    if bytes.len() == 8 {
        u64::from_le_bytes(bytes.try_into().unwrap())
    } else {
        0
    }
}

/// Thin handle to the database file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open (or create) the store at the given path. Creates tables if they
    /// don't exist and seeds the task id counter from the highest existing
    /// id when the counter is absent (pre-counter database files).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(EMPLOYEES_TABLE)?;
            let tasks = txn.open_table(TASKS_TABLE)?;
            let mut meta = txn.open_table(META_TABLE)?;

            if meta.get(TASK_SEQ_KEY)?.is_none() {
                let mut max_seq = 0u64;
                for entry in tasks.iter()? {
                    let (key, _) = entry?;
                    if let Some(seq) = parse_task_seq(key.value()) {
                        max_seq = max_seq.max(seq);
                    }
                }
                meta.insert(TASK_SEQ_KEY, max_seq.to_le_bytes().as_slice())?;
            }
        }
        txn.commit()?;

        Ok(Store { db: Arc::new(db) })
    }

    // ── Task operations ────────────────────────────────────────

    /// Allocate the next id, persist the task and append the id to the
    /// owner's task_ids, all in one transaction. Returns the stored task
    /// and whether the owner was found (always false for ownerless tasks).
    pub fn create_task(&self, new: NewTask) -> Result<(Task, bool), StoreError> {
        let txn = self.db.begin_write()?;
        let task;
        let mut linked = false;
        {
            let mut meta = txn.open_table(META_TABLE)?;
            let seq = match meta.get(TASK_SEQ_KEY)? {
                Some(data) => decode_seq(data.value()),
                None => 0,
            } + 1;
            meta.insert(TASK_SEQ_KEY, seq.to_le_bytes().as_slice())?;

            task = Task {
                task_id: format_task_id(seq),
                task_title: new.task_title,
                task_description: new.task_description,
                emp_id: new.emp_id,
                task_status: new.task_status,
                due_date: new.due_date,
            };

            let mut tasks = txn.open_table(TASKS_TABLE)?;
            let task_bytes =
                serde_json::to_vec(&task).map_err(|e| StoreError::Encode(e.to_string()))?;
            tasks.insert(task.task_id.as_str(), task_bytes.as_slice())?;

            if let Some(emp_id) = task.emp_id.as_deref() {
                linked = append_task_id(&txn, emp_id, &task.task_id)?;
            }
        }
        txn.commit()?;
        Ok((task, linked))
    }

    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let txn = self.db.begin_read()?;
        let tasks = txn.open_table(TASKS_TABLE)?;

        match tasks.get(task_id)? {
            Some(data) => {
                let task = serde_json::from_slice(data.value())
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// All tasks, in task_id order (the table key).
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let txn = self.db.begin_read()?;
        let tasks_table = txn.open_table(TASKS_TABLE)?;

        let mut tasks = Vec::new();
        for entry in tasks_table.iter()? {
            let (_, value) = entry?;
            let task: Task = serde_json::from_slice(value.value())
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    pub fn list_tasks_by_employee(&self, emp_id: &str) -> Result<Vec<Task>, StoreError> {
        let tasks = self.list_tasks()?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.emp_id.as_deref() == Some(emp_id))
            .collect())
    }

    /// Merge-patch a task. Returns false both when no task matches and when
    /// the patch changes nothing; callers cannot tell the two apart.
    pub fn update_task(
        &self,
        task_id: &str,
        patch: UpdateTaskRequest,
    ) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let changed;
        {
            let mut tasks = txn.open_table(TASKS_TABLE)?;
            let existing = match tasks.get(task_id)? {
                Some(data) => Some(
                    serde_json::from_slice::<Task>(data.value())
                        .map_err(|e| StoreError::Decode(e.to_string()))?,
                ),
                None => None,
            };

            match existing {
                Some(task) => {
                    let mut patched = task.clone();
                    patch.apply(&mut patched);
                    if patched == task {
                        changed = false;
                    } else {
                        let task_bytes = serde_json::to_vec(&patched)
                            .map_err(|e| StoreError::Encode(e.to_string()))?;
                        tasks.insert(task_id, task_bytes.as_slice())?;
                        changed = true;
                    }
                }
                None => changed = false,
            }
        }
        txn.commit()?;
        Ok(changed)
    }

    /// Remove a task. The owner's task_ids is deliberately left alone; the
    /// joined listing tolerates stale ids by skipping them.
    pub fn delete_task(&self, task_id: &str) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks = txn.open_table(TASKS_TABLE)?;
            deleted = tasks.remove(task_id)?.is_some();
        }
        txn.commit()?;
        Ok(deleted)
    }

    // ── Employee operations ────────────────────────────────────

    /// Insert an employee under a fresh internal key. Employees arrive via
    /// external provisioning (and tests); there is no HTTP surface for this.
    pub fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut employees = txn.open_table(EMPLOYEES_TABLE)?;
            let emp_bytes =
                serde_json::to_vec(employee).map_err(|e| StoreError::Encode(e.to_string()))?;
            let key = Uuid::new_v4();
            employees.insert(key.as_bytes().as_slice(), emp_bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// First employee matching employee_id. The schema does not make
    /// employee_id unique, so this is findOne semantics.
    pub fn get_employee(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        let txn = self.db.begin_read()?;
        let employees = txn.open_table(EMPLOYEES_TABLE)?;

        for entry in employees.iter()? {
            let (_, value) = entry?;
            let employee: Employee = serde_json::from_slice(value.value())
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            if employee.employee_id == employee_id {
                return Ok(Some(employee));
            }
        }
        Ok(None)
    }

    pub fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let txn = self.db.begin_read()?;
        let employees_table = txn.open_table(EMPLOYEES_TABLE)?;

        let mut employees = Vec::new();
        for entry in employees_table.iter()? {
            let (_, value) = entry?;
            let employee: Employee = serde_json::from_slice(value.value())
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            employees.push(employee);
        }
        Ok(employees)
    }
}

/// Append a task id to the matching employee's task_ids inside an open
/// write transaction. Silent no-op (false) when no employee matches.
fn append_task_id(
    txn: &WriteTransaction,
    emp_id: &str,
    task_id: &str,
) -> Result<bool, StoreError> {
    let mut employees = txn.open_table(EMPLOYEES_TABLE)?;

    let mut found: Option<(Vec<u8>, Employee)> = None;
    for entry in employees.iter()? {
        let (key, value) = entry?;
        let employee: Employee = serde_json::from_slice(value.value())
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if employee.employee_id == emp_id {
            found = Some((key.value().to_vec(), employee));
            break;
        }
    }

    match found {
        Some((key, mut employee)) => {
            employee.task_ids.push(task_id.to_string());
            let emp_bytes =
                serde_json::to_vec(&employee).map_err(|e| StoreError::Encode(e.to_string()))?;
            employees.insert(key.as_slice(), emp_bytes.as_slice())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum StoreError {
    Redb(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Redb(e) => write!(f, "redb: {e}"),
            StoreError::Decode(e) => write!(f, "decode: {e}"),
            StoreError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
