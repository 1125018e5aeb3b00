//! # Task Store
//!
//! SQLite persistence for the single `task` table.
//!
//! ```text
//! TaskStore
//! ├── create_schema()            // table + name index, idempotent
//! ├── insert(&Task) -> id        // id assigned by SQLite
//! └── query(page, size, filter)  // page of tasks + total matching count
//! ```
//!
//! A list request issues two statements: the page fetch and a `COUNT(*)`
//! over the same predicate. Both are built from one `Predicate` so they can
//! never disagree about which rows match.

use std::path::{Path, PathBuf};

use log::{debug, info};
use chrono::NaiveDateTime;
use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, Row, params, params_from_iter};
use thiserror::Error;

use crate::core::task::{ListTaskFilter, MAX_NAME_LEN, Task, TaskStatus, TimeRange};
use crate::core::time::parse_stored_time;

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(128) NOT NULL,
    status TINYINT NOT NULL,
    ctime TIMESTAMP NOT NULL,
    actual_start TIMESTAMP,
    expected_end TIMESTAMP,
    actual_end TIMESTAMP
);";

const CREATE_NAME_INDEX: &str = "CREATE INDEX IF NOT EXISTS name_idx ON task (name);";

const INSERT_TASK: &str = "INSERT INTO task (name, status, ctime, actual_start, expected_end, actual_end) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("failed to execute schema: {0}")]
    Schema(rusqlite::Error),

    #[error("failed to create index: {0}")]
    Index(rusqlite::Error),

    #[error("failed to save task: {0}")]
    Insert(rusqlite::Error),

    #[error("failed to list tasks: {0}")]
    List(rusqlite::Error),

    #[error("failed to count tasks: {0}")]
    Count(rusqlite::Error),

    #[error("invalid task name: {0}")]
    InvalidName(String),
}

/// One page of a list request.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    /// Rows matching the filter, ignoring pagination.
    pub total: u64,
}

pub struct TaskStore {
    conn: Connection,
    location: String,
}

impl TaskStore {
    /// Opens (or creates) the database file, creating its parent directory.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            log::warn!("Failed to create database directory {}: {}", parent.display(), e);
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Opened task database at {}", path.display());
        Ok(Self {
            conn,
            location: path.display().to_string(),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Ensures the `task` table and its name index exist.
    pub fn create_schema(&self) -> Result<(), StoreError> {
        debug!("SQL: {}", CREATE_TABLE.trim());
        self.conn
            .execute_batch(CREATE_TABLE)
            .map_err(StoreError::Schema)?;

        debug!("SQL: {}", CREATE_NAME_INDEX);
        self.conn
            .execute_batch(CREATE_NAME_INDEX)
            .map_err(StoreError::Index)?;

        info!("Schema executed");
        Ok(())
    }

    /// Inserts a task and returns the id SQLite assigned. `task.id` is ignored.
    pub fn insert(&self, task: &Task) -> Result<i64, StoreError> {
        let name_len = task.name.chars().count();
        if task.name.trim().is_empty() {
            return Err(StoreError::InvalidName("name must not be empty".to_string()));
        }
        if name_len > MAX_NAME_LEN {
            return Err(StoreError::InvalidName(format!(
                "name has {name_len} characters, at most {MAX_NAME_LEN} allowed"
            )));
        }

        debug!("SQL: {} [{:?}]", INSERT_TASK, task);
        self.conn
            .execute(
                INSERT_TASK,
                params![
                    task.name,
                    task.status.code(),
                    task.ctime,
                    task.actual_start,
                    task.expected_end,
                    task.actual_end,
                ],
            )
            .map_err(StoreError::Insert)?;

        let id = self.conn.last_insert_rowid();
        info!("Saved task {} '{}'", id, task.name);
        Ok(id)
    }

    /// Fetches page `page` (1-based) ordered by id descending, plus the
    /// total number of rows matching `filter`.
    pub fn query(
        &self,
        page: u32,
        page_size: u32,
        filter: &ListTaskFilter,
    ) -> Result<TaskPage, StoreError> {
        let predicate = Predicate::from_filter(filter);
        let offset = u64::from(page.max(1) - 1) * u64::from(page_size);

        let select = format!(
            "SELECT id, name, status, ctime, actual_start, expected_end, actual_end FROM task{} \
             ORDER BY id DESC LIMIT {} OFFSET {}",
            predicate.where_clause(),
            page_size,
            offset
        );
        debug!("SQL: {} {:?}", select, predicate.describe_args());

        let mut stmt = self.conn.prepare(&select).map_err(StoreError::List)?;
        let tasks = stmt
            .query_map(params_from_iter(predicate.args.iter()), task_from_row)
            .map_err(StoreError::List)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::List)?;

        let count = format!("SELECT COUNT(*) FROM task{}", predicate.where_clause());
        debug!("SQL: {} {:?}", count, predicate.describe_args());

        let total: i64 = self
            .conn
            .query_row(&count, params_from_iter(predicate.args.iter()), |row| {
                row.get(0)
            })
            .map_err(StoreError::Count)?;

        Ok(TaskPage {
            tasks,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        status: TaskStatus::from_code(row.get("status")?),
        ctime: required_time(row, "ctime")?,
        actual_start: stored_time(row, "actual_start")?,
        expected_end: stored_time(row, "expected_end")?,
        actual_end: stored_time(row, "actual_end")?,
    })
}

// Timestamp columns are read as text so rows written by other drivers
// (fractional seconds, a trailing offset) still load.

fn required_time(row: &Row<'_>, column: &str) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(column)?;
    parse_column(row, column, &text)
}

fn stored_time(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    row.get::<_, Option<String>>(column)?
        .map(|text| parse_column(row, column, &text))
        .transpose()
}

fn parse_column(row: &Row<'_>, column: &str, text: &str) -> rusqlite::Result<NaiveDateTime> {
    parse_stored_time(text).map_err(|e| {
        let index = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
    })
}

/// Makes `%`, `_` and `\` in user text match themselves under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// AND-ed `WHERE` conditions with their positional arguments.
struct Predicate {
    conditions: Vec<&'static str>,
    args: Vec<Box<dyn ToSql>>,
}

impl Predicate {
    fn from_filter(filter: &ListTaskFilter) -> Self {
        let mut predicate = Predicate {
            conditions: Vec::new(),
            args: Vec::new(),
        };

        if !filter.name.is_empty() {
            predicate.push(
                "name LIKE ? ESCAPE '\\'",
                Box::new(format!("%{}%", escape_like(&filter.name))),
            );
        }
        if filter.status > TaskStatus::None {
            predicate.push("status = ?", Box::new(filter.status.code()));
        }
        predicate.push_range("ctime >= ?", "ctime <= ?", &filter.ctime);
        predicate.push_range("actual_start >= ?", "actual_start <= ?", &filter.actual_start);
        predicate.push_range("expected_end >= ?", "expected_end <= ?", &filter.expected_end);
        predicate.push_range("actual_end >= ?", "actual_end <= ?", &filter.actual_end);
        predicate
    }

    fn push(&mut self, condition: &'static str, arg: Box<dyn ToSql>) {
        self.conditions.push(condition);
        self.args.push(arg);
    }

    fn push_range(&mut self, open: &'static str, close: &'static str, range: &TimeRange) {
        if let Some(t) = range.open {
            self.push(open, Box::new(t));
        }
        if let Some(t) = range.close {
            self.push(close, Box::new(t));
        }
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn describe_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| match arg.to_sql() {
                Ok(value) => format!("{value:?}"),
                Err(e) => format!("<{e}>"),
            })
            .collect()
    }
}
