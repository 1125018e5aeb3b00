//! # Task Model
//!
//! A `Task` is one tracked work item. Tasks are only ever created from the
//! console; nothing in this crate mutates or deletes them afterwards.
//!
//! `ListTaskFilter` is the ephemeral set of constraints the list page applies.
//! Every dimension is optional: an empty name, `TaskStatus::None`, or an
//! unset `TimeRange` bound means "no constraint".

use chrono::NaiveDateTime;

use crate::core::time::format_time;

/// Maximum length of a task name, in characters (`VARCHAR(128)`).
pub const MAX_NAME_LEN: usize = 128;

/// Task status as persisted in the `status` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskStatus {
    #[default]
    None,
    InProgress,
    Finished,
    Cancelled,
}

impl TaskStatus {
    pub fn code(self) -> i64 {
        match self {
            TaskStatus::None => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Finished => 2,
            TaskStatus::Cancelled => 3,
        }
    }

    /// Unknown codes read back from the store collapse to `None`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TaskStatus::InProgress,
            2 => TaskStatus::Finished,
            3 => TaskStatus::Cancelled,
            _ => TaskStatus::None,
        }
    }

    /// Human readable label used in tables and filter descriptions.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Finished => "Finished",
            TaskStatus::Cancelled => "Cancelled",
            TaskStatus::None => "Unknown",
        }
    }

    /// Parses `IN_PROGRESS`, `FINISHED` or `CANCELLED` (any case).
    /// Anything else yields `default`.
    pub fn parse_or(input: &str, default: TaskStatus) -> TaskStatus {
        match input.trim().to_uppercase().as_str() {
            "IN_PROGRESS" => TaskStatus::InProgress,
            "FINISHED" => TaskStatus::Finished,
            "CANCELLED" => TaskStatus::Cancelled,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Assigned by the store. Ignored on insert.
    pub id: i64,
    pub name: String,
    pub status: TaskStatus,
    pub ctime: NaiveDateTime,
    pub actual_start: Option<NaiveDateTime>,
    pub expected_end: Option<NaiveDateTime>,
    pub actual_end: Option<NaiveDateTime>,
}

impl Task {
    /// A new, not yet persisted task with the default `IN_PROGRESS` status.
    pub fn new(name: impl Into<String>, ctime: NaiveDateTime) -> Self {
        Self {
            id: 0,
            name: name.into(),
            status: TaskStatus::InProgress,
            ctime,
            actual_start: None,
            expected_end: None,
            actual_end: None,
        }
    }
}

/// Inclusive bounds on one timestamp column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub open: Option<NaiveDateTime>,
    pub close: Option<NaiveDateTime>,
}

impl TimeRange {
    pub fn is_empty(&self) -> bool {
        self.open.is_none() && self.close.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTaskFilter {
    /// Case-insensitive substring of the name.
    pub name: String,
    pub status: TaskStatus,
    pub ctime: TimeRange,
    pub actual_start: TimeRange,
    pub expected_end: TimeRange,
    pub actual_end: TimeRange,
}

impl ListTaskFilter {
    pub fn is_empty(&self) -> bool {
        *self == ListTaskFilter::default()
    }

    /// One line per active constraint, e.g. `name like 'abc'`.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.name.is_empty() {
            lines.push(format!("name like '{}'", self.name));
        }
        if self.status > TaskStatus::None {
            lines.push(format!("status is '{}'", self.status.label()));
        }
        let ranges = [
            ("create time", &self.ctime),
            ("actual start", &self.actual_start),
            ("expected end", &self.expected_end),
            ("actual end", &self.actual_end),
        ];
        for (column, range) in ranges {
            if let Some(open) = range.open {
                lines.push(format!("{column} >= '{}'", format_time(&open)));
            }
            if let Some(close) = range.close {
                lines.push(format!("{column} <= '{}'", format_time(&close)));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::InProgress.label(), "In Progress");
        assert_eq!(TaskStatus::Finished.label(), "Finished");
        assert_eq!(TaskStatus::Cancelled.label(), "Cancelled");
        assert_eq!(TaskStatus::None.label(), "Unknown");
        assert_eq!(TaskStatus::from_code(42).label(), "Unknown");
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            TaskStatus::parse_or("finished", TaskStatus::None),
            TaskStatus::Finished
        );
        assert_eq!(
            TaskStatus::parse_or(" Cancelled ", TaskStatus::None),
            TaskStatus::Cancelled
        );
        assert_eq!(
            TaskStatus::parse_or("done", TaskStatus::InProgress),
            TaskStatus::InProgress
        );
        assert_eq!(TaskStatus::parse_or("", TaskStatus::None), TaskStatus::None);
    }

    #[test]
    fn test_status_codes_match_schema() {
        for status in [
            TaskStatus::None,
            TaskStatus::InProgress,
            TaskStatus::Finished,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(TaskStatus::from_code(status.code()), status);
        }
        assert_eq!(TaskStatus::InProgress.code(), 1);
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("X", at(2024, 1, 2));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.actual_start.is_none());
        assert!(task.expected_end.is_none());
        assert!(task.actual_end.is_none());
    }

    #[test]
    fn test_empty_filter_describes_nothing() {
        let filter = ListTaskFilter::default();
        assert!(filter.is_empty());
        assert!(filter.describe().is_empty());
    }

    #[test]
    fn test_filter_describe_lists_active_dimensions() {
        let filter = ListTaskFilter {
            name: "abc".to_string(),
            status: TaskStatus::Finished,
            actual_start: TimeRange {
                open: Some(at(2024, 1, 1)),
                close: None,
            },
            ..Default::default()
        };
        assert_eq!(
            filter.describe(),
            vec![
                "name like 'abc'".to_string(),
                "status is 'Finished'".to_string(),
                "actual start >= '2024-01-01 00:00:00'".to_string(),
            ]
        );
    }
}
