//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::io;

use chrono::{NaiveDate, NaiveDateTime};

use crate::console::input::Terminal;
use crate::core::store::TaskStore;

/// A terminal that answers from a fixed script and records everything printed.
///
/// Lines and keystrokes are taken from the same queue. Running out of script
/// behaves like end of input.
pub struct ScriptedTerminal {
    script: VecDeque<String>,
    pub output: String,
}

impl ScriptedTerminal {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next(&mut self) -> io::Result<String> {
        self.script
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self) -> io::Result<String> {
        self.next()
    }

    fn read_key(&mut self) -> io::Result<String> {
        self.next()
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }
}

/// In-memory store with the schema already in place.
pub fn test_store() -> TaskStore {
    let store = TaskStore::open_in_memory().unwrap();
    store.create_schema().unwrap();
    store
}

/// Midnight on the given day.
pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}
