use std::collections::VecDeque;
use std::io;

use peanut::console::input::Terminal;
use peanut::console::{Console, ConsoleError, Lifecycle};
use peanut::core::action::Page;
use peanut::core::config::{PeanutConfig, resolve_with};
use peanut::core::state::Session;
use peanut::core::store::TaskStore;
use peanut::core::task::{ListTaskFilter, TaskStatus};

// ============================================================================
// Helper Functions
// ============================================================================

/// Answers prompts from a script and captures output.
struct Script {
    answers: VecDeque<String>,
    output: String,
}

impl Script {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            output: String::new(),
        }
    }
}

impl Terminal for Script {
    fn read_line(&mut self) -> io::Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn read_key(&mut self) -> io::Result<String> {
        self.read_line()
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }
}

/// Keystrokes that create a task with only a name, from the root menu.
fn create(name: &str) -> Vec<&str> {
    vec!["2", name, "", "", "", ""]
}

fn launch(store: TaskStore, answers: &[&str]) -> (Console<Script>, Result<(), ConsoleError>) {
    let mut console = Console::new(store, Script::new(answers), Session::default());
    let result = console.launch(&Lifecycle::standard());
    (console, result)
}

// ============================================================================
// Full Sessions
// ============================================================================

#[test]
fn test_create_then_list_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("peanut.db");

    let mut answers = Vec::new();
    answers.extend(create("alpha"));
    answers.extend(create("beta"));
    answers.extend(["1", "0", "0"]);

    let (console, result) = launch(TaskStore::open(&db).unwrap(), &answers);
    result.unwrap();

    let out = &console.term.output;
    assert!(out.starts_with("Peanut "));
    assert!(out.contains("Total: 2"));
    let beta = out.find("| 2  ").unwrap();
    let alpha = out.find("| 1  ").unwrap();
    assert!(beta < alpha, "newest task should be listed first:\n{out}");
    assert!(out.ends_with("Bye!\n"));

    // tasks survive the session
    let reopened = TaskStore::open(&db).unwrap();
    let page = reopened.query(1, 10, &ListTaskFilter::default()).unwrap();
    assert_eq!(page.total, 2);
    assert!(page.tasks.iter().all(|t| t.status == TaskStatus::InProgress));
}

#[test]
fn test_paging_through_list() {
    let store = TaskStore::open_in_memory().unwrap();
    let mut answers = Vec::new();
    for i in 0..12 {
        answers.push("2");
        answers.push(if i % 2 == 0 { "even task" } else { "odd task" });
        answers.extend(["", "", "", ""]);
    }
    // list, next, next (empty page 3), prev
    answers.extend(["1", "2", "2", "1"]);

    let (console, result) = launch(store, &answers);
    assert!(matches!(result, Err(ConsoleError::Input(_))));
    assert_eq!(console.session.page, Page::ListTasks);
    assert_eq!(console.session.list_page, 1);
    assert!(console.term.output.contains("Page:  3"));
    assert!(console.term.output.contains("Total: 12"));
}

#[test]
fn test_name_filter_narrows_total_and_resets_on_exit() {
    let store = TaskStore::open_in_memory().unwrap();
    let mut answers = Vec::new();
    answers.extend(create("Buy ABC"));
    answers.extend(create("abc report"));
    answers.extend(create("unrelated"));
    answers.extend(["1", "3", "abc", "0"]);

    let (console, result) = launch(store, &answers);
    assert!(matches!(result, Err(ConsoleError::Input(_))));
    assert!(console.term.output.contains("Total: 3"));
    assert!(console.term.output.contains("Total: 2"));
    assert!(console.term.output.contains("Filtered: name like 'abc'"));
    assert_eq!(console.session.page, Page::Console);
    assert!(console.session.filter.is_empty());
}

#[test]
fn test_unknown_input_on_list_page_reloads() {
    let store = TaskStore::open_in_memory().unwrap();
    let (console, _) = launch(store, &["1", "x", "0", "0"]);
    assert_eq!(console.term.output.matches("Total: 0").count(), 2);
}

#[test]
fn test_shutdown_hooks_skipped_on_fatal_error() {
    let store = TaskStore::open_in_memory().unwrap();
    let (console, result) = launch(store, &["1"]);
    assert!(result.is_err());
    assert!(!console.term.output.contains("Bye!"));
}

#[test]
fn test_console_from_config() {
    let config = PeanutConfig::default();
    let mut resolved = resolve_with(&config, None, |_| None);
    resolved.version = "7.7.7".to_string();
    resolved.page_size = 2;

    let store = TaskStore::open_in_memory().unwrap();
    let mut console = Console::from_config(store, Script::new(&["0"]), &resolved);
    console.launch(&Lifecycle::standard()).unwrap();
    assert_eq!(console.session.page_size, 2);
    assert!(console.term.output.starts_with("Peanut 7.7.7 launched"));
}
