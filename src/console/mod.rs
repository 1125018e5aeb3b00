//! # Console Adapter
//!
//! The terminal-facing layer. Renders menus, reads answers, turns them into
//! `core::action::Command` values and carries them out against the store.
//!
//! ## Session Loop
//!
//! ```text
//! bootstrap hooks ─► banner ─► ┌──────────────────────────────┐
//!                              │ menu for session.page        │
//!                              │ prompt (required)            │
//!                              │ parse_command(page, input)   │
//!                              │ execute(command) ─► Effect   │
//!                              └──────────────┬───────────────┘
//!                                   Quit      │     error
//!                      shutdown hooks ◄───────┴──────► Err(..)
//! ```
//!
//! ## Failure Policy
//!
//! Terminal I/O failures end the session. A failed insert is logged and the
//! session carries on. A failed list query ends the session unless
//! `abort_on_list_error` is turned off, in which case it is logged and the
//! user stays on the list page.

pub mod input;
pub mod render;

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use thiserror::Error;

use crate::console::input::{ReadMode, StdTerminal, Terminal};
use crate::console::render::{render_menu, render_task_page};
use crate::core::action::{Command, MENU_TITLE, Page, menu_options, parse_command};
use crate::core::config::{MenuInput, ResolvedConfig};
use crate::core::state::Session;
use crate::core::store::{StoreError, TaskStore};
use crate::core::task::{Task, TaskStatus};
use crate::core::time::{self, month_begin, parse_time, week_begin};

const STATUS_PROMPT: &str = "Status [IN_PROGRESS | FINISHED | CANCELLED]:";
const FILTER_STATUS_PROMPT: &str = "Filter by status [IN_PROGRESS | FINISHED | CANCELLED]:";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to read from console: {0}")]
    Input(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{name} step failed: {source}")]
    Hook {
        name: &'static str,
        source: Box<ConsoleError>,
    },
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Continue,
    Quit,
}

/// A console session bound to one terminal and one store.
pub struct Console<T: Terminal> {
    pub store: TaskStore,
    pub term: T,
    pub session: Session,
    pub version: String,
    pub menu_input: MenuInput,
    clock: fn() -> NaiveDateTime,
}

impl<T: Terminal> Console<T> {
    pub fn new(store: TaskStore, term: T, session: Session) -> Self {
        Self {
            store,
            term,
            session,
            version: crate::core::config::DEFAULT_VERSION.to_string(),
            menu_input: MenuInput::default(),
            clock: time::now,
        }
    }

    pub fn from_config(store: TaskStore, term: T, config: &ResolvedConfig) -> Self {
        let mut console = Self::new(store, term, Session::from_config(config));
        console.version = config.version.clone();
        console.menu_input = config.menu_input;
        console
    }

    /// Replaces the wall clock, for week/month filters and creation times.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Runs bootstrap hooks, the session loop, then shutdown hooks.
    ///
    /// Shutdown hooks only run when the loop ends through `Exit`.
    pub fn launch(&mut self, lifecycle: &Lifecycle<T>) -> Result<(), ConsoleError> {
        lifecycle.run_bootstrap(self)?;

        info!("Peanut {} launched", self.version);
        self.term
            .print(&format!("Peanut {} launched\n", self.version))?;

        self.run_loop()?;

        lifecycle.run_shutdown(self)
    }

    /// Reads and executes commands until `Exit`.
    pub fn run_loop(&mut self) -> Result<(), ConsoleError> {
        loop {
            let page = self.session.page;
            let menu = render_menu(MENU_TITLE, menu_options(page));
            let input = self
                .term
                .prompt(&format!("\n{menu}"), self.menu_input.into(), true)?;

            let command = parse_command(page, &input);
            debug!("{:?} + '{}' → {:?}", page, input, command);

            if self.execute(command)? == Effect::Quit {
                return Ok(());
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Effect, ConsoleError> {
        match command {
            Command::Exit => return Ok(Effect::Quit),
            Command::GotoConsole => self.session.return_to_console(),
            Command::GotoListTasks => self.show_list()?,
            Command::NextPage => self.next_page()?,
            Command::PrevPage => {
                self.session.retreat();
                self.show_list()?;
            }
            Command::FilterName => {
                let name = self.term.prompt("Filtering by name", ReadMode::Line, false)?;
                self.session.update_filter(|f| f.name = name);
                self.show_list()?;
            }
            Command::FilterStatus => {
                let raw = self.term.prompt(FILTER_STATUS_PROMPT, ReadMode::Line, false)?;
                let status = TaskStatus::parse_or(&raw, TaskStatus::None);
                self.session.update_filter(|f| f.status = status);
                self.show_list()?;
            }
            Command::FilterCurrentWeek => {
                let begin = week_begin((self.clock)());
                self.session
                    .update_filter(|f| f.actual_start.open = Some(begin));
                self.show_list()?;
            }
            Command::FilterCurrentMonth => {
                let begin = month_begin((self.clock)());
                self.session
                    .update_filter(|f| f.actual_start.open = Some(begin));
                self.show_list()?;
            }
            Command::CreateTask => self.create_task()?,
            Command::GotoUpdateTask | Command::GotoDeleteTask => {
                debug!("{:?} has no handler yet, staying on {:?}", command, self.session.page);
            }
            Command::Ignore => {}
        }
        Ok(Effect::Continue)
    }

    /// Shows the current list page.
    fn show_list(&mut self) -> Result<(), ConsoleError> {
        self.session.page = Page::ListTasks;
        let number = self.session.list_page;
        match self
            .store
            .query(number, self.session.page_size, &self.session.filter)
        {
            Ok(page) => {
                let out = render_task_page(number, &page, &self.session.filter);
                self.term.print(&out)?;
                Ok(())
            }
            Err(e) => self.list_failed(e),
        }
    }

    /// Fetches the following page and moves there only if it has rows.
    fn next_page(&mut self) -> Result<(), ConsoleError> {
        self.session.page = Page::ListTasks;
        let number = self.session.next_list_page();
        match self
            .store
            .query(number, self.session.page_size, &self.session.filter)
        {
            Ok(page) => {
                let out = render_task_page(number, &page, &self.session.filter);
                self.term.print(&out)?;
                self.session.advance_if(page.tasks.len());
                Ok(())
            }
            Err(e) => self.list_failed(e),
        }
    }

    fn list_failed(&mut self, e: StoreError) -> Result<(), ConsoleError> {
        if self.session.policy.abort_on_list_error {
            return Err(e.into());
        }
        warn!("Failed to load page {}: {}", self.session.list_page, e);
        Ok(())
    }

    fn create_task(&mut self) -> Result<(), ConsoleError> {
        let task = self.task_from_input()?;
        // insert failures do not end the session
        match self.store.insert(&task) {
            Ok(id) => self.term.print(&format!("Created task {id}\n"))?,
            Err(e) => warn!("Failed to save task: {}", e),
        }
        Ok(())
    }

    fn task_from_input(&mut self) -> Result<Task, ConsoleError> {
        let now = (self.clock)();

        let name = self.term.prompt("Name:", ReadMode::Line, true)?;
        let mut task = Task::new(name, now);

        let status = self.term.prompt(STATUS_PROMPT, ReadMode::Line, false)?;
        task.status = TaskStatus::parse_or(&status, TaskStatus::InProgress);

        let actual_start = self.term.prompt("Actual Start:", ReadMode::Line, false)?;
        task.actual_start = parse_time(&actual_start, now);
        let expected_end = self.term.prompt("Expected End:", ReadMode::Line, false)?;
        task.expected_end = parse_time(&expected_end, now);
        let actual_end = self.term.prompt("Actual End:", ReadMode::Line, false)?;
        task.actual_end = parse_time(&actual_end, now);

        Ok(task)
    }
}

pub type Hook<T> = Box<dyn Fn(&mut Console<T>) -> Result<(), ConsoleError>>;

/// Ordered startup and teardown steps run around the session loop.
pub struct Lifecycle<T: Terminal> {
    bootstrap: Vec<(&'static str, Hook<T>)>,
    shutdown: Vec<(&'static str, Hook<T>)>,
}

impl<T: Terminal> Default for Lifecycle<T> {
    fn default() -> Self {
        Self {
            bootstrap: Vec::new(),
            shutdown: Vec::new(),
        }
    }
}

impl<T: Terminal> Lifecycle<T> {
    /// Schema creation on the way in, a farewell on the way out.
    pub fn standard() -> Self {
        Self::default()
            .on_bootstrap("schema", |console| {
                console.store.create_schema()?;
                Ok(())
            })
            .on_shutdown("farewell", |console| {
                info!("Bye!");
                console.term.print("Bye!\n")?;
                Ok(())
            })
    }

    pub fn on_bootstrap(
        mut self,
        name: &'static str,
        hook: impl Fn(&mut Console<T>) -> Result<(), ConsoleError> + 'static,
    ) -> Self {
        self.bootstrap.push((name, Box::new(hook)));
        self
    }

    pub fn on_shutdown(
        mut self,
        name: &'static str,
        hook: impl Fn(&mut Console<T>) -> Result<(), ConsoleError> + 'static,
    ) -> Self {
        self.shutdown.push((name, Box::new(hook)));
        self
    }

    pub fn run_bootstrap(&self, console: &mut Console<T>) -> Result<(), ConsoleError> {
        run_hooks(&self.bootstrap, console)
    }

    pub fn run_shutdown(&self, console: &mut Console<T>) -> Result<(), ConsoleError> {
        run_hooks(&self.shutdown, console)
    }
}

fn run_hooks<T: Terminal>(
    hooks: &[(&'static str, Hook<T>)],
    console: &mut Console<T>,
) -> Result<(), ConsoleError> {
    for (name, hook) in hooks {
        debug!("Running {} hook", name);
        hook(console).map_err(|source| ConsoleError::Hook {
            name: *name,
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Opens the configured database and runs an interactive session on stdin/stdout.
pub fn run(config: &ResolvedConfig) -> Result<(), ConsoleError> {
    let store = TaskStore::open(&config.db_path)?;
    let mut console = Console::from_config(store, StdTerminal::new(), config);
    console.launch(&Lifecycle::standard())
}
