//! # Commands
//!
//! Everything the user can ask for becomes a `Command`.
//! Typing `2` on the root menu? That's `Command::CreateTask`.
//! Typing `2` on the list page? That's `Command::NextPage`.
//!
//! Parsing depends only on the current `Page` and the raw input, so the
//! same pair always yields the same command:
//!
//! ```text
//! (Page, &str)  →  parse_command()  →  Command
//! ```

/// A state of the navigation state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    /// Root menu.
    #[default]
    Console,
    /// Task list with its filter menu.
    ListTasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    /// Back to the root menu, clearing the filter.
    GotoConsole,
    /// Show (or reload) the current list page.
    GotoListTasks,
    CreateTask,
    GotoUpdateTask,
    GotoDeleteTask,
    PrevPage,
    NextPage,
    FilterName,
    FilterStatus,
    FilterCurrentWeek,
    FilterCurrentMonth,
    /// Unrecognised input; stay where we are.
    Ignore,
}

pub fn parse_command(page: Page, input: &str) -> Command {
    match page {
        Page::Console => match input {
            "0" => Command::Exit,
            "1" => Command::GotoListTasks,
            "2" => Command::CreateTask,
            "3" => Command::GotoUpdateTask,
            "4" => Command::GotoDeleteTask,
            _ => Command::Ignore,
        },
        Page::ListTasks => match input {
            "0" => Command::GotoConsole,
            "1" => Command::PrevPage,
            "2" => Command::NextPage,
            "3" => Command::FilterName,
            "4" => Command::FilterStatus,
            "5" => Command::FilterCurrentWeek,
            "6" => Command::FilterCurrentMonth,
            // anything else reloads the list
            _ => Command::GotoListTasks,
        },
    }
}

pub const MENU_TITLE: &str = "What to do next?";

/// Menu options for `page`, in the order their index selects them.
pub fn menu_options(page: Page) -> &'static [&'static str] {
    match page {
        Page::Console => &[
            "Exit",
            "List Tasks",
            "Create Task",
            "Update Task",
            "Delete Task",
        ],
        Page::ListTasks => &[
            "Exit",
            "Prev Page",
            "Next Page",
            "Filter Name",
            "Filter Status",
            "Filter Current Week",
            "Filter Current Month",
        ],
    }
}
