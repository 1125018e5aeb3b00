//! # Session State
//!
//! Everything a console session remembers between commands.
//!
//! ```text
//! Session
//! ├── page: Page                  // root menu or task list
//! ├── list_page: u32              // 1-based pagination offset
//! ├── page_size: u32              // rows per list page
//! ├── filter: ListTaskFilter      // active list constraints
//! └── policy: SessionPolicy       // how list failures / filters behave
//! ```
//!
//! Nothing here is global: each `Session` is independent, so tests can run
//! as many as they like side by side.

use crate::core::action::Page;
use crate::core::config::ResolvedConfig;
use crate::core::task::ListTaskFilter;

/// Knobs for behaviour that is a product decision rather than a fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// A failed list query ends the session instead of staying on the page.
    pub abort_on_list_error: bool,
    /// Changing a filter jumps back to page 1.
    pub reset_page_on_filter: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            abort_on_list_error: true,
            reset_page_on_filter: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub page: Page,
    pub list_page: u32,
    pub page_size: u32,
    pub filter: ListTaskFilter,
    pub policy: SessionPolicy,
}

impl Session {
    pub fn new(page_size: u32, policy: SessionPolicy) -> Self {
        Self {
            page: Page::Console,
            list_page: 1,
            page_size: page_size.max(1),
            filter: ListTaskFilter::default(),
            policy,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.page_size,
            SessionPolicy {
                abort_on_list_error: config.abort_on_list_error,
                reset_page_on_filter: config.reset_page_on_filter,
            },
        )
    }

    /// Leaving the list page forgets the filter. Pagination is kept.
    pub fn return_to_console(&mut self) {
        self.filter = ListTaskFilter::default();
        self.page = Page::Console;
    }

    /// Steps back one page, never below page 1.
    pub fn retreat(&mut self) {
        if self.list_page > 1 {
            self.list_page -= 1;
        }
    }

    /// Page a "next page" request should fetch.
    pub fn next_list_page(&self) -> u32 {
        self.list_page.saturating_add(1)
    }

    /// Commits a "next page" request only if the fetched page had rows.
    pub fn advance_if(&mut self, fetched_rows: usize) {
        if fetched_rows > 0 {
            self.list_page = self.next_list_page();
        }
    }

    /// Applies a filter change through `mutate`, honouring the policy.
    pub fn update_filter(&mut self, mutate: impl FnOnce(&mut ListTaskFilter)) {
        mutate(&mut self.filter);
        if self.policy.reset_page_on_filter {
            self.list_page = 1;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(10, SessionPolicy::default())
    }
}
