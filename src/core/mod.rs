//! # Core Application Logic
//!
//! This module contains Peanut's business logic.
//! It knows nothing about the terminal.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Task / filter model  │
//!                    │  • Command parsing      │
//!                    │  • Session state        │
//!                    │  • SQLite task store    │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                         ┌────────────┐
//!                         │  Console   │
//!                         │  Adapter   │
//!                         │ (crossterm)│
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`task`]: `Task`, `TaskStatus` and `ListTaskFilter`
//! - [`action`]: `Page`, `Command` and `parse_command()`
//! - [`state`]: the `Session` object threaded through every command
//! - [`store`]: `TaskStore`, the persistence adapter
//! - [`time`]: parsing, formatting and week/month boundaries
//! - [`config`]: file/env/CLI configuration

pub mod action;
pub mod config;
pub mod state;
pub mod store;
pub mod task;
pub mod time;
