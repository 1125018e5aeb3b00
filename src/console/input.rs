//! Terminal input and output.
//!
//! The console only talks to the terminal through [`Terminal`], so a whole
//! session can be driven from a script in tests. [`StdTerminal`] is the real
//! stdin/stdout implementation.

use std::io::{self, BufRead, Read, Write};

use crossterm::terminal;
use log::debug;

use crate::core::config::MenuInput;

/// How a single prompt is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Everything up to the newline.
    Line,
    /// Exactly one keystroke, read in raw mode.
    Key,
}

impl From<MenuInput> for ReadMode {
    fn from(input: MenuInput) -> Self {
        match input {
            MenuInput::Line => ReadMode::Line,
            MenuInput::Key => ReadMode::Key,
        }
    }
}

pub trait Terminal {
    /// Blocks until a full line is available. End of input is an error.
    fn read_line(&mut self) -> io::Result<String>;

    /// Blocks until a single keystroke is available.
    fn read_key(&mut self) -> io::Result<String>;

    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Shows `message` (if any) and reads a trimmed answer.
    ///
    /// With `required`, blank answers are discarded and the read repeats.
    fn prompt(&mut self, message: &str, mode: ReadMode, required: bool) -> io::Result<String> {
        if !message.is_empty() {
            self.print(&format!("{message}\n"))?;
        }
        loop {
            let raw = match mode {
                ReadMode::Line => self.read_line()?,
                ReadMode::Key => self.read_key()?,
            };
            let text = raw.trim();
            if !required || !text.is_empty() {
                return Ok(text.to_string());
            }
        }
    }
}

/// Switches the terminal in and out of raw mode.
trait RawMode {
    fn is_enabled(&self) -> io::Result<bool>;
    fn enable(&self) -> io::Result<()>;
    fn disable(&self) -> io::Result<()>;
}

struct CrosstermRawMode;

impl RawMode for CrosstermRawMode {
    fn is_enabled(&self) -> io::Result<bool> {
        terminal::is_raw_mode_enabled()
    }

    fn enable(&self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable(&self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

/// Raw mode for as long as the guard lives.
///
/// Restores the previous mode on drop, which covers early returns and
/// read errors alike. If raw mode was already on, it is left on.
struct RawModeGuard<'a, M: RawMode> {
    mode: &'a M,
    was_raw: bool,
}

impl<'a, M: RawMode> RawModeGuard<'a, M> {
    fn enter(mode: &'a M) -> io::Result<Self> {
        let was_raw = mode.is_enabled()?;
        if !was_raw {
            mode.enable()?;
        }
        Ok(Self { mode, was_raw })
    }
}

impl<M: RawMode> Drop for RawModeGuard<'_, M> {
    fn drop(&mut self) {
        if !self.was_raw
            && let Err(e) = self.mode.disable()
        {
            log::error!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Runs `read` with raw mode on.
fn read_raw<M: RawMode, R>(mode: &M, read: impl FnOnce() -> io::Result<R>) -> io::Result<R> {
    let _raw = RawModeGuard::enter(mode)?;
    read()
}

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;

/// stdin/stdout terminal.
#[derive(Default)]
pub struct StdTerminal;

impl StdTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for StdTerminal {
    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }
        Ok(line)
    }

    fn read_key(&mut self) -> io::Result<String> {
        io::stdout().flush()?;

        let mut byte = [0u8; 1];
        let read = read_raw(&CrosstermRawMode, || io::stdin().lock().read(&mut byte))?;

        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }
        if byte[0] == CTRL_C || byte[0] == CTRL_D {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "interrupted by user",
            ));
        }

        let key = String::from_utf8_lossy(&byte).into_owned();
        debug!("Key read: {:?}", key);
        // raw mode does not echo
        self.print(&format!("{}\n", key.trim()))?;
        Ok(key)
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}
