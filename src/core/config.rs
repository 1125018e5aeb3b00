//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.peanut/config.toml` unless `--config` points
//! elsewhere. If the default file is missing on first run, a commented-out
//! default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PeanutConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub version: Option<String>,
    pub menu_input: Option<MenuInput>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListConfig {
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    pub abort_on_list_error: Option<bool>,
    pub reset_page_on_filter: Option<bool>,
}

/// How a menu choice is read from the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuInput {
    /// Type the option and press Enter.
    #[default]
    Line,
    /// A single keystroke selects the option.
    Key,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");
const DATA_DIR_NAME: &str = ".peanut";
const DB_FILE_NAME: &str = "peanut.db";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub version: String,
    pub menu_input: MenuInput,
    pub db_path: PathBuf,
    pub page_size: u32,
    pub abort_on_list_error: bool,
    pub reset_page_on_filter: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.peanut`, or `.peanut` in the working directory when there is
/// no home directory.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

/// Returns the path to `~/.peanut/config.toml`.
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Load config from `explicit` or, when `None`, from `~/.peanut/config.toml`.
///
/// A missing default file is generated (commented out) and defaults are
/// returned. A missing explicit file is only warned about. A malformed file
/// returns `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<PeanutConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file {} not found, using defaults", path.display());
        } else {
            info!("No config file found, generating default at {}", path.display());
            generate_default_config(&path);
        }
        return Ok(PeanutConfig::default());
    }

    let contents = fs::read_to_string(&path)?;
    let config: PeanutConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Peanut Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# version = "0.1.0"                  # Shown in the welcome banner
# menu_input = "line"                # "line" or "key" (single keystroke)

# [database]
# path = "~/.peanut/peanut.db"       # Or set PEANUT_DB env var, or --db

# [list]
# page_size = 10                     # Or set PEANUT_PAGE_SIZE env var

# [session]
# abort_on_list_error = true         # A failed list query ends the session
# reset_page_on_filter = false       # Changing a filter jumps back to page 1
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_db` is the `--db` flag (None = not specified).
pub fn resolve(config: &PeanutConfig, cli_db: Option<&Path>) -> ResolvedConfig {
    resolve_with(config, cli_db, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with(
    config: &PeanutConfig,
    cli_db: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Database: CLI → env → config → default
    let db_path = cli_db
        .map(Path::to_path_buf)
        .or_else(|| env("PEANUT_DB").map(|p| expand_home(&p)))
        .or_else(|| config.database.path.as_deref().map(expand_home))
        .unwrap_or_else(|| data_dir().join(DB_FILE_NAME));

    // Page size: env → config → default
    let page_size = env("PEANUT_PAGE_SIZE")
        .and_then(|raw| match raw.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("Ignoring PEANUT_PAGE_SIZE={}: {}", raw, e);
                None
            }
        })
        .or(config.list.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1);

    ResolvedConfig {
        version: config
            .general
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        menu_input: config.general.menu_input.unwrap_or_default(),
        db_path,
        page_size,
        abort_on_list_error: config.session.abort_on_list_error.unwrap_or(true),
        reset_page_on_filter: config.session.reset_page_on_filter.unwrap_or(false),
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
