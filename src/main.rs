use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use peanut::console;
use peanut::core::config;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

#[derive(Parser)]
#[command(name = "peanut", version, about = "Terminal task tracker")]
struct Args {
    /// Config file to use instead of ~/.peanut/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    init_logging();

    let loaded = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(&loaded, args.db.as_deref());
    log::info!("Peanut starting with database {}", resolved.db_path.display());

    match console::run(&resolved) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Console encountered fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Warnings and errors go to stderr; everything down to debug goes to
/// `peanut.log` in the data directory.
fn init_logging() {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let dir = config::data_dir();
    let log_path = match std::fs::create_dir_all(&dir) {
        Ok(()) => dir.join("peanut.log"),
        Err(_) => PathBuf::from("peanut.log"),
    };
    if let Ok(log_file) = File::create(&log_path) {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, log_file));
    }

    let _ = CombinedLogger::init(loggers);
}
