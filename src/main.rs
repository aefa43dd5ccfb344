// src/main.rs

mod app_logic;
mod core;
mod platform_layer;

use crate::app_logic::FileMergerLogic;
use crate::core::{MergeSession, MergerConfig};
use crate::platform_layer::console::{self, ConsoleDialogs};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::process::ExitCode;

const LOG_FILE_NAME: &str = "file_merger.log";

/*
 * Warnings and errors go to stderr; the full debug log goes to a file in the
 * system temp directory. If the log file cannot be created, only the terminal
 * logger is installed.
 */
fn initialize_logging() {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = std::env::temp_dir().join(LOG_FILE_NAME);
    let file_error = match File::create(&log_path) {
        Ok(file) => {
            loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
            None
        }
        Err(e) => Some(e),
    };

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {e}");
        return;
    }
    match file_error {
        None => log::info!("Logging to {log_path:?}."),
        Some(e) => log::warn!("Could not create log file {log_path:?}: {e}"),
    }
}

fn main() -> ExitCode {
    initialize_logging();
    log::info!("FileMerger starting.");

    let session = MergeSession::new(MergerConfig::default());
    let mut logic = FileMergerLogic::new(session, Box::new(ConsoleDialogs::new()));

    let run_result = console::run(&mut logic);
    log::info!("FileMerger exiting.");
    match run_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Console I/O failed: {e}");
            ExitCode::FAILURE
        }
    }
}
