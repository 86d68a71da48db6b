//! Sarathi daemon entry point

use sarathi::app::TeleopApp;
use sarathi::error::Error;
use sarathi::{AppConfig, Result};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default config location when no argument is given
const DEFAULT_CONFIG_PATH: &str = "/etc/sarathi.toml";

/// Parse config path from command line arguments.
///
/// Supports:
/// - `sarathi <path>` (positional)
/// - `sarathi --config <path>` (flag-based)
/// - `sarathi -c <path>` (short flag)
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn main() -> Result<()> {
    // Explicit config path must load; otherwise fall back from the default
    // location to built-in bench defaults.
    let (config, config_note) = match parse_config_path() {
        Some(path) => (AppConfig::from_file(&path)?, format!("config: {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => (
            AppConfig::from_file(DEFAULT_CONFIG_PATH)?,
            format!("config: {}", DEFAULT_CONFIG_PATH),
        ),
        None => (AppConfig::default(), "config: built-in defaults".to_string()),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Sarathi v0.2.0 starting...");
    log::info!("{}", config_note);

    // Shutdown flag: the interrupt handler only flips it, the main thread
    // unwinds normally so every owned resource is closed.
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let app = TeleopApp::new(config, running);
    match app.run() {
        Err(Error::Interrupted) => {
            log::info!("Interrupted while waiting, shut down cleanly");
            Ok(())
        }
        other => {
            if other.is_ok() {
                log::info!("Sarathi stopped");
            }
            other
        }
    }
}
