use std::io::ErrorKind;
use std::process;

use chrono::Utc;
use tracing::{error, info};

use feedrelay::config::DEFAULT_CONFIG_PATH;
use feedrelay::datetime::to_day;
use feedrelay::{Config, RelayError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(RelayError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            eprintln!("{config_path} not found, using default configuration.");
            Config::default()
        }
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            process::exit(1);
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        process::exit(1);
    }

    // Initialize logging
    if let Err(e) = feedrelay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feedrelay::logging::init_console_only(&config.logging.level);
    }

    // "now" is captured exactly once per run
    let today = to_day(&Utc::now());

    match feedrelay::run(&config, today).await {
        Ok(report) => {
            info!(
                "Done: {} new record(s), {} failed source(s)",
                report.added.len(),
                report.failures.len()
            );
            info!("------------------------------------------");
        }
        Err(e) => {
            error!("Run aborted: {e}");
            eprintln!("feedrelay: {e}");
            process::exit(1);
        }
    }
}
