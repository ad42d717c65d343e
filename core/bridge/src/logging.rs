use std::env;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEBUG_ENV: &str = "GEO_PRESENCE_DEBUG_LOG";
const LOG_FILE_NAME: &str = "geo-presence.log";

/// Console plus daily rolling file. Keep the guard alive for the process lifetime.
pub fn init(debug: bool) -> Option<WorkerGuard> {
    let debug_enabled = debug
        || env::var(DEBUG_ENV)
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
            .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let console_layer = fmt::layer().with_target(true);

    let (file_layer, guard) = match log_directory() {
        Some(log_dir) => {
            let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if debug_enabled {
        tracing::debug!("--------------------- Debug mode enabled ---------------------");
    }

    guard
}

fn log_directory() -> Option<PathBuf> {
    let log_dir = dirs::home_dir()?.join(".geo-presence").join("logs");
    if let Err(err) = fs_err::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", err);
        return None;
    }
    Some(log_dir)
}
