//! File logging. The terminal owns stdout, so log lines go to a daily
//! rotated file instead.

use crate::error::{Result, SiteError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "ORBITSITE_LOG";
const LOG_FILE: &str = "orbitsite.log";

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the program or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("orbitsite=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| SiteError::Logging(e.to_string()))?;

    tracing::info!(log_dir = %log_dir.display(), "logging initialised");
    Ok(guard)
}
