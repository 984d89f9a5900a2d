//! Logging for ecotally
//!
//! Nothing is logged unless the binary asks for it. When it does, events go
//! to one file per UTC day, `ecotally.YYYY-MM-DD.log`, in the XDG state
//! directory. Older files beyond `logging.max_files` are pruned by the
//! appender.
//!
//! The level comes from `ECOTALLY_LOG`, then `RUST_LOG`, then the config.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const FILE_PREFIX: &str = "ecotally";
const FILE_SUFFIX: &str = "log";

/// Install the file subscriber. Keep the returned guard alive until exit.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let dir = Config::log_dir();
    std::fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(config.max_files.max(1))
        .build(&dir)
        .map_err(|e| Error::Config(format!("failed to open log file: {}", e)))?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(level_filter(&config.level))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    let guard = LoggingGuard {
        dir,
        _worker: worker,
    };
    tracing::info!(
        file = %guard.current_file().display(),
        level = %config.level,
        "Logging initialized"
    );
    Ok(guard)
}

/// Subscriber for tests, printing through the test harness
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

fn level_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env("ECOTALLY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(configured))
}

/// Flushes pending log lines when dropped.
pub struct LoggingGuard {
    dir: PathBuf,
    _worker: WorkerGuard,
}

impl LoggingGuard {
    /// The file today's events are written to
    pub fn current_file(&self) -> PathBuf {
        daily_file(&self.dir, Utc::now().date_naive())
    }
}

fn daily_file(dir: &Path, day: NaiveDate) -> PathBuf {
    dir.join(format!(
        "{}.{}.{}",
        FILE_PREFIX,
        day.format("%Y-%m-%d"),
        FILE_SUFFIX
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_file_name() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            daily_file(Path::new("/state/ecotally"), day),
            PathBuf::from("/state/ecotally/ecotally.2026-10-18.log")
        );
    }
}
