//! Log output setup.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global subscriber. Logs go to `settings.file` when set
/// (appending, flushed by a background writer), otherwise to stderr.
///
/// The returned guard must live until exit or buffered lines are lost.
pub fn init(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("mrec=info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(file) = settings.file.as_deref() else {
        builder.with_writer(std::io::stderr).init();
        return None;
    };

    match log_writer(file) {
        Some((writer, guard)) => {
            builder.with_writer(writer).with_ansi(false).init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            tracing::warn!(path = %file.display(), "cannot open log file, logging to stderr");
            None
        }
    }
}

fn log_writer(file: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    let dir = file.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = file.file_name()?.to_str()?;
    fs::create_dir_all(dir).ok()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .ok()?;
    Some(tracing_appender::non_blocking(appender))
}
