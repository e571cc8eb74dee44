//! Tracing setup: stderr by default, or a daily-rotated file.

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::{
  non_blocking::{NonBlocking, WorkerGuard},
  rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter};

/// Rotated files kept, the active one included.
const KEEP_LOG_FILES: usize = 4;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level`. With a `log_file` the returned guard must
/// live until exit, or buffered lines are lost.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let level = level.parse().unwrap_or(LevelFilter::INFO);
  let filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let (writer, guard) = match log_file {
    Some(path) => {
      let (writer, guard) = file_writer(path)?;
      (BoxMakeWriter::new(writer), Some(guard))
    }
    None => (BoxMakeWriter::new(std::io::stderr), None),
  };

  tracing_subscriber::fmt()
    .with_writer(writer)
    .with_ansi(guard.is_none())
    .with_env_filter(filter)
    .init();
  Ok(guard)
}

/// Non-blocking writer for `path`. Files are named `<name>.YYYY-MM-DD` next
/// to it; the directory is created if needed.
pub fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
  let dir = path
    .parent()
    .filter(|d| !d.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  let name = path
    .file_name()
    .with_context(|| format!("log_file {path:?} has no file name"))?;

  std::fs::create_dir_all(dir)
    .with_context(|| format!("cannot create log directory {dir:?}"))?;
  let appender = RollingFileAppender::builder()
    .rotation(Rotation::DAILY)
    .filename_prefix(name.to_string_lossy())
    .max_log_files(KEEP_LOG_FILES)
    .build(dir)
    .with_context(|| format!("cannot open log file in {dir:?}"))?;

  Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_writer_creates_dir_and_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");
    let (writer, guard) = file_writer(&logs.join("sked.log")).unwrap();

    let subscriber = tracing_subscriber::fmt()
      .with_writer(writer)
      .with_ansi(false)
      .finish();
    tracing::subscriber::with_default(subscriber, || {
      tracing::info!(tabs = 6, "refreshing all tabs");
    });
    drop(guard);

    let files: Vec<_> = std::fs::read_dir(&logs)
      .unwrap()
      .map(|e| e.unwrap().path())
      .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("sked.log."), "{name}");

    let text = std::fs::read_to_string(&files[0]).unwrap();
    assert!(text.contains("refreshing all tabs"));
    assert!(text.contains("tabs=6"));
  }

  #[test]
  fn bare_directory_is_rejected() {
    assert!(file_writer(Path::new("/")).is_err());
  }
}
