//! Error types for the timetable sheet parser.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("CSV input is empty")]
  Empty,

  #[error("unterminated quoted field starting on line {line}")]
  UnterminatedQuote { line: usize },

  #[error("CSV has fewer than two header rows")]
  MissingHeader,

  #[error("table has {width} columns, need at least day/time/week")]
  TooNarrow { width: usize },

  #[error("group {0} not found in header")]
  GroupNotFound(String),

  #[error("group block at column {start} does not fit a table {width} columns wide")]
  BlockOutOfRange { start: usize, width: usize },

  /// Per-row error: the row is skipped, parsing continues.
  #[error("row {row} has {found} cells, table is {width} wide")]
  RowTooWide { row: usize, found: usize, width: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
