//! Timetable sheet codec for sked.
//!
//! Turns the CSV export of one timetable tab into [`LessonRecord`]s for a
//! single group. Pure and synchronous; safe to call from any number of
//! requests at once.
//!
//! # Quick start
//!
//! ```no_run
//! use sked_core::GroupCode;
//!
//! let csv = std::fs::read_to_string("data/csv/gid_0.csv").unwrap();
//! let group = GroupCode::parse("8251160").unwrap();
//! let lessons = sked_sheet::parse_schedule(&csv, &group);
//! println!("{} lessons", lessons.len());
//! ```

pub mod csv;
pub mod error;
mod parse;

pub use error::{Error, Result};
use sked_core::{GroupCode, LessonRecord};
use tracing::{error, warn};

/// Parse the lessons of `group` out of `csv_text`.
///
/// Never fails: a missing group or a malformed table is logged and yields an
/// empty list. Use [`try_parse_schedule`] to see the reason.
pub fn parse_schedule(csv_text: &str, group: &GroupCode) -> Vec<LessonRecord> {
  match parse::parse_lessons(csv_text, group) {
    Ok(lessons) => lessons,
    Err(e @ (Error::Empty | Error::GroupNotFound(_))) => {
      warn!(group = %group, "{e}");
      Vec::new()
    }
    Err(e) => {
      error!(group = %group, error = %e, "failed to parse timetable");
      Vec::new()
    }
  }
}

/// Like [`parse_schedule`], but reports table-level failures.
pub fn try_parse_schedule(csv_text: &str, group: &GroupCode) -> Result<Vec<LessonRecord>> {
  parse::parse_lessons(csv_text, group)
}
