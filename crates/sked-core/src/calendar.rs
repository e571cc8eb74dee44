//! Week parity and weekday arithmetic, plus the record filters built on them.
//!
//! Parity is counted in whole weeks from a fixed anchor Monday, which is an
//! upper (`в`) week. Dates before the anchor continue the same alternation.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::lesson::{LessonRecord, WeekParity};

/// Localised weekday names, Monday first.
pub const DAY_NAMES: [&str; 7] = [
  "Понедельник",
  "Вторник",
  "Среда",
  "Четверг",
  "Пятница",
  "Суббота",
  "Воскресенье",
];

/// Days that carry classes, in display order.
pub const STUDY_DAYS: [Weekday; 6] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
];

pub fn day_name(weekday: Weekday) -> &'static str {
  DAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Name of the weekday `offset_days` after `today`.
pub fn day_name_at(today: NaiveDate, offset_days: u64) -> &'static str {
  let date = today.checked_add_days(Days::new(offset_days)).unwrap_or(today);
  day_name(date.weekday())
}

/// Records whose day field equals `day` exactly.
pub fn filter_by_day(records: &[LessonRecord], day: &str) -> Vec<LessonRecord> {
  records.iter().filter(|r| r.day == day).cloned().collect()
}

// ─── Calendar ────────────────────────────────────────────────────────────────

/// Alternating upper/lower week calendar anchored at a known upper Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
  anchor: NaiveDate,
}

impl WeekCalendar {
  /// `anchor` should be a Monday; other days shift the week boundary.
  pub fn new(anchor: NaiveDate) -> Self { Self { anchor } }

  pub fn anchor(&self) -> NaiveDate { self.anchor }

  /// `floor((date - anchor) / 7) mod 2`: `0` is upper, `1` is lower.
  pub fn week_parity(&self, date: NaiveDate) -> WeekParity {
    let weeks = date.signed_duration_since(self.anchor).num_days().div_euclid(7);
    if weeks.rem_euclid(2) == 0 {
      WeekParity::Upper
    } else {
      WeekParity::Lower
    }
  }

  /// Keep lessons that run every week or whose tag matches the parity of
  /// `date`. Unrecognised tags never match.
  pub fn filter_by_week(
    &self,
    records: &[LessonRecord],
    date: NaiveDate,
  ) -> Vec<LessonRecord> {
    let current = self.week_parity(date);
    records
      .iter()
      .filter(|r| r.week_type.trim().is_empty() || r.parity() == Some(current))
      .cloned()
      .collect()
  }
}

impl Default for WeekCalendar {
  /// 1 September 2025, the first upper week of the 2025/26 academic year.
  fn default() -> Self {
    Self::new(NaiveDate::from_ymd_opt(2025, 9, 1).expect("2025-09-01 is a valid date"))
  }
}
