//! Plain-text rendering of a day's lessons and of whole-week views.
//!
//! Output is deterministic: the same records always produce the same bytes.
//! Markup (bold, escaping) is left to whatever transport sends the text.

use chrono::{Days, NaiveDate};

use crate::{
  calendar::{STUDY_DAYS, WeekCalendar, day_name, day_name_at, filter_by_day},
  group::GroupCode,
  lesson::LessonRecord,
};

/// Line printed between lesson blocks.
pub const SEPARATOR: &str = "————————————————————";

/// Body printed under the heading of a day without lessons.
pub const NO_CLASSES: &str = "Занятий нет";

/// Render one day.
///
/// Lessons are ordered by start time (stable, so equal times keep input
/// order; unparsable times come first). When `show_week_per_lesson` is off,
/// the heading carries the first lesson's parity tag instead.
pub fn format_day(
  records: &[LessonRecord],
  day_name: &str,
  show_week_per_lesson: bool,
) -> String {
  if records.is_empty() {
    return format!("{day_name}\n\n{NO_CLASSES}\n");
  }

  let mut sorted: Vec<&LessonRecord> = records.iter().collect();
  sorted.sort_by_key(|r| r.start_minutes());

  let heading = match sorted[0].week_type.trim() {
    week if !show_week_per_lesson && !week.is_empty() => {
      format!("{day_name} [{week}]")
    }
    _ => day_name.to_string(),
  };

  let mut out = vec![heading, SEPARATOR.to_string()];
  for lesson in sorted {
    out.push(lesson_block(lesson, show_week_per_lesson));
    out.push(SEPARATOR.to_string());
  }
  out.join("\n")
}

fn lesson_block(lesson: &LessonRecord, show_week: bool) -> String {
  let mut lines = Vec::with_capacity(4);

  if !lesson.time.is_empty() {
    let week = lesson.week_type.trim();
    if show_week && !week.is_empty() {
      lines.push(format!("⏰ {} [{week}]", lesson.time));
    } else {
      lines.push(format!("⏰ {}", lesson.time));
    }
  }
  if !lesson.subject.is_empty() {
    lines.push(lesson.subject.clone());
  }
  if !lesson.kind.is_empty() {
    lines.push(format!("({})", lesson.kind));
  }

  let location = lesson.location();
  let teachers = lesson.teachers().join(", ");
  let place = match (location.is_empty(), teachers.is_empty()) {
    (false, false) => format!("{location} — {teachers}"),
    (false, true) => location,
    (true, _) => teachers,
  };
  if !place.is_empty() {
    lines.push(place);
  }

  lines.join("\n")
}

// ─── Period views ────────────────────────────────────────────────────────────

/// The views a user can ask for once a group has been found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
  Today,
  Tomorrow,
  /// Monday..Saturday filtered to the parity of `today`.
  CurrentWeek,
  /// Monday..Saturday filtered to the parity of `today + 7`.
  NextWeek,
  /// Monday..Saturday without parity filtering; tags shown per lesson.
  AllWeeks,
}

/// Render `period` as a list of messages, in send order.
///
/// Day views yield a single block. Week views yield a heading naming the
/// group followed by one block per study day.
pub fn render_period(
  records: &[LessonRecord],
  group: &GroupCode,
  period: Period,
  today: NaiveDate,
  calendar: &WeekCalendar,
) -> Vec<String> {
  match period {
    Period::Today => vec![render_date(records, today, 0, calendar)],
    Period::Tomorrow => vec![render_date(records, today, 1, calendar)],
    Period::CurrentWeek => {
      let mut out = vec![format!("📆 Расписание на текущую неделю\nГруппа: {group}")];
      out.extend(week_blocks(records, Some((today, calendar))));
      out
    }
    Period::NextWeek => {
      let target = today.checked_add_days(Days::new(7)).unwrap_or(today);
      let mut out = vec![format!("📆 Расписание на следующую неделю\nГруппа: {group}")];
      out.extend(week_blocks(records, Some((target, calendar))));
      out
    }
    Period::AllWeeks => {
      let mut out = vec![format!("📆 Расписание на неделю (без фильтра)\nГруппа: {group}")];
      out.extend(week_blocks(records, None));
      out
    }
  }
}

fn render_date(
  records: &[LessonRecord],
  today: NaiveDate,
  offset: u64,
  calendar: &WeekCalendar,
) -> String {
  let day = day_name_at(today, offset);
  let date = today.checked_add_days(Days::new(offset)).unwrap_or(today);
  let lessons = calendar.filter_by_week(&filter_by_day(records, day), date);
  format_day(&lessons, day, false)
}

fn week_blocks(
  records: &[LessonRecord],
  parity_filter: Option<(NaiveDate, &WeekCalendar)>,
) -> Vec<String> {
  STUDY_DAYS
    .iter()
    .map(|&weekday| {
      let day = day_name(weekday);
      let lessons = filter_by_day(records, day);
      match parity_filter {
        Some((date, calendar)) => {
          format_day(&calendar.filter_by_week(&lessons, date), day, false)
        }
        None => format_day(&lessons, day, true),
      }
    })
    .collect()
}
