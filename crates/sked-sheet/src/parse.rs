//! Timetable sheet → lesson records.
//!
//! Sheet layout:
//!   row 0      group labels (e.g. `8251160/Группа`) over each group block
//!   row 1      field labels under every column
//!   row 2..    one row per lesson slot
//!
//!   col 0      day name, only filled on the first slot of each day
//!   col 1      time of day
//!   col 2      week parity tag
//!   col 3..    repeating 8-column blocks, one per group

use sked_core::{GroupCode, LessonRecord};
use tracing::debug;

use crate::{
  csv::{Grid, tokenize},
  error::{Error, Result},
};

const DAY: usize = 0;
const TIME: usize = 1;
const WEEK: usize = 2;
const LEADING_COLUMNS: usize = 3;

/// Offsets inside a group block. Offsets 5 and 6 are unused.
const SUBJECT: usize = 0;
const BUILDING: usize = 1;
const ROOM1: usize = 2;
const ROOM2: usize = 3;
const KIND: usize = 4;
const TEACHER: usize = 7;

const HEADER_ROWS: usize = 2;

/// Where the requested group sits in the grid.
struct Layout {
  width: usize,
  start: usize,
}

impl Layout {
  fn locate(grid: &Grid, group: &GroupCode) -> Result<Self> {
    let rows = grid.rows();
    if rows.len() < HEADER_ROWS {
      return Err(Error::MissingHeader);
    }

    let width = rows[0].len().max(rows[1].len());
    if width < LEADING_COLUMNS {
      return Err(Error::TooNarrow { width });
    }

    let start = rows[0]
      .iter()
      .position(|label| label.contains(group.as_str()))
      .ok_or_else(|| Error::GroupNotFound(group.to_string()))?;

    if start + TEACHER >= width {
      return Err(Error::BlockOutOfRange { start, width });
    }

    Ok(Self { width, start })
  }
}

// ─── Cell normalisation ──────────────────────────────────────────────────────

/// Trim and blank out spreadsheet placeholders.
pub(crate) fn clean(raw: &str) -> String {
  let s = raw.trim();
  if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
    String::new()
  } else {
    s.to_string()
  }
}

/// `"101.0"` → `"101"`; numeric cells sometimes round-trip through floats.
fn strip_float_suffix(room: String) -> String {
  match room.strip_suffix(".0") {
    Some(int) if !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) => {
      int.to_string()
    }
    _ => room,
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Parse every lesson of `group`. Rows that fail on their own are skipped;
/// table-level failures abort with an error.
pub(crate) fn parse_lessons(text: &str, group: &GroupCode) -> Result<Vec<LessonRecord>> {
  if text.trim().is_empty() {
    return Err(Error::Empty);
  }

  let grid = tokenize(text)?;
  let layout = Layout::locate(&grid, group)?;

  let mut lessons = Vec::new();
  let mut day = String::new();

  for (row, cells) in grid.rows().iter().enumerate().skip(HEADER_ROWS) {
    if cells.len() > layout.width {
      let e = Error::RowTooWide { row: row + 1, found: cells.len(), width: layout.width };
      debug!(group = %group, error = %e, "skipping row");
      continue;
    }

    let cell = |col: usize| clean(grid.cell(row, col));

    // A blank day cell continues the previous day.
    let raw_day = cell(DAY);
    if !raw_day.is_empty() {
      day = raw_day;
    }

    let block = |offset: usize| cell(layout.start + offset);
    let time = cell(TIME);
    let subject = block(SUBJECT);
    if time.is_empty() || subject.is_empty() {
      continue;
    }

    lessons.push(LessonRecord {
      group: group.clone(),
      day: capitalize(&day),
      time,
      week_type: cell(WEEK),
      subject,
      building: block(BUILDING),
      room1: strip_float_suffix(block(ROOM1)),
      room2: strip_float_suffix(block(ROOM2)),
      kind: block(KIND),
      teacher: block(TEACHER),
    });
  }

  Ok(lessons)
}

#[cfg(test)]
mod tests {
  use super::*;

  const HEADER: &str = "\
День,Время,Неделя,8251160/Группа,,,,,,,,8251161/Группа,,,,,,,
,,,Предмет,Здание,Ауд.1,Ауд.2,Тип,,,Преподаватель,Предмет,Здание,Ауд.1,Ауд.2,Тип,,,Преподаватель
";

  fn code(s: &str) -> GroupCode { GroupCode::parse(s).unwrap() }

  fn sheet(rows: &[&str]) -> String {
    let mut s = HEADER.to_string();
    for r in rows {
      s.push_str(r);
      s.push('\n');
    }
    s
  }

  #[test]
  fn single_row_produces_full_record() {
    let csv = sheet(&[
      "Понедельник,09:00,в,Математика,Гл.корпус,101,,лекция,,,Иванов И.И.,Физика,Корпус 2,5,,практика,,,Петров П.П.",
    ]);
    let lessons = parse_lessons(&csv, &code("8251160")).unwrap();
    assert_eq!(lessons.len(), 1);
    let l = &lessons[0];
    assert_eq!(l.group.as_str(), "8251160");
    assert_eq!(l.day, "Понедельник");
    assert_eq!(l.time, "09:00");
    assert_eq!(l.week_type, "в");
    assert_eq!(l.subject, "Математика");
    assert_eq!(l.building, "Гл.корпус");
    assert_eq!(l.room1, "101");
    assert_eq!(l.room2, "");
    assert_eq!(l.kind, "лекция");
    assert_eq!(l.teacher, "Иванов И.И.");
  }

  #[test]
  fn second_block_is_located_by_header() {
    let csv = sheet(&[
      "Понедельник,09:00,в,Математика,Гл.корпус,101,,лекция,,,Иванов И.И.,Физика,Корпус 2,5,,практика,,,Петров П.П.",
    ]);
    let lessons = parse_lessons(&csv, &code("8251161")).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].subject, "Физика");
    assert_eq!(lessons[0].teacher, "Петров П.П.");
  }

  #[test]
  fn day_is_forward_filled_and_capitalized() {
    let csv = sheet(&[
      "понедельник,09:00,,Математика,,,,,,,,,,,,,,,",
      ",10:40,,Физика,,,,,,,,,,,,,,,",
      ",12:20,,,,,,,,,,,,,,,,,",
      "Вторник,09:00,,Химия,,,,,,,,,,,,,,,",
      ",10:40,н,Биология,,,,,,,,,,,,,,,",
    ]);
    let lessons = parse_lessons(&csv, &code("8251160")).unwrap();
    let days: Vec<_> = lessons.iter().map(|l| (l.day.as_str(), l.subject.as_str())).collect();
    assert_eq!(
      days,
      [
        ("Понедельник", "Математика"),
        ("Понедельник", "Физика"),
        ("Вторник", "Химия"),
        ("Вторник", "Биология"),
      ]
    );
  }

  #[test]
  fn rows_without_subject_or_time_are_dropped() {
    let csv = sheet(&[
      "Среда,,,Без времени,,,,,,,,,,,,,,,",
      ",09:00,,,,,,,,,,,,,,,,,",
      ",10:40,,nan,,,,,,,,,,,,,,,",
      ",NaN,,Без времени 2,,,,,,,,,,,,,,,",
      ",12:20,,Есть,,,,,,,,,,,,,,,",
    ]);
    let lessons = parse_lessons(&csv, &code("8251160")).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].subject, "Есть");
    assert_eq!(lessons[0].day, "Среда");
  }

  #[test]
  fn placeholders_and_float_rooms_are_cleaned() {
    let csv = sheet(&[
      "Четверг, 09:00 , None ,Математика,  nan ,101.0,12.5,NONE,,,None,,,,,,,,",
      ",10:40,,Физика,,A1.0,1.0.0,,,,,,,,,,,,",
    ]);
    let lessons = parse_lessons(&csv, &code("8251160")).unwrap();
    assert_eq!(lessons[0].time, "09:00");
    assert_eq!(lessons[0].week_type, "");
    assert_eq!(lessons[0].building, "");
    assert_eq!(lessons[0].room1, "101");
    assert_eq!(lessons[0].room2, "12.5");
    assert_eq!(lessons[0].kind, "");
    assert_eq!(lessons[0].teacher, "");
    assert_eq!(lessons[1].room1, "A1.0");
    assert_eq!(lessons[1].room2, "1.0.0");
  }

  #[test]
  fn short_rows_read_missing_cells_as_empty() {
    let csv = sheet(&["Пятница,09:00,,Математика,Гл.корпус"]);
    let lessons = parse_lessons(&csv, &code("8251160")).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].building, "Гл.корпус");
    assert_eq!(lessons[0].teacher, "");
  }

  #[test]
  fn over_wide_rows_are_skipped() {
    let csv = sheet(&[
      "Пятница,09:00,,Лишняя,,,,,,,,,,,,,,,,extra",
      ",10:40,,Нормальная,,,,,,,,,,,,,,,",
    ]);
    let lessons = parse_lessons(&csv, &code("8251160")).unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].subject, "Нормальная");
    // The skipped row still did not leak its day.
    assert_eq!(lessons[0].day, "");
  }

  #[test]
  fn missing_group_is_an_error() {
    let csv = sheet(&["Понедельник,09:00,,Математика,,,,,,,,,,,,,,,"]);
    assert_eq!(
      parse_lessons(&csv, &code("1234567")),
      Err(Error::GroupNotFound("1234567".into()))
    );
  }

  #[test]
  fn block_past_table_edge_is_an_error() {
    let csv = "День,Время,Неделя,8251160/Группа,,,\n,,,Предмет,,,\nПн,09:00,,А,,,\n";
    assert_eq!(
      parse_lessons(csv, &code("8251160")),
      Err(Error::BlockOutOfRange { start: 3, width: 7 })
    );
  }

  #[test]
  fn structural_failures() {
    let g = code("8251160");
    assert_eq!(parse_lessons("", &g), Err(Error::Empty));
    assert_eq!(parse_lessons("  \n", &g), Err(Error::Empty));
    assert_eq!(parse_lessons("only,one,row\n", &g), Err(Error::MissingHeader));
    assert_eq!(parse_lessons("a,b\nc,d\n", &g), Err(Error::TooNarrow { width: 2 }));
    assert_eq!(
      parse_lessons("a,\"b\nc,d\n", &g),
      Err(Error::UnterminatedQuote { line: 1 })
    );
  }

  #[test]
  fn header_only_sheet_has_no_lessons() {
    let lessons = parse_lessons(HEADER, &code("8251160")).unwrap();
    assert!(lessons.is_empty());
  }
}
