//! Lesson records: one scheduled class occurrence.
//!
//! Records are produced fresh by the parser for every request and are never
//! mutated afterwards. All string fields are already normalised: trimmed,
//! with spreadsheet placeholders (`nan`, `none`) replaced by the empty string.

use serde::{Deserialize, Serialize};

use crate::group::GroupCode;

// ─── Week parity ─────────────────────────────────────────────────────────────

/// Which alternating calendar week a lesson runs on.
///
/// The timetable marks lessons with `в` (верхняя, the upper week) or `н`
/// (нижняя, the lower week). Lessons with an empty tag run every week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
  /// Even number of whole weeks since the calendar anchor.
  Upper,
  /// Odd number of whole weeks since the calendar anchor.
  Lower,
}

impl WeekParity {
  /// The tag as written in the timetable.
  pub fn tag(self) -> &'static str {
    match self {
      Self::Upper => "в",
      Self::Lower => "н",
    }
  }

  /// Interpret a raw tag by its first significant character.
  ///
  /// Returns `None` for empty tags and for anything that is neither spelling.
  pub fn from_tag(raw: &str) -> Option<Self> {
    let first = raw.trim().chars().next()?;
    match first.to_lowercase().next()? {
      'в' => Some(Self::Upper),
      'н' => Some(Self::Lower),
      _ => None,
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A single lesson of a group, as read from one timetable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
  pub group:     GroupCode,
  /// Localised day name, first letter capitalised (e.g. `Понедельник`).
  pub day:       String,
  /// `HH:MM`; may be empty for malformed sheets.
  pub time:      String,
  /// Raw parity tag; empty means every week.
  pub week_type: String,
  pub subject:   String,
  pub building:  String,
  pub room1:     String,
  pub room2:     String,
  /// Lesson type (lecture, seminar, lab...).
  #[serde(rename = "type")]
  pub kind:      String,
  /// Teacher names exactly as the sheet lists them; see [`Self::teachers`].
  pub teacher:   String,
}

impl LessonRecord {
  /// Parity of this lesson, or `None` when it runs every week (or the tag is
  /// unrecognised).
  pub fn parity(&self) -> Option<WeekParity> { WeekParity::from_tag(&self.week_type) }

  /// Minutes since midnight. Absent or unparsable times count as `0`, so
  /// they sort before everything else.
  pub fn start_minutes(&self) -> u32 { time_to_minutes(&self.time) }

  /// Split the raw teacher cell into individual names.
  ///
  /// Separators are `;`, `,`, tabs and runs of two or more whitespace
  /// characters. Non-breaking and typographic spaces count as whitespace.
  pub fn teachers(&self) -> Vec<String> { split_teachers(&self.teacher) }

  /// `building, ауд. room1, room2`, skipping empty parts.
  pub fn location(&self) -> String {
    let rooms = [self.room1.as_str(), self.room2.as_str()]
      .into_iter()
      .filter(|r| !r.is_empty())
      .collect::<Vec<_>>()
      .join(", ");

    let mut parts = Vec::with_capacity(2);
    if !self.building.is_empty() {
      parts.push(self.building.clone());
    }
    if !rooms.is_empty() {
      parts.push(format!("ауд. {rooms}"));
    }
    parts.join(", ")
  }
}

fn time_to_minutes(time: &str) -> u32 {
  let Some((h, m)) = time.trim().split_once(':') else {
    return 0;
  };
  let (Ok(h), Ok(m)) = (h.trim().parse::<u32>(), m.trim().parse::<u32>()) else {
    return 0;
  };
  h.checked_mul(60).and_then(|hm| hm.checked_add(m)).unwrap_or(0)
}

/// U+00A0 and U+2000..=U+200B render as spaces in the sheet.
fn is_odd_space(c: char) -> bool { c == '\u{00A0}' || ('\u{2000}'..='\u{200B}').contains(&c) }

fn split_teachers(raw: &str) -> Vec<String> {
  let cleaned: String = raw
    .chars()
    .map(|c| if is_odd_space(c) { ' ' } else { c })
    .collect();

  let mut names = Vec::new();
  let mut current = String::new();
  let mut chars = cleaned.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      ';' | ',' | '\t' => names.push(std::mem::take(&mut current)),
      c if c.is_whitespace() => {
        let mut run = 1;
        while chars.peek().is_some_and(|n| n.is_whitespace()) {
          chars.next();
          run += 1;
        }
        if run >= 2 {
          names.push(std::mem::take(&mut current));
        } else {
          current.push(c);
        }
      }
      c => current.push(c),
    }
  }
  names.push(current);

  names
    .into_iter()
    .map(|n| n.trim().to_string())
    .filter(|n| !n.is_empty())
    .collect()
}
