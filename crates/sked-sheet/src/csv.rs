//! Minimal RFC 4180 tokenizer producing a row-major grid.
//!
//! Handles quoted fields, doubled-quote escapes, embedded newlines and both
//! LF and CRLF endings. Lines that are completely empty are dropped; rows of
//! empty cells (`,,,`) are kept because they still carry a position.

use std::mem::take;

use crate::error::{Error, Result};

/// Rows of cells, exactly as they appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
  rows: Vec<Vec<String>>,
}

impl Grid {
  pub fn rows(&self) -> &[Vec<String>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Cell text, or `""` for cells past the end of a short row.
  pub fn cell(&self, row: usize, col: usize) -> &str {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(col))
      .map(String::as_str)
      .unwrap_or("")
  }
}

/// Split `text` into rows and cells. A leading UTF-8 BOM is ignored.
pub fn tokenize(text: &str) -> Result<Grid> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);

  let mut rows = Vec::new();
  let mut row: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut line = 1usize;
  let mut quote_line = 0usize;
  let mut chars = text.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      '"' if in_quotes => {
        if chars.peek() == Some(&'"') {
          chars.next();
          field.push('"');
        } else {
          in_quotes = false;
        }
      }
      '"' => {
        in_quotes = true;
        quote_line = line;
      }
      ',' if !in_quotes => row.push(take(&mut field)),
      '\r' | '\n' if !in_quotes => {
        if ch == '\r' && chars.peek() == Some(&'\n') {
          chars.next();
        }
        line += 1;
        row.push(take(&mut field));
        flush_row(&mut rows, &mut row);
      }
      c => {
        if c == '\n' {
          line += 1;
        }
        field.push(c);
      }
    }
  }

  if in_quotes {
    return Err(Error::UnterminatedQuote { line: quote_line });
  }

  // Last line without a trailing newline.
  if !field.is_empty() || !row.is_empty() {
    row.push(field);
    flush_row(&mut rows, &mut row);
  }

  Ok(Grid { rows })
}

fn flush_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>) {
  if row.len() == 1 && row[0].is_empty() {
    row.clear();
  } else {
    rows.push(take(row));
  }
}
