//! Runtime configuration, layered from `sked.toml` and `SKED_*` variables.

use std::{
  path::{Path, PathBuf},
  str::FromStr,
};

use anyhow::{Context as _, anyhow};
use chrono::{FixedOffset, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use sked_cache::{DEFAULT_EXPORT_BASE, Gid};
use sked_core::calendar::WeekCalendar;

const DEFAULT_REFRESH_AT: [&str; 2] = ["04:00", "19:00"];

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  pub spreadsheet_id:  String,
  #[serde(default = "default_gids")]
  pub gids:            Vec<Gid>,
  #[serde(default = "default_cache_dir")]
  pub cache_dir:       PathBuf,
  /// Daily refresh times, `HH:MM` in `timezone` local time.
  #[serde(default = "default_refresh_at")]
  pub refresh_at:      Vec<String>,
  /// Zone used for "today" and for refresh times: an IANA name such as
  /// `Europe/Moscow`, or a fixed offset such as `+03:00`.
  #[serde(default = "default_timezone")]
  pub timezone:        String,
  #[serde(default = "default_log_level")]
  pub log_level:       String,
  /// Log to this file (rotated daily) instead of stderr.
  #[serde(default)]
  pub log_file:        Option<PathBuf>,
  #[serde(default = "default_export_base_url")]
  pub export_base_url: String,
  /// Monday of an upper week; defaults to 2025-09-01.
  #[serde(default)]
  pub week_anchor:     Option<NaiveDate>,
}

fn default_gids() -> Vec<Gid> { (0..=5).collect() }

fn default_cache_dir() -> PathBuf { PathBuf::from("data/csv") }

fn default_refresh_at() -> Vec<String> { DEFAULT_REFRESH_AT.map(String::from).to_vec() }

fn default_timezone() -> String { "Europe/Moscow".to_string() }

fn default_log_level() -> String { "info".to_string() }

fn default_export_base_url() -> String { DEFAULT_EXPORT_BASE.to_string() }

impl BotConfig {
  /// Read `path` (optional) and overlay `SKED_*` environment variables.
  /// List keys accept comma-separated values, e.g. `SKED_GIDS=0,1,2`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("SKED")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("gids")
          .with_list_parse_key("refresh_at"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise BotConfig")
  }

  /// Valid refresh times. Entries not in strict `HH:MM` form are dropped;
  /// if nothing valid remains the defaults apply.
  pub fn refresh_times(&self) -> Vec<NaiveTime> {
    let times: Vec<NaiveTime> = self.refresh_at.iter().filter_map(|s| parse_hhmm(s)).collect();
    if times.is_empty() {
      DEFAULT_REFRESH_AT.iter().filter_map(|s| parse_hhmm(s)).collect()
    } else {
      times
    }
  }

  pub fn zone(&self) -> anyhow::Result<Zone> {
    self
      .timezone
      .parse()
      .with_context(|| format!("invalid timezone {:?}", self.timezone))
  }

  pub fn calendar(&self) -> WeekCalendar {
    self.week_anchor.map(WeekCalendar::new).unwrap_or_default()
  }
}

/// The configured local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
  Named(Tz),
  Fixed(FixedOffset),
}

impl Zone {
  pub fn today(&self) -> NaiveDate {
    let now = Utc::now();
    match self {
      Self::Named(tz) => now.with_timezone(tz).date_naive(),
      Self::Fixed(offset) => now.with_timezone(offset).date_naive(),
    }
  }
}

impl FromStr for Zone {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> anyhow::Result<Self> {
    let s = s.trim();
    if let Ok(tz) = s.parse::<Tz>() {
      return Ok(Self::Named(tz));
    }
    s.parse::<FixedOffset>()
      .map(Self::Fixed)
      .map_err(|_| anyhow!("expected an IANA zone name or a +HH:MM offset"))
  }
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
  let s = s.trim();
  let (h, m) = s.split_once(':')?;
  if h.len() != 2 || m.len() != 2 || !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
    return None;
  }
  NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}
