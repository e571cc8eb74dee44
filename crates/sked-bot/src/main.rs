//! `sked`: group timetable front end.
//!
//! Keeps a local CSV cache of the timetable spreadsheet fresh and prints a
//! group's lessons for a chosen period.
//!
//! # Usage
//!
//! ```text
//! sked serve
//! sked refresh
//! sked show 8251160 --period tomorrow
//! sked --config /etc/sked.toml show 825-1160 --period week --json
//! ```

mod logging;
mod lookup;
mod scheduler;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use lookup::{Lookup, lookup};
use settings::BotConfig;
use sked_cache::{CacheStore, HttpFetcher, ScheduleCache};
use sked_core::render::{Period, render_period};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "sked", author, version, about = "Group timetable from a shared spreadsheet")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "sked.toml", env = "SKED_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fill the cache, then refresh it at the configured times until Ctrl-C.
  Serve,
  /// Re-download every tab once and rebuild the index.
  Refresh,
  /// Print the timetable of a group.
  Show {
    /// Group code; anything but digits is ignored (`825-1160` works).
    group: String,

    #[arg(short, long, value_enum, default_value_t = PeriodArg::Today)]
    period: PeriodArg,

    /// Print every lesson of the group as JSON instead.
    #[arg(long)]
    json: bool,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
  Today,
  Tomorrow,
  Week,
  NextWeek,
  All,
}

impl From<PeriodArg> for Period {
  fn from(arg: PeriodArg) -> Self {
    match arg {
      PeriodArg::Today => Period::Today,
      PeriodArg::Tomorrow => Period::Tomorrow,
      PeriodArg::Week => Period::CurrentWeek,
      PeriodArg::NextWeek => Period::NextWeek,
      PeriodArg::All => Period::AllWeeks,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let cfg = BotConfig::load(&cli.config)?;

  // Logs never go to stdout so `show` output stays clean.
  let log_file = cfg.log_file.as_deref().map(expand_tilde);
  let _log_guard = logging::init(&cfg.log_level, log_file.as_deref())?;

  let fetcher = HttpFetcher::with_base_url(&cfg.spreadsheet_id, &cfg.export_base_url)
    .context("failed to build HTTP client")?;
  let cache_dir = expand_tilde(&cfg.cache_dir);
  let cache = ScheduleCache::new(CacheStore::new(fetcher, cache_dir), cfg.gids.clone());

  match cli.command {
    Command::Serve => serve(&cache, &cfg).await,
    Command::Refresh => {
      let saved = cache.refresh_all().await;
      if saved.len() < cache.gids().len() {
        tracing::warn!(saved = saved.len(), tabs = cache.gids().len(), "some tabs were not refreshed");
      }
      Ok(())
    }
    Command::Show { group, period, json } => show(&cache, &cfg, &group, period.into(), json).await,
  }
}

async fn serve(cache: &ScheduleCache<HttpFetcher>, cfg: &BotConfig) -> Result<()> {
  let zone = cfg.zone()?;
  let times = cfg.refresh_times();

  tracing::info!("starting");
  cache.ensure_startup_cache().await;

  scheduler::run(cache, zone, &times, async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "cannot listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  })
  .await;

  tracing::info!("stopped");
  Ok(())
}

async fn show(
  cache: &ScheduleCache<HttpFetcher>,
  cfg: &BotConfig,
  input: &str,
  period: Period,
  json: bool,
) -> Result<()> {
  let zone = cfg.zone()?;
  cache.ensure_startup_cache().await;

  let (group, lessons) = match lookup(cache, input).await {
    Lookup::Found(group, lessons) => (group, lessons),
    other => bail!("{}", other.reply().unwrap_or_default()),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&lessons)?);
    return Ok(());
  }

  let messages = render_period(&lessons, &group, period, zone.today(), &cfg.calendar());
  println!("{}", messages.join("\n\n"));
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
