//! Periodic refresh of the cache at fixed local times of day.

use std::{future::Future, time::Duration};

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use sked_cache::{ScheduleCache, SheetSource};
use tracing::{info, warn};

use crate::settings::Zone;

/// Time from `now` until the earliest of `times` strictly after it, today or
/// tomorrow. `None` when `times` is empty.
///
/// A time skipped by a DST jump is ignored for that day; a repeated one
/// fires at its first occurrence.
pub fn next_refresh_delay<Tz: TimeZone>(
  now: DateTime<Tz>,
  times: &[NaiveTime],
) -> Option<Duration> {
  let zone = now.timezone();
  let today = now.date_naive();

  [Some(today), today.succ_opt()]
    .into_iter()
    .flatten()
    .flat_map(|day| times.iter().map(move |t| day.and_time(*t)))
    .filter_map(|local| local.and_local_timezone(zone.clone()).earliest())
    .filter(|at| *at > now)
    .min()
    .and_then(|at| at.signed_duration_since(&now).to_std().ok())
}

fn delay_from_now(zone: Zone, times: &[NaiveTime]) -> Option<Duration> {
  let now = Utc::now();
  match zone {
    Zone::Named(tz) => next_refresh_delay(now.with_timezone(&tz), times),
    Zone::Fixed(offset) => next_refresh_delay(now.with_timezone(&offset), times),
  }
}

/// Refresh `cache` at each of `times` until `shutdown` resolves.
///
/// Refreshes run one after another on this task, so two never overlap. A
/// refresh that has started is allowed to finish before shutdown is seen.
pub async fn run<S, F>(
  cache: &ScheduleCache<S>,
  zone: Zone,
  times: &[NaiveTime],
  shutdown: F,
) where
  S: SheetSource + 'static,
  F: Future<Output = ()>,
{
  tokio::pin!(shutdown);

  loop {
    let Some(delay) = delay_from_now(zone, times) else {
      warn!("no refresh times configured, scheduler idle");
      shutdown.await;
      return;
    };
    info!(secs = delay.as_secs(), "next refresh scheduled");

    tokio::select! {
      _ = &mut shutdown => {
        info!("refresh scheduler stopped");
        return;
      }
      _ = tokio::time::sleep(delay) => {}
    }

    cache.refresh_all().await;
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use chrono::FixedOffset;
  use sked_cache::{CacheStore, Gid};

  use super::*;

  fn msk() -> FixedOffset { FixedOffset::east_opt(3 * 3600).unwrap() }

  fn at(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
    msk().with_ymd_and_hms(2025, 9, d, h, m, 0).unwrap()
  }

  fn hm(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

  #[test]
  fn picks_next_time_today() {
    let delay = next_refresh_delay(at(1, 3, 0), &[hm(4, 0), hm(19, 0)]).unwrap();
    assert_eq!(delay, Duration::from_secs(3600));

    let delay = next_refresh_delay(at(1, 12, 0), &[hm(4, 0), hm(19, 0)]).unwrap();
    assert_eq!(delay, Duration::from_secs(7 * 3600));
  }

  #[test]
  fn wraps_to_tomorrow() {
    let delay = next_refresh_delay(at(1, 20, 0), &[hm(19, 0), hm(4, 0)]).unwrap();
    assert_eq!(delay, Duration::from_secs(8 * 3600));
  }

  #[test]
  fn exact_match_is_not_now() {
    let delay = next_refresh_delay(at(1, 4, 0), &[hm(4, 0)]).unwrap();
    assert_eq!(delay, Duration::from_secs(24 * 3600));
  }

  #[test]
  fn named_zone_follows_dst_change() {
    // Berlin leaves summer time at 03:00 on 2025-10-26.
    let now = chrono_tz::Europe::Berlin.with_ymd_and_hms(2025, 10, 25, 20, 0, 0).unwrap();
    let delay = next_refresh_delay(now, &[hm(4, 0)]).unwrap();
    assert_eq!(delay, Duration::from_secs(9 * 3600));
  }

  #[test]
  fn no_times_no_delay() {
    assert!(next_refresh_delay(at(1, 4, 0), &[]).is_none());
  }

  #[derive(Default)]
  struct CountingSource {
    calls: AtomicUsize,
  }

  impl SheetSource for CountingSource {
    async fn fetch(&self, _gid: Gid) -> Option<String> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      None
    }
  }

  #[tokio::test]
  async fn shutdown_stops_before_any_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ScheduleCache::new(CacheStore::new(CountingSource::default(), dir.path()), vec![0]);

    run(&cache, Zone::Fixed(msk()), &[hm(4, 0)], async {}).await;
    assert_eq!(cache.store().source().calls.load(Ordering::SeqCst), 0);
  }
}
