//! [`ScheduleCache`]: the long-lived owner of the cache and its index.
//!
//! The front end holds one instance for the life of the process. Startup
//! fill and refresh are the only writers and must not overlap; lookups may
//! run concurrently with each other and with a refresh.

use std::path::PathBuf;

use sked_core::GroupCode;
use tracing::{debug, info, warn};

use crate::{
  fetch::{Gid, SheetSource},
  index::GroupIndex,
  store::CacheStore,
};

pub struct ScheduleCache<S> {
  store: CacheStore<S>,
  index: GroupIndex,
  gids:  Vec<Gid>,
}

impl<S: SheetSource + 'static> ScheduleCache<S> {
  /// `gids` are the configured tabs; the index starts empty.
  pub fn new(store: CacheStore<S>, gids: Vec<Gid>) -> Self {
    Self {
      store,
      index: GroupIndex::new(),
      gids,
    }
  }

  pub fn store(&self) -> &CacheStore<S> { &self.store }

  pub fn index(&self) -> &GroupIndex { &self.index }

  pub fn gids(&self) -> &[Gid] { &self.gids }

  // ── Writers ───────────────────────────────────────────────────────────

  /// Make sure every configured tab is on disk, then rebuild the index.
  ///
  /// Only tabs without a cache file are downloaded, so a second call on a
  /// complete cache performs no downloads. Returns the newly saved paths.
  pub async fn ensure_startup_cache(&self) -> Vec<PathBuf> {
    let existing = self.store.cached_gids().await;
    let missing: Vec<Gid> = self
      .gids
      .iter()
      .copied()
      .filter(|gid| !existing.contains(gid))
      .collect();

    let saved = if existing.is_empty() {
      info!(tabs = self.gids.len(), "cache is empty, downloading all tabs");
      self.store.download_all(&self.gids).await
    } else if !missing.is_empty() {
      info!(?missing, "downloading tabs missing from cache");
      self.store.download_all(&missing).await
    } else {
      info!(files = existing.len(), "all tabs already cached");
      Vec::new()
    };

    self.rebuild_index().await;
    saved
  }

  /// Re-download every configured tab, replacing cached copies, then
  /// rebuild the index. Tabs that fail keep their previous file.
  pub async fn refresh_all(&self) -> Vec<PathBuf> {
    info!(tabs = self.gids.len(), "refreshing all tabs");
    let saved = self.store.download_all(&self.gids).await;
    info!(refreshed = saved.len(), "refresh finished");

    self.rebuild_index().await;
    saved
  }

  /// Rebuild the index from the files currently on disk.
  pub async fn rebuild_index(&self) -> usize {
    let files = self.store.list_cached_files().await;
    self.index.rebuild(&files).await
  }

  // ── Readers ───────────────────────────────────────────────────────────

  /// Cache file holding `group`, according to the index.
  pub fn lookup(&self, group: &GroupCode) -> Option<PathBuf> { self.index.lookup(group) }

  /// CSV text of the tab that contains `group`.
  ///
  /// Consults the index first. Codes the index does not know (for example
  /// ones that only appear below the header) are searched for in the full
  /// text of every cached file, in listing order.
  pub async fn find_group_schedule_local(&self, group: &GroupCode) -> Option<String> {
    if let Some(path) = self.index.lookup(group)
      && let Some(text) = self.store.read(&path).await
    {
      info!(group = %group, path = ?path, "group found");
      return Some(text);
    }

    debug!(group = %group, "group not indexed, scanning cached files");
    for path in self.store.list_cached_files().await {
      let Some(text) = self.store.read(&path).await else {
        continue;
      };
      if text.contains(group.as_str()) {
        info!(group = %group, path = ?path, "group found by full-text scan");
        return Some(text);
      }
    }

    warn!(group = %group, "group not found in any cached tab");
    None
  }
}
