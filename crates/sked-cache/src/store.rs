//! [`CacheStore`]: one CSV file per spreadsheet tab.
//!
//! Files are named `gid_<id>.csv`. A download is written to
//! `gid_<id>.csv.tmp` first and renamed over the final name, so readers
//! see either the previous version or the new one, never a partial file.

use std::{
  collections::BTreeSet,
  io,
  path::{Path, PathBuf},
  sync::Arc,
};

use tokio::{fs, sync::Semaphore, task::JoinSet};
use tracing::{error, info, warn};

use crate::{
  Result,
  fetch::{Gid, SheetSource},
};

/// Upper bound on simultaneous downloads in [`CacheStore::download_all`].
pub const MAX_IN_FLIGHT: usize = 4;

const FILE_PREFIX: &str = "gid_";
const FILE_SUFFIX: &str = ".csv";
const TMP_SUFFIX: &str = ".tmp";

/// Parse the tab id out of a cache file name (`gid_12.csv` → `12`).
pub fn gid_from_file_name(name: &str) -> Option<Gid> {
  name
    .strip_prefix(FILE_PREFIX)?
    .strip_suffix(FILE_SUFFIX)?
    .parse()
    .ok()
}

/// Flat directory of per-tab CSV files, filled from a [`SheetSource`].
///
/// Cloning is cheap, the source is reference-counted.
pub struct CacheStore<S> {
  source: Arc<S>,
  dir:    PathBuf,
}

impl<S> Clone for CacheStore<S> {
  fn clone(&self) -> Self {
    Self {
      source: Arc::clone(&self.source),
      dir:    self.dir.clone(),
    }
  }
}

impl<S: SheetSource + 'static> CacheStore<S> {
  /// The directory is created lazily on the first successful download.
  pub fn new(source: S, dir: impl Into<PathBuf>) -> Self {
    Self {
      source: Arc::new(source),
      dir:    dir.into(),
    }
  }

  pub fn dir(&self) -> &Path { &self.dir }

  pub fn source(&self) -> &S { &self.source }

  pub fn path_for(&self, gid: Gid) -> PathBuf {
    self.dir.join(format!("{FILE_PREFIX}{gid}{FILE_SUFFIX}"))
  }

  // ── Downloads ─────────────────────────────────────────────────────────

  /// Fetch tab `gid` and atomically replace its cache file.
  ///
  /// Returns the file path, or `None` if the fetch or the write failed; in
  /// that case any previous file for the tab is left untouched.
  pub async fn download_one(&self, gid: Gid) -> Option<PathBuf> {
    let Some(text) = self.source.fetch(gid).await else {
      warn!(gid, "could not download tab");
      return None;
    };

    match self.save(gid, &text).await {
      Ok(path) => {
        info!(gid, path = ?path, "tab cached");
        Some(path)
      }
      Err(e) => {
        error!(gid, error = %e, "failed to write cache file");
        None
      }
    }
  }

  async fn save(&self, gid: Gid, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(&self.dir).await?;

    let path = self.path_for(gid);
    let mut tmp = path.clone().into_os_string();
    tmp.push(TMP_SUFFIX);
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, text).await?;
    if let Err(e) = fs::rename(&tmp, &path).await {
      fs::remove_file(&tmp).await.ok();
      return Err(e.into());
    }
    Ok(path)
  }

  /// Download every tab in `gids`, at most [`MAX_IN_FLIGHT`] at a time.
  ///
  /// A failed tab does not stop the others. Returns the saved paths, sorted.
  pub async fn download_all(&self, gids: &[Gid]) -> Vec<PathBuf> {
    let permits = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut tasks = JoinSet::new();

    for &gid in gids {
      let store = self.clone();
      let permits = Arc::clone(&permits);
      tasks.spawn(async move {
        let _permit = permits.acquire_owned().await.ok()?;
        store.download_one(gid).await
      });
    }

    let mut saved = Vec::with_capacity(gids.len());
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok(Some(path)) => saved.push(path),
        Ok(None) => {}
        Err(e) => error!(error = %e, "download task panicked"),
      }
    }
    saved.sort();
    saved
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Cache files currently on disk, sorted by file name.
  ///
  /// Temporary files and unrelated names are ignored. A missing directory
  /// is an empty cache.
  pub async fn list_cached_files(&self) -> Vec<PathBuf> {
    match self.scan_dir().await {
      Ok(files) => files,
      Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
      Err(e) => {
        warn!(dir = ?self.dir, error = %e, "cannot list cache directory");
        Vec::new()
      }
    }
  }

  async fn scan_dir(&self) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(&self.dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let is_cache_name = entry
        .file_name()
        .to_str()
        .and_then(gid_from_file_name)
        .is_some();
      if !is_cache_name {
        continue;
      }
      let path = entry.path();
      match fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => files.push(path),
        Ok(_) => {}
        Err(e) => warn!(path = ?path, error = %e, "skipping unreadable cache entry"),
      }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
  }

  /// Tab ids that have a cache file.
  pub async fn cached_gids(&self) -> BTreeSet<Gid> {
    self
      .list_cached_files()
      .await
      .iter()
      .filter_map(|p| p.file_name()?.to_str().and_then(gid_from_file_name))
      .collect()
  }

  /// Read a cache file. Invalid UTF-8 is replaced rather than rejected.
  pub async fn read(&self, path: &Path) -> Option<String> {
    match fs::read(path).await {
      Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
      Err(e) => {
        warn!(path = ?path, error = %e, "cannot read cache file");
        None
      }
    }
  }
}
