//! [`GroupIndex`]: group code → cache file.
//!
//! Built from the first line of every cache file. The index is always
//! rebuilt from scratch and swapped in whole, so readers never observe a
//! half-built map.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{PoisonError, RwLock, RwLockReadGuard},
};

use sked_core::{GroupCode, group::GROUP_CODE_LEN};
use tokio::{
  fs::File,
  io::{AsyncBufReadExt, BufReader},
};
use tracing::{info, warn};

/// Every maximal digit run of exactly seven digits in `header`, in order.
pub fn codes_in_header(header: &str) -> Vec<GroupCode> {
  header
    .split(|c: char| !c.is_ascii_digit())
    .filter(|run| run.len() == GROUP_CODE_LEN)
    .filter_map(|run| GroupCode::parse(run).ok())
    .collect()
}

async fn read_header(path: &Path) -> std::io::Result<String> {
  let mut reader = BufReader::new(File::open(path).await?);
  let mut line = Vec::new();
  reader.read_until(b'\n', &mut line).await?;
  Ok(String::from_utf8_lossy(&line).into_owned())
}

#[derive(Debug, Default)]
pub struct GroupIndex {
  entries: RwLock<HashMap<GroupCode, PathBuf>>,
}

impl GroupIndex {
  pub fn new() -> Self { Self::default() }

  /// Replace the index with the codes found in `files`.
  ///
  /// When a code appears in several files the first one in `files` wins, so
  /// callers pass a stably ordered listing. Unreadable files are skipped.
  /// Returns the number of indexed codes.
  pub async fn rebuild(&self, files: &[PathBuf]) -> usize {
    let mut fresh: HashMap<GroupCode, PathBuf> = HashMap::new();

    for path in files {
      let header = match read_header(path).await {
        Ok(h) => h,
        Err(e) => {
          warn!(path = ?path, error = %e, "cannot read header, skipping file");
          continue;
        }
      };
      for code in codes_in_header(&header) {
        fresh.entry(code).or_insert_with(|| path.clone());
      }
    }

    let count = fresh.len();
    *self.entries.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    info!(groups = count, files = files.len(), "group index rebuilt");
    count
  }

  pub fn lookup(&self, code: &GroupCode) -> Option<PathBuf> { self.read().get(code).cloned() }

  pub fn len(&self) -> usize { self.read().len() }

  pub fn is_empty(&self) -> bool { self.read().is_empty() }

  fn read(&self) -> RwLockReadGuard<'_, HashMap<GroupCode, PathBuf>> {
    self.entries.read().unwrap_or_else(PoisonError::into_inner)
  }
}
