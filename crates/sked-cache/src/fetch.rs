//! Remote fetcher: one spreadsheet tab as CSV text.

use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::{Error, Result};

/// Numeric id of a spreadsheet tab (the `gid` URL parameter).
pub type Gid = u64;

pub const DEFAULT_EXPORT_BASE: &str = "https://docs.google.com";

/// Hard limit on a single tab download, connection included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where tab contents come from.
///
/// The cache only ever needs "the current CSV of tab `gid`, if obtainable";
/// implementations log their own failures and report them as `None`.
pub trait SheetSource: Send + Sync {
  fn fetch(&self, gid: Gid) -> impl Future<Output = Option<String>> + Send + '_;
}

/// Downloads tabs from the public CSV export endpoint.
///
/// Cheap to clone. The inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpFetcher {
  client:         Client,
  base_url:       String,
  spreadsheet_id: String,
}

impl HttpFetcher {
  pub fn new(spreadsheet_id: impl Into<String>) -> Result<Self> {
    Self::with_base_url(spreadsheet_id, DEFAULT_EXPORT_BASE)
  }

  /// Same as [`Self::new`] against a different host (mirrors, tests).
  pub fn with_base_url(
    spreadsheet_id: impl Into<String>,
    base_url: impl Into<String>,
  ) -> Result<Self> {
    let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
    Ok(Self::with_client(client, spreadsheet_id, base_url))
  }

  /// Reuse a caller-owned client. Its timeout settings apply as-is.
  pub fn with_client(
    client: Client,
    spreadsheet_id: impl Into<String>,
    base_url: impl Into<String>,
  ) -> Self {
    Self {
      client,
      base_url: base_url.into(),
      spreadsheet_id: spreadsheet_id.into(),
    }
  }

  pub fn export_url(&self, gid: Gid) -> String {
    format!(
      "{}/spreadsheets/d/{}/export?format=csv&gid={gid}",
      self.base_url.trim_end_matches('/'),
      self.spreadsheet_id,
    )
  }

  /// Fetch tab `gid`, failing on anything but `200 OK`.
  pub async fn try_fetch(&self, gid: Gid) -> Result<String> {
    let url = self.export_url(gid);
    debug!(gid, %url, "GET");

    let resp = self.client.get(&url).send().await?;
    if resp.status() != StatusCode::OK {
      return Err(Error::Status(resp.status().as_u16()));
    }
    Ok(resp.text().await?)
  }
}

impl SheetSource for HttpFetcher {
  async fn fetch(&self, gid: Gid) -> Option<String> {
    info!(gid, "downloading tab");
    match self.try_fetch(gid).await {
      Ok(text) => Some(text),
      Err(Error::Status(status)) => {
        error!(gid, status, "tab download rejected");
        None
      }
      Err(e) => {
        error!(gid, error = %e, "tab download failed");
        None
      }
    }
  }
}
