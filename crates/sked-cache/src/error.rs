//! Error type for `sked-cache`.
//!
//! None of these reach callers of the public cache operations; they are
//! logged where they occur and turned into an absent result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected HTTP status {0}")]
  Status(u16),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
