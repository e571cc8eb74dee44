//! Error types for `sked-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("group code contains no digits")]
  EmptyGroupCode,

  #[error("group code must have exactly 7 digits, got {digits}")]
  GroupCodeLength { digits: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
