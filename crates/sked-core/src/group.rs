//! Group code: the 7-digit cohort identifier.
//!
//! Users type codes in many shapes (`09-825`, `825 1160`, `8251160`). Every
//! input is reduced to its digits before it is compared or looked up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of digits in a valid group code.
pub const GROUP_CODE_LEN: usize = 7;

/// A normalised group code: exactly [`GROUP_CODE_LEN`] ASCII digits.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct GroupCode(String);

impl GroupCode {
  /// Strip every non-digit from `input` and validate the length.
  pub fn parse(input: &str) -> Result<Self> {
    let digits = digits_only(input);
    match digits.len() {
      0 => Err(Error::EmptyGroupCode),
      GROUP_CODE_LEN => Ok(Self(digits)),
      n => Err(Error::GroupCodeLength { digits: n }),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

/// Keep only ASCII digits, in order.
pub fn digits_only(input: &str) -> String {
  input.chars().filter(char::is_ascii_digit).collect()
}

impl fmt::Display for GroupCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for GroupCode {
  fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<String> for GroupCode {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<GroupCode> for String {
  fn from(code: GroupCode) -> Self { code.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_code_is_accepted() {
    let code = GroupCode::parse("8251160").unwrap();
    assert_eq!(code.as_str(), "8251160");
  }

  #[test]
  fn punctuation_and_spaces_are_stripped() {
    let code = GroupCode::parse(" 825-11 60 ").unwrap();
    assert_eq!(code.as_str(), "8251160");
  }

  #[test]
  fn short_code_is_rejected() {
    assert_eq!(digits_only("09-825"), "09825");
    assert_eq!(
      GroupCode::parse("09-825"),
      Err(Error::GroupCodeLength { digits: 5 })
    );
  }

  #[test]
  fn no_digits_is_rejected() {
    assert_eq!(GroupCode::parse("группа"), Err(Error::EmptyGroupCode));
    assert_eq!(GroupCode::parse(""), Err(Error::EmptyGroupCode));
  }

  #[test]
  fn long_code_is_rejected() {
    assert_eq!(
      GroupCode::parse("82511601"),
      Err(Error::GroupCodeLength { digits: 8 })
    );
  }

  #[test]
  fn serde_goes_through_validation() {
    let code: GroupCode = serde_json::from_str("\"825-1160\"").unwrap();
    assert_eq!(code.as_str(), "8251160");
    assert!(serde_json::from_str::<GroupCode>("\"123\"").is_err());
    assert_eq!(serde_json::to_string(&code).unwrap(), "\"8251160\"");
  }
}
