//! Optimistic concurrency control.
//!
//! Every mutable entity carries an integer `version` starting at 1 and
//! incremented by exactly 1 on every persisted mutation. Clients echo the
//! version they last read; a mismatch means someone else wrote in between
//! and the edit is rejected with a Conflict.

use serde::Deserialize;

use crate::{Error, Result};

/// A client-supplied version value. Clients send either an integer or a
/// numeric string; anything else is rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClientVersion {
  Int(i64),
  Text(String),
}

impl ClientVersion {
  /// Coerce to an integer, if the value is one.
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Self::Int(n) => Some(*n),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }
}

/// Check a client-echoed version against the current stored one.
///
/// Errors, in order of precedence: missing value, non-numeric value,
/// mismatch. `entity` is the display name used in the messages (e.g.
/// "Chore", "Chore schedule").
pub fn check_version(
  current: i64,
  client: Option<&ClientVersion>,
  entity: &str,
) -> Result<()> {
  let Some(client) = client else {
    return Err(Error::Conflict {
      entity:  entity.to_owned(),
      message: format!("{entity} version is required for concurrency check."),
    });
  };
  let Some(value) = client.as_int() else {
    return Err(Error::Conflict {
      entity:  entity.to_owned(),
      message: "Invalid version value.".to_owned(),
    });
  };
  if value != current {
    return Err(Error::Conflict {
      entity:  entity.to_owned(),
      message: format!("{entity} has been modified."),
    });
  }
  Ok(())
}
