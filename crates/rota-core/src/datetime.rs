//! Client datetime parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{Error, Result};

/// Parse a client-supplied datetime string.
///
/// Accepts RFC 3339 with an explicit offset, or a naive ISO form
/// (`YYYY-MM-DDTHH:MM[:SS[.ffffff]]` or a bare date) which is taken as UTC.
pub fn parse_client_datetime(input: &str) -> Result<DateTime<Utc>> {
  let input = input.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
    return Ok(dt.with_timezone(&Utc));
  }

  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
      return Ok(naive.and_utc());
    }
  }

  if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
    return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
  }

  Err(Error::Validation(format!("invalid datetime: {input:?}")))
}
