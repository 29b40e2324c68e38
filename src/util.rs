//! Small date helpers shared by the read path and the selector.

use chrono::{Days, NaiveDate, Utc};

/// Format of the `date` path parameter.
pub const PATH_DATE_FORMAT: &str = "%m-%d-%Y";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Incorrect date format")]
pub struct DateError;

/// Parse an `MM-DD-YYYY` date. Exactly two-digit month and day, four-digit year,
/// and the date must exist (`02-30-2024` is rejected).
pub fn parse_path_date(raw: &str) -> Result<NaiveDate, DateError> {
  let bytes = raw.as_bytes();
  let shape_ok = bytes.len() == 10
    && bytes[2] == b'-'
    && bytes[5] == b'-'
    && bytes.iter().enumerate().all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
  if !shape_ok {
    return Err(DateError);
  }
  NaiveDate::parse_from_str(raw, PATH_DATE_FORMAT).map_err(|_| DateError)
}

/// First day of the trailing window ending at `end` (inclusive on both ends).
pub fn window_start(end: NaiveDate, days: u64) -> NaiveDate {
  end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// Calendar date the selector considers "today".
pub fn today_utc() -> NaiveDate {
  Utc::now().date_naive()
}
