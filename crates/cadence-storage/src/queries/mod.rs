// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per event stream.

pub mod messages;
pub mod views;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

/// Storage representation of a timestamp.
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

/// Parse a TEXT column into a strum enum.
pub(crate) fn parse_text<T>(column: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = strum::ParseError>,
{
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Direction;

    #[test]
    fn millis_round_trip_keeps_precision() {
        let at = DateTime::from_timestamp_millis(1_767_225_600_123).unwrap();
        assert_eq!(from_millis(0, to_millis(at)).unwrap(), at);
    }

    #[test]
    fn bad_text_is_a_conversion_failure() {
        let err = parse_text::<Direction>(3, "sideways").unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _)));
    }
}
