//! ISO-8601 timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, `...+02:00`) and offset-less
/// date-times, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_zulu() {
        let ts = parse_timestamp("2024-01-01T00:00:01Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap());
    }

    #[test]
    fn parses_offset_and_normalizes() {
        let ts = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_as_utc() {
        let ts = parse_timestamp("2024-01-01T00:00:00.250").unwrap();
        assert_eq!(ts.timestamp_millis() % 1000, 250);
        assert!(parse_timestamp("2024-01-01T00:00:00").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }
}
