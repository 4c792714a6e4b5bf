use crate::error::ParseError;
use crate::log_entry::StructuredLog;
use chrono::{DateTime, Utc};
use std::str::FromStr;

const FIELD_COUNT: usize = 5;

/// Parse a wire-format log line into a `StructuredLog`.
///
/// The line is split on every comma, so a message containing a comma
/// yields a field count error rather than a truncated record.
pub fn parse_log(raw: &str) -> Result<StructuredLog, ParseError> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount(parts.len()));
    }

    let status_code = parts[0]
        .parse::<i32>()
        .map_err(|source| ParseError::InvalidStatusCode {
            value: parts[0].to_string(),
            source,
        })?;

    let timestamp = DateTime::parse_from_rfc3339(parts[3])
        .map_err(|source| ParseError::InvalidTimestamp {
            value: parts[3].to_string(),
            source,
        })?
        .with_timezone(&Utc);

    Ok(StructuredLog::new(
        status_code,
        parts[1],
        parts[2],
        timestamp,
        parts[4],
    ))
}

impl FromStr for StructuredLog {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_log(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_well_formed_line() {
        let log = parse_log("200,/api/login,User logged in,2024-01-15T10:30:00Z,192.168.1.10")
            .expect("line should parse");

        assert_eq!(log.status_code, 200);
        assert_eq!(log.api, "/api/login");
        assert_eq!(log.message, "User logged in");
        assert_eq!(
            log.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
        assert_eq!(log.ip_address, "192.168.1.10");
    }

    #[test]
    fn string_fields_are_taken_verbatim() {
        let log = parse_log("500, spaced ,,2024-01-15T10:30:00Z,not-an-ip").unwrap();

        assert_eq!(log.api, " spaced ");
        assert_eq!(log.message, "");
        assert_eq!(log.ip_address, "not-an-ip");
    }

    #[test]
    fn status_code_is_not_range_checked() {
        assert_eq!(parse_log("-1,a,b,2024-01-15T10:30:00Z,c").unwrap().status_code, -1);
        assert_eq!(parse_log("+999,a,b,2024-01-15T10:30:00Z,c").unwrap().status_code, 999);
    }

    #[test]
    fn offset_timestamps_are_normalised_to_utc() {
        let log = parse_log("200,a,b,2024-01-15T12:30:00+02:00,c").unwrap();

        assert_eq!(
            log.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_wrong_field_counts() {
        for (raw, count) in [
            ("200,/api/login,msg,2024-01-15T10:30:00Z", 4),
            ("200,/api/login,hello, world,2024-01-15T10:30:00Z,1.2.3.4", 6),
            ("", 1),
        ] {
            match parse_log(raw) {
                Err(ParseError::FieldCount(n)) => assert_eq!(n, count, "input {raw:?}"),
                other => panic!("expected field count error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_numeric_status_code() {
        let err = parse_log("abc,/api/login,msg,2024-01-15T10:30:00Z,1.2.3.4").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStatusCode { ref value, .. } if value == "abc"));
    }

    #[test]
    fn rejects_invalid_timestamp() {
        let err = parse_log("200,/api/login,msg,not-a-time,1.2.3.4").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTimestamp { ref value, .. } if value == "not-a-time"));
    }

    #[test]
    fn status_code_is_checked_before_timestamp() {
        let err = parse_log("abc,/api/login,msg,not-a-time,1.2.3.4").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStatusCode { .. }));
    }

    #[test]
    fn from_str_delegates_to_parse_log() {
        let log: StructuredLog = "403,/api/upload,Access denied,2024-01-15T10:30:00Z,192.168.1.11"
            .parse()
            .unwrap();
        assert_eq!(log.status_code, 403);
    }
}
