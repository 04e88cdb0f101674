use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

pub fn timestamp_to_datetime(timestamp_ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp_ms as i64).unwrap_or_else(Utc::now)
}

pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> u64 {
    dt.timestamp_millis() as u64
}

pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

pub fn format_iso8601(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let now = Utc::now();
        let timestamp = datetime_to_timestamp(now);
        let converted = timestamp_to_datetime(timestamp);

        assert!((now.timestamp_millis() - converted.timestamp_millis()).abs() < 1000);
    }

    #[test]
    fn test_iso8601_parsing() {
        let iso_string = "2023-01-01T12:00:00Z";
        let parsed = parse_iso8601(iso_string).unwrap();
        let formatted = format_iso8601(parsed);

        assert_eq!(formatted, "2023-01-01T12:00:00+00:00");
        assert_eq!(datetime_to_timestamp(parsed), 1672574400000);
    }
}
