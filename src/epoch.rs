//! Timestamp formatting and parsing, as found in track logs and GPX tracks
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeZone, Utc};

/// Track log timestamp description: `yyyy-MM-dd HH:mm:ss±HH:mm`
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Same description, with a space between seconds and offset,
/// as found in hand edited or spreadsheet exported logs
const LOG_TIME_FORMAT_SPACED: &str = "%Y-%m-%d %H:%M:%S %:z";

/// Log file names: `locations-YYYYMMDD-HHmmss.csv`
const FILE_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Formats given instant for a track log row
pub fn format_log_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format(LOG_TIME_FORMAT).to_string()
}

/// Parses a track log timestamp. Accepts the log description
/// (with or without a space before the offset) and RFC3339.
/// Returns None when nothing matches.
pub fn parse_log_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_str(s, LOG_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_str(s, LOG_TIME_FORMAT_SPACED))
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
}

/// Formats given instant as a GPX `<time>` content, normalized to UTC
pub fn format_gpx_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    t.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Generates a new log file name, stamped at given local time
pub fn log_file_name(t: &DateTime<Local>) -> String {
    format!("locations-{}.csv", t.format(FILE_STAMP_FORMAT))
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn log_time_parsing() {
        for desc in [
            "2021-06-22 06:10:15+09:00",
            "2021-06-22 06:10:15 +09:00",
            "2021-06-22T06:10:15+09:00",
        ] {
            let t = parse_log_time(desc).unwrap();
            assert_eq!(format_gpx_time(&t), "2021-06-21T21:10:15Z");
        }
        assert!(parse_log_time("").is_none());
        assert!(parse_log_time("yesterday").is_none());
        assert!(parse_log_time("2021-06-22 06:10:15").is_none());
    }
    #[test]
    fn log_time_formatting() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let t = offset.with_ymd_and_hms(2021, 6, 22, 6, 10, 15).unwrap();
        assert_eq!(format_log_time(&t), "2021-06-22 06:10:15+09:00");
        let offset = FixedOffset::west_opt(3 * 3600 + 1800).unwrap();
        let t = offset.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_log_time(&t), "2021-01-02 03:04:05-03:30");
    }
    #[test]
    fn file_names() {
        let t = Local.with_ymd_and_hms(2023, 11, 5, 7, 8, 9).unwrap();
        assert_eq!(log_file_name(&t), "locations-20231105-070809.csv");
    }
}
