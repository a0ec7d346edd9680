//! Duration string parsing and formatting.
//!
//! User-facing durations are written the short way: `25m`, `1h30m`, `90s`,
//! `500ms`. The same format is used for CLI arguments and for the duration
//! fields of the configuration file.

use std::fmt::Write as _;
use std::time::Duration;

use crate::error::ParseError;

/// Parse a duration string such as `"25m"`, `"1h30m"` or `"10m30s"`.
///
/// Supported units: `h`, `m`, `s`, `ms`. Fractions are allowed (`"1.5h"`).
/// A bare `"0"` is accepted; any other bare number is rejected.
///
/// # Errors
/// Returns a [`ParseError`] describing what failed to scan.
pub fn parse(input: &str) -> Result<Duration, ParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ParseError::EmptyDuration);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let bytes = s.as_bytes();
    let mut total_secs = 0f64;
    let mut i = 0;

    while i < bytes.len() {
        let num_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if i == num_start {
            return Err(ParseError::InvalidDuration(input.to_string()));
        }
        let number: f64 = s[num_start..i]
            .parse()
            .map_err(|_| ParseError::InvalidDuration(input.to_string()))?;

        let unit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        if i == unit_start {
            return Err(ParseError::MissingUnit(input.to_string()));
        }
        let per_unit = match &s[unit_start..i] {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "ms" => 0.001,
            unit => {
                return Err(ParseError::UnknownUnit {
                    input: input.to_string(),
                    unit: unit.to_string(),
                })
            }
        };
        total_secs += number * per_unit;
    }

    Duration::try_from_secs_f64(total_secs)
        .map_err(|_| ParseError::InvalidDuration(input.to_string()))
}

/// Format a duration losslessly (to millisecond precision) in the same
/// notation [`parse`] accepts: `"1h30m"`, `"2m30s"`, `"500ms"`, `"0s"`.
pub fn format(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let total_ms = d.as_millis();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_min = total_secs / 60;
    let mins = total_min % 60;
    let hours = total_min / 60;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if mins > 0 {
        let _ = write!(out, "{mins}m");
    }
    if secs > 0 {
        let _ = write!(out, "{secs}s");
    }
    if ms > 0 {
        let _ = write!(out, "{ms}ms");
    }
    out
}

/// Format a duration for chart labels and summaries: seconds below a minute
/// (one decimal below a second), whole minutes below an hour, then `2h5m`.
pub fn format_compact(d: Duration) -> String {
    let seconds = d.as_secs_f64();
    if seconds < 60.0 {
        if seconds == seconds.trunc() {
            return format!("{}s", seconds as u64);
        }
        return format!("{seconds:.1}s");
    }

    let minutes = d.as_secs() / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h{mins}m")
    }
}

/// Format remaining time as a clock face: `MM:SS`, with an hour field only
/// when there is one (`01:24:59`).
pub fn format_clock(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Serde adapter serializing durations through the short string notation.
pub mod serde_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse("25m").unwrap(), Duration::from_secs(25 * 60));
        assert_eq!(parse("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse("2h").unwrap(), Duration::from_secs(2 * 3600));
        assert_eq!(parse("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn parses_compound_durations() {
        assert_eq!(parse("1h30m").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("10m30s").unwrap(), Duration::from_secs(630));
        assert_eq!(parse("1h1m1s").unwrap(), Duration::from_secs(3661));
    }

    #[test]
    fn parses_fractions_and_zero() {
        assert_eq!(parse("1.5h").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("0.5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse("").unwrap_err(), ParseError::EmptyDuration);
        assert_eq!(parse("   ").unwrap_err(), ParseError::EmptyDuration);
        assert_eq!(
            parse("25").unwrap_err(),
            ParseError::MissingUnit("25".to_string())
        );
        assert_eq!(
            parse("3d").unwrap_err(),
            ParseError::UnknownUnit {
                input: "3d".to_string(),
                unit: "d".to_string(),
            }
        );
        assert!(matches!(
            parse("invalid").unwrap_err(),
            ParseError::InvalidDuration(_)
        ));
        assert!(matches!(
            parse("-5m").unwrap_err(),
            ParseError::InvalidDuration(_)
        ));
    }

    #[test]
    fn formats_round_trip() {
        for text in ["25m", "1h30m", "2m30s", "500ms", "0s", "1h1m1s500ms"] {
            let parsed = parse(text).unwrap();
            assert_eq!(format(parsed), text);
        }
    }

    #[test]
    fn formats_compact() {
        assert_eq!(format_compact(Duration::from_secs(30)), "30s");
        assert_eq!(format_compact(Duration::from_millis(500)), "0.5s");
        assert_eq!(format_compact(Duration::from_secs(61)), "1m");
        assert_eq!(format_compact(Duration::from_secs(45 * 60)), "45m");
        assert_eq!(format_compact(Duration::from_secs(90 * 60)), "1h30m");
        assert_eq!(format_compact(Duration::from_secs(2 * 3600)), "2h");
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(Duration::from_secs(25 * 60)), "25:00");
        assert_eq!(format_clock(Duration::from_secs(59)), "00:59");
        assert_eq!(format_clock(Duration::from_secs(3600 + 84 * 60 + 59)), "02:24:59");
        assert_eq!(format_clock(Duration::from_secs(3600)), "01:00:00");
    }
}
