//! Serde helpers for second-precision wall-clock timestamps.
//!
//! Results are always written as `YYYY-MM-DD HH:MM:SS`. Inputs additionally
//! accept fractional seconds and an ISO-8601 `T` separator.

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Output format for every timestamp the engine emits.
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Format a timestamp the way results carry it.
pub fn format(ts: &NaiveDateTime) -> String {
    ts.format(FORMAT).to_string()
}

/// Parse a timestamp in any accepted input format.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
}

pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| {
        de::Error::custom(format!(
            "invalid timestamp '{}', expected YYYY-MM-DD HH:MM:SS",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_accepts_fraction_and_iso_separator() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();

        assert_eq!(parse("2026-03-10 14:05:09"), Some(expected));
        assert_eq!(parse("2026-03-10T14:05:09"), Some(expected));
        assert!(parse("2026-03-10 14:05:09.250").is_some());
        assert_eq!(parse("10/03/2026"), None);
    }

    #[test]
    fn test_format_drops_subseconds() {
        let ts = parse("2026-03-10 14:05:09.999").unwrap();
        assert_eq!(format(&ts), "2026-03-10 14:05:09");
    }
}
