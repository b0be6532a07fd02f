use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Case-insensitive equality for team and outcome labels.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Interpret a raw outcome price as decimal odds.
///
/// Accepts JSON numbers and numeric strings. Anything that is not a finite,
/// strictly positive number becomes `None`.
pub fn parse_price(raw: &Value) -> Option<f64> {
    let price = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Parse a kickoff or fixture date. RFC3339 first, then naive ISO-8601
/// (including SQLite's `YYYY-MM-DD HH:MM:SS`) as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_names_equal() {
        assert!(names_equal("Over 2.5", "over 2.5"));
        assert!(names_equal("NEWCASTLE UNITED", "Newcastle United"));
        assert!(!names_equal("Arsenal", "Arsenal FC"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(&json!(2.2)), Some(2.2));
        assert_eq!(parse_price(&json!(3)), Some(3.0));
        assert_eq!(parse_price(&json!(" 1.85 ")), Some(1.85));
        assert_eq!(parse_price(&json!("evens")), None);
        assert_eq!(parse_price(&json!(0)), None);
        assert_eq!(parse_price(&json!(-1.5)), None);
        assert_eq!(parse_price(&json!("NaN")), None);
        assert_eq!(parse_price(&json!(null)), None);
        assert_eq!(parse_price(&json!(true)), None);
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 21, 15, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-10-21T15:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-21T16:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-21T15:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-21 15:00:00"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("next tuesday"), None);
    }
}
