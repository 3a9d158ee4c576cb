//! Serde helpers for HTML form submissions.
//!
//! Browsers send every field as text: unchecked checkboxes are omitted,
//! optional inputs arrive as empty strings, and date pickers use a handful of
//! layouts. These helpers normalise those shapes into typed values.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::Error, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum CheckboxValue {
    Bool(bool),
    Text(String),
}

/// Deserialize a checkbox. `y`, `yes`, `on`, `true` and `1` are checked;
/// `n`, `no`, `off`, `false`, `0` and the empty string are unchecked.
pub fn checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<CheckboxValue>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(CheckboxValue::Bool(b)) => Ok(Some(b)),
        Some(CheckboxValue::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "on" | "true" | "1" => Ok(Some(true)),
            "" | "n" | "no" | "off" | "false" | "0" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid checkbox value: {other}"))),
        },
    }
}

/// Deserialize an optional text input, treating blank strings as absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Deserialize a show start time. See [`parse_start_time`].
pub fn start_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_time(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid start_time: {raw}")))
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DD HH:MM[:SS]` /
/// `YYYY-MM-DDTHH:MM[:SS]` timestamp taken as UTC.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_LAYOUTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "checkbox")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "optional_text")]
        note: Option<String>,
    }

    #[test]
    fn test_checkbox_text_values() {
        let fields: Fields = serde_json::from_str(r#"{"flag": "y"}"#).unwrap();
        assert_eq!(fields.flag, Some(true));
        let fields: Fields = serde_json::from_str(r#"{"flag": "off"}"#).unwrap();
        assert_eq!(fields.flag, Some(false));
    }

    #[test]
    fn test_checkbox_bool_and_missing() {
        let fields: Fields = serde_json::from_str(r#"{"flag": true}"#).unwrap();
        assert_eq!(fields.flag, Some(true));
        let fields: Fields = serde_json::from_str("{}").unwrap();
        assert_eq!(fields.flag, None);
    }

    #[test]
    fn test_checkbox_rejects_garbage() {
        assert!(serde_json::from_str::<Fields>(r#"{"flag": "maybe"}"#).is_err());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        let fields: Fields = serde_json::from_str(r#"{"note": "   "}"#).unwrap();
        assert!(fields.note.is_none());
        let fields: Fields = serde_json::from_str(r#"{"note": " hi "}"#).unwrap();
        assert_eq!(fields.note.as_deref(), Some("hi"));
    }

    #[test]
    fn test_parse_start_time_layouts() {
        let expected = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap();
        assert_eq!(parse_start_time("2035-04-01T20:00:00Z"), Some(expected));
        assert_eq!(
            parse_start_time("2035-04-01T22:00:00+02:00"),
            Some(expected)
        );
        assert_eq!(parse_start_time("2035-04-01 20:00:00"), Some(expected));
        assert_eq!(parse_start_time("2035-04-01T20:00"), Some(expected));
    }

    #[test]
    fn test_parse_start_time_invalid() {
        assert!(parse_start_time("next tuesday").is_none());
        assert!(parse_start_time("").is_none());
    }
}
