//! Lenient field deserializers for loosely-encoded backend payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Money fields arrive as numbers, numeric strings, or null; anything
/// unparseable is coerced to `0.0`.
pub fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Id collections arrive as JSON arrays or as a single comma-separated
/// string; both normalize to a vector of non-empty ids.
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect()),
        Some(Value::String(s)) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Dates arrive as `YYYY-MM-DD` or as a full RFC 3339 timestamp; only the
/// calendar date is kept.
pub fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {raw}")))
}

/// Parses the leading `YYYY-MM-DD` of a date or timestamp string.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct PriceHolder {
        #[serde(default, deserialize_with = "lenient_price")]
        price: f64,
    }

    #[derive(Deserialize)]
    struct ListHolder {
        #[serde(default, deserialize_with = "id_list")]
        ids: Vec<String>,
    }

    #[test]
    fn price_accepts_numbers_and_strings() {
        let holder: PriceHolder = serde_json::from_str(r#"{"price": 3.25}"#).unwrap();
        assert_eq!(holder.price, 3.25);

        let holder: PriceHolder = serde_json::from_str(r#"{"price": "4.50"}"#).unwrap();
        assert_eq!(holder.price, 4.5);
    }

    #[test]
    fn price_coerces_garbage_to_zero() {
        let holder: PriceHolder = serde_json::from_str(r#"{"price": "n/a"}"#).unwrap();
        assert_eq!(holder.price, 0.0);

        let holder: PriceHolder = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(holder.price, 0.0);

        let holder: PriceHolder = serde_json::from_str(r"{}").unwrap();
        assert_eq!(holder.price, 0.0);
    }

    #[test]
    fn id_list_accepts_arrays_and_csv() {
        let holder: ListHolder = serde_json::from_str(r#"{"ids": ["a", "b"]}"#).unwrap();
        assert_eq!(holder.ids, vec!["a", "b"]);

        let holder: ListHolder = serde_json::from_str(r#"{"ids": "a, b ,c"}"#).unwrap();
        assert_eq!(holder.ids, vec!["a", "b", "c"]);

        let holder: ListHolder = serde_json::from_str(r#"{"ids": null}"#).unwrap();
        assert!(holder.ids.is_empty());
    }

    #[test]
    fn calendar_date_truncates_timestamps() {
        let date = parse_calendar_date("2025-11-12T00:00:00.000Z").unwrap();
        assert_eq!(date.to_string(), "2025-11-12");

        let date = parse_calendar_date("2025-11-12").unwrap();
        assert_eq!(date.to_string(), "2025-11-12");

        assert!(parse_calendar_date("yesterday").is_none());
    }
}
