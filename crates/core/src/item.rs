//! Normalized item representation served to clients.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Outbound item shape: `{id, title, url, by, score, time}`.
///
/// `time` is serialized as Unix epoch seconds. Unresolved items are served
/// as placeholders with null fields rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: i64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub by: Option<String>,
    pub score: i64,
    pub time: Option<i64>,
}

impl ItemView {
    /// Placeholder for an item that has not been populated yet.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            title: None,
            url: None,
            by: None,
            score: 0,
            time: None,
        }
    }

    /// Whether this view carries a usable title.
    pub fn is_populated(&self) -> bool {
        has_title(self.title.as_deref())
    }
}

/// A title counts as present only when non-empty after trimming.
pub fn has_title(title: Option<&str>) -> bool {
    title.is_some_and(|t| !t.trim().is_empty())
}

/// Convert a timestamp to Unix epoch seconds.
pub fn epoch_seconds(time: Option<OffsetDateTime>) -> Option<i64> {
    time.map(OffsetDateTime::unix_timestamp)
}

/// Parse a path segment as an item id. Ids are positive integers; an
/// optional `.json` suffix is accepted.
pub fn parse_item_id(raw: &str) -> crate::Result<i64> {
    let digits = raw.strip_suffix(".json").unwrap_or(raw);
    match digits.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(crate::Error::InvalidItemId(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_item_id() {
        assert_eq!(parse_item_id("42").unwrap(), 42);
        assert_eq!(parse_item_id("42.json").unwrap(), 42);
        assert!(parse_item_id("0").is_err());
        assert!(parse_item_id("-3").is_err());
        assert!(parse_item_id("abc").is_err());
    }

    #[test]
    fn test_serialized_field_order_and_nulls() {
        let view = ItemView {
            id: 42,
            title: Some("Hi".to_string()),
            url: None,
            by: None,
            score: 10,
            time: Some(1_700_000_000),
        };
        assert_eq!(
            serde_json::to_string(&view).unwrap(),
            r#"{"id":42,"title":"Hi","url":null,"by":null,"score":10,"time":1700000000}"#
        );
    }

    #[test]
    fn test_placeholder() {
        let view = ItemView::placeholder(7);
        assert!(!view.is_populated());
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({"id": 7, "title": null, "url": null, "by": null, "score": 0, "time": null})
        );
    }

    #[test]
    fn test_has_title() {
        assert!(has_title(Some("Show HN")));
        assert!(!has_title(Some("")));
        assert!(!has_title(Some("   ")));
        assert!(!has_title(None));
    }

    #[test]
    fn test_epoch_seconds() {
        let t = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(epoch_seconds(Some(t)), Some(1_700_000_000));
        assert_eq!(epoch_seconds(None), None);
    }
}
