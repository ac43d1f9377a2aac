//! Keyset pagination utilities
//!
//! Listings page by a sort key (the last value seen) rather than by offset:
//! the caller fetches `limit + 1` rows and [`split_page`] decides whether a
//! further page exists.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Serialize;

/// Page size when the caller does not ask for one
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page a caller may request
pub const MAX_LIMIT: i64 = 50;

/// Clamp a requested page size into `[1, MAX_LIMIT]`.
///
/// Missing, zero and negative requests get [`DEFAULT_LIMIT`].
///
/// # Examples
/// ```
/// use devwiki_api::pagination::clamp_limit;
///
/// assert_eq!(clamp_limit(None), 10);
/// assert_eq!(clamp_limit(Some(0)), 10);
/// assert_eq!(clamp_limit(Some(25)), 25);
/// assert_eq!(clamp_limit(Some(500)), 50);
/// ```
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    match requested {
        Some(limit) if limit > 0 => limit.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Treat an empty or whitespace-only cursor as "start from the beginning"
pub fn normalize_cursor(cursor: Option<&str>) -> Option<&str> {
    cursor.filter(|c| !c.trim().is_empty())
}

/// Deserialize an optional integer query parameter where `?limit=` with
/// no value means "not given".
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptionalInt;

    impl<'de> Visitor<'de> for OptionalInt {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or an empty string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse().map(Some).map_err(E::custom)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(OptionalInt)
}

/// One page of results plus the key to resume after
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> KeysetPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

/// Cut `rows` (fetched with `limit + 1`) down to one page.
///
/// When more than `limit` rows came back the page is truncated and
/// `next_cursor` is the key of the last row kept.
pub fn split_page<T, F>(mut rows: Vec<T>, limit: i64, key: F) -> KeysetPage<T>
where
    F: Fn(&T) -> String,
{
    let limit = usize::try_from(limit).unwrap_or(0);
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    let next_cursor = if has_more {
        rows.last().map(&key)
    } else {
        None
    };

    KeysetPage {
        items: rows,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tag{:02}", i)).collect()
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(Some(1)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(51)), 50);
        assert_eq!(clamp_limit(Some(-3)), DEFAULT_LIMIT);
    }

    #[test]
    fn test_split_page_truncates_and_sets_cursor() {
        let page = split_page(names(4), 3, |s| s.clone());
        assert_eq!(page.items, vec!["tag00", "tag01", "tag02"]);
        assert_eq!(page.next_cursor.as_deref(), Some("tag02"));
    }

    #[test]
    fn test_split_page_exact_fit_has_no_cursor() {
        let page = split_page(names(3), 3, |s| s.clone());
        assert_eq!(page.items.len(), 3);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_split_page_empty() {
        let page = split_page(Vec::<String>::new(), 10, |s| s.clone());
        assert_eq!(page, KeysetPage::empty());
    }

    #[test]
    fn test_normalize_cursor() {
        assert_eq!(normalize_cursor(None), None);
        assert_eq!(normalize_cursor(Some("")), None);
        assert_eq!(normalize_cursor(Some("  ")), None);
        assert_eq!(normalize_cursor(Some("java")), Some("java"));
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = split_page(names(2), 1, |s| s.clone());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextCursor"], "tag00");
        assert_eq!(json["items"][0], "tag00");
    }
}
