//! Deserialization helpers for query-string filters.
//!
//! HTML forms and hand-written query strings send `?batch_id=` or
//! `?status=` when a filter is left blank. These helpers treat blank
//! values as absent instead of failing the whole request.

use serde::{Deserialize, Deserializer};
use std::{fmt::Display, str::FromStr};

/// Parses an optional value through `FromStr`, mapping blank strings to `None`.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Trims an optional free-text field, mapping blank input to `None`.
pub fn trimmed_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        id: Option<Uuid>,
        #[serde(default, deserialize_with = "trimmed_string")]
        search: Option<String>,
    }

    #[test]
    fn test_blank_values_are_none() {
        let f: Filter = serde_json::from_str(r#"{"id":"","search":"   "}"#).unwrap();
        assert!(f.id.is_none());
        assert!(f.search.is_none());
    }

    #[test]
    fn test_present_values_are_parsed() {
        let id = Uuid::new_v4();
        let f: Filter =
            serde_json::from_str(&format!(r#"{{"id":"{id}","search":"  Physics "}}"#)).unwrap();
        assert_eq!(f.id, Some(id));
        assert_eq!(f.search.as_deref(), Some("Physics"));
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let res: Result<Filter, _> = serde_json::from_str(r#"{"id":"not-a-uuid"}"#);
        assert!(res.is_err());
    }
}
