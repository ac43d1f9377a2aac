//! Three-state field for partial updates
//!
//! JSON update payloads need to tell "field not sent" apart from
//! "field sent as null". `Option<T>` collapses both, so update DTOs use
//! `Patch<T>` with `#[serde(default)]`:
//!
//! ```
//! use devwiki_common::patch::Patch;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct UpdateTag {
//!     #[serde(default)]
//!     description: Patch<String>,
//! }
//!
//! let absent: UpdateTag = serde_json::from_str("{}").unwrap();
//! assert!(absent.description.is_absent());
//!
//! let cleared: UpdateTag = serde_json::from_str(r#"{"description": null}"#).unwrap();
//! assert_eq!(cleared.description, Patch::Null);
//! ```

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field was not provided; leave the stored value alone
    #[default]
    Absent,
    /// Field was explicitly null; clear the stored value
    Null,
    /// Field carries a new value
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; a missing key falls back to Default.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Patch<String>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert!(p.name.is_absent());
    }

    #[test]
    fn test_null_is_null() {
        let p: Payload = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(p.name, Patch::Null);
    }

    #[test]
    fn test_value_is_value() {
        let p: Payload = serde_json::from_str(r#"{"name": "rust"}"#).unwrap();
        assert_eq!(p.name, Patch::Value("rust".to_string()));
    }
}
