//! Raw JSON text captured verbatim.
//!
//! [`RawJson`] is the placeholder that sits in a polymorphic slot while the
//! rest of a document is decoded. It holds the exact text of that slot so a
//! resolver can inspect it later.

use core::fmt;

use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::value::RawValue;

/// A raw JSON value that has not been parsed.
///
/// # Example
///
/// ```
/// use jsonface_core::RawJson;
///
/// let raw = RawJson::new(r#"{"kind": "bell", "pitch": 440}"#);
/// let parsed: serde_json::Value = raw.parse().unwrap();
/// assert_eq!(parsed["pitch"], 440);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct RawJson(String);

impl RawJson {
    /// Wrap JSON text. The text is not validated.
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        RawJson(text.into())
    }

    /// The JSON literal `null`.
    #[inline]
    pub fn null() -> Self {
        RawJson(String::from("null"))
    }

    /// Get the raw JSON as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the raw JSON as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Take the captured text.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether nothing was captured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the captured text is the literal `null`.
    pub fn is_null(&self) -> bool {
        self.0.trim() == "null"
    }

    /// Parse the captured text with serde.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.0)
    }
}

impl fmt::Debug for RawJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawJson").field(&self.0).finish()
    }
}

impl fmt::Display for RawJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawJson {
    fn from(s: &str) -> Self {
        RawJson::new(s)
    }
}

impl From<String> for RawJson {
    fn from(s: String) -> Self {
        RawJson(s)
    }
}

impl AsRef<str> for RawJson {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for RawJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            return serializer.serialize_unit();
        }
        let raw = RawValue::from_string(self.0.clone()).map_err(serde::ser::Error::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(RawJson(raw.get().to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_text_verbatim() {
        let raw: RawJson = serde_json::from_str(r#"{"kind" : "X",  "v":1}"#).unwrap();
        assert_eq!(raw.as_str(), r#"{"kind" : "X",  "v":1}"#);
    }

    #[test]
    fn encodes_literally() {
        let raw = RawJson::new(r#"[1,2,{"a":true}]"#);
        assert_eq!(serde_json::to_string(&raw).unwrap(), r#"[1,2,{"a":true}]"#);
    }

    #[test]
    fn empty_capture_encodes_as_null() {
        assert_eq!(serde_json::to_string(&RawJson::default()).unwrap(), "null");
        assert!(RawJson::null().is_null());
        assert!(!RawJson::new("0").is_null());
    }
}
