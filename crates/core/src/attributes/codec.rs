//! Attribute codec: stored JSON text to [`AttributeMap`] and back.
//!
//! Two decoding policies exist side by side:
//!
//! - **Lenient** ([`AttributePayload::read`], [`decode`]) for read paths.
//!   Absent, blank, or malformed payloads never raise; they surface as an
//!   empty map. Null and nested members are dropped.
//! - **Strict** ([`try_decode`], [`from_json`]) for write paths. Undecodable
//!   input is `MalformedAttributePayload`, nested members are rejected.

use serde_json::{Map, Value};

use super::{AttributeMap, AttributeValue};
use crate::error::CatalogError;

static EMPTY: AttributeMap = AttributeMap::new();

/// Outcome of reading a stored payload leniently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributePayload {
    /// No payload was stored.
    Absent,
    /// The payload decoded to a JSON object.
    Decoded(AttributeMap),
    /// The payload was present but is not a JSON object.
    Malformed,
}

impl AttributePayload {
    /// Read a stored payload.
    #[must_use]
    pub fn read(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Absent;
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "undecodable attribute payload, reading as empty");
                Self::Malformed
            }
        }
    }

    /// Read an already-parsed payload.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Object(members) => Self::Decoded(lenient_members(members)),
            other => {
                tracing::debug!(kind = json_kind(other), "attribute payload is not an object");
                Self::Malformed
            }
        }
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }

    /// The decoded map; empty for absent and malformed payloads.
    #[must_use]
    pub fn map(&self) -> &AttributeMap {
        match self {
            Self::Decoded(map) => map,
            Self::Absent | Self::Malformed => &EMPTY,
        }
    }

    /// Consume into the decoded map; empty for absent and malformed payloads.
    #[must_use]
    pub fn into_map(self) -> AttributeMap {
        match self {
            Self::Decoded(map) => map,
            Self::Absent | Self::Malformed => AttributeMap::new(),
        }
    }
}

/// Lenient decode of a stored payload.
#[must_use]
pub fn decode(raw: Option<&str>) -> AttributeMap {
    AttributePayload::read(raw).into_map()
}

/// Strict decode of payload text.
///
/// # Errors
///
/// Returns `MalformedAttributePayload` if the text is not JSON or not an
/// object, and `InvalidFieldValue` if a member is an array or object.
pub fn try_decode(raw: &str) -> Result<AttributeMap, CatalogError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CatalogError::MalformedAttributePayload(e.to_string()))?;
    from_json(&value)
}

/// Strict decode of an already-parsed payload.
///
/// Null members are treated as absent. A top-level null is an empty map.
///
/// # Errors
///
/// Same as [`try_decode`].
pub fn from_json(value: &Value) -> Result<AttributeMap, CatalogError> {
    let members = match value {
        Value::Object(members) => members,
        Value::Null => return Ok(AttributeMap::new()),
        other => {
            return Err(CatalogError::MalformedAttributePayload(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            )));
        }
    };

    let mut map = AttributeMap::new();
    for (key, value) in members {
        if value.is_null() {
            continue;
        }
        let scalar = AttributeValue::from_json(value)
            .ok_or_else(|| CatalogError::invalid(key.as_str(), "must be a scalar value"))?;
        map.insert(key.as_str(), scalar);
    }
    Ok(map)
}

/// Encode a map as compact JSON text.
#[must_use]
pub fn encode(map: &AttributeMap) -> String {
    map.to_json().to_string()
}

fn lenient_members(members: &Map<String, Value>) -> AttributeMap {
    members
        .iter()
        .filter_map(|(key, value)| AttributeValue::from_json(value).map(|v| (key.clone(), v)))
        .collect()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_lenient_read_of_garbage_is_empty() {
        assert_eq!(AttributePayload::read(Some("{invalid")), AttributePayload::Malformed);
        assert!(decode(Some("{invalid")).is_empty());
        assert!(decode(Some("[1, 2]")).is_empty());
        assert!(decode(None).is_empty());
    }

    #[test]
    fn test_blank_and_null_are_absent() {
        assert_eq!(AttributePayload::read(Some("  ")), AttributePayload::Absent);
        assert_eq!(AttributePayload::read(Some("null")), AttributePayload::Absent);
        assert_eq!(AttributePayload::read(None), AttributePayload::Absent);
    }

    #[test]
    fn test_lenient_read_drops_nested_members() {
        let map = decode(Some(r#"{"stock": 4, "tags": ["a"], "meta": {"x": 1}, "note": null}"#));
        assert_eq!(map.len(), 1);
        assert_eq!(map.number("stock"), Some(4.0));
    }

    #[test]
    fn test_strict_decode_errors() {
        assert!(matches!(
            try_decode("{invalid"),
            Err(CatalogError::MalformedAttributePayload(_))
        ));
        assert!(matches!(
            try_decode("42"),
            Err(CatalogError::MalformedAttributePayload(_))
        ));
        let err = try_decode(r#"{"stock": [1]}"#).unwrap_err();
        assert_eq!(err.field(), Some("stock"));
    }

    #[test]
    fn test_strict_decode_skips_null_members() {
        let map = from_json(&json!({"type_houblon": null, "stock": 3})).unwrap();
        assert!(!map.contains_key("type_houblon"));
        assert!(from_json(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_encode_then_decode_preserves_map() {
        let map = from_json(&json!({
            "degre_alcool": 5.2,
            "amertume_ibu": 25,
            "type_houblon": "Cascade",
            "certification_bio": true
        }))
        .unwrap();

        let text = encode(&map);
        assert!(!text.contains(' '));
        assert_eq!(decode(Some(&text)), map);
    }
}
