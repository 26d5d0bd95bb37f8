//! Payload parameters fed into the signer.
//!
//! A [`Payload`] is an ordered map from parameter name to a scalar
//! [`ParamValue`]. Every value has a defined text form ([`ParamValue::to_text`])
//! and a canonical, case-folded form ([`ParamValue::to_canonical`]) used when
//! building the signing context.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SignerError, SignerResult};

/// A scalar payload value.
///
/// Deserialization goes through `TryFrom<serde_json::Value>`, so only JSON
/// scalars are accepted and `Bytes` is never produced from a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean, rendered as `true` / `false`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for [`ParamValue::Int`].
    UInt(u64),
    /// Floating point number, rendered with Rust's shortest round-trip form.
    Float(f64),
    /// Text.
    Str(String),
    /// Raw bytes. Must be valid UTF-8 to take part in signing.
    Bytes(Vec<u8>),
}

impl ParamValue {
    /// Coerce the value to its text form.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::TypeConversion`] for [`ParamValue::Bytes`] that
    /// are not valid UTF-8. `key` names the offending parameter in the error.
    pub fn to_text(&self, key: &str) -> SignerResult<String> {
        match self {
            Self::Bool(b) => Ok(b.to_string()),
            Self::Int(i) => Ok(i.to_string()),
            Self::UInt(u) => Ok(u.to_string()),
            Self::Float(f) => Ok(f.to_string()),
            Self::Str(s) => Ok(s.clone()),
            Self::Bytes(bytes) => {
                String::from_utf8(bytes.clone()).map_err(|e| SignerError::TypeConversion {
                    key: key.to_owned(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// The text form, lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use wepay_signer::ParamValue;
    ///
    /// assert_eq!(ParamValue::from("Home").to_canonical("page").unwrap(), "home");
    /// assert_eq!(ParamValue::from(true).to_canonical("flag").unwrap(), "true");
    /// ```
    pub fn to_canonical(&self, key: &str) -> SignerResult<String> {
        self.to_text(key).map(|text| text.to_lowercase())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Key/value parameters to be signed.
///
/// Keys are kept in byte order, so iteration is deterministic regardless of
/// insertion order.
///
/// # Examples
///
/// ```
/// use wepay_signer::Payload;
///
/// let payload = Payload::from([("token", "t"), ("page", "p")]);
/// assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["page", "token"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload {
    params: BTreeMap<String, ParamValue>,
}

impl Payload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value for `key` if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.params.insert(key.into(), value.into())
    }

    /// Remove a parameter, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.params.remove(key)
    }

    /// Look up a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the payload has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over parameters in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.params.iter()
    }

    /// Iterate over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Payload
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl TryFrom<serde_json::Value> for ParamValue {
    type Error = SignerError;

    /// Convert a JSON scalar. `null`, arrays and objects have no text form.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::UInt(u))
                } else {
                    n.as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| SignerError::TypeConversion {
                            key: String::new(),
                            reason: format!("unrepresentable number {n}"),
                        })
                }
            }
            Value::String(s) => Ok(Self::Str(s)),
            other => Err(SignerError::TypeConversion {
                key: String::new(),
                reason: format!("{} is not a scalar", json_kind(&other)),
            }),
        }
    }
}

impl TryFrom<serde_json::Value> for Payload {
    type Error = SignerError;

    /// Convert a JSON object whose members are all scalars.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(SignerError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        let mut payload = Self::new();
        for (key, value) in map {
            let value = ParamValue::try_from(value).map_err(|e| match e {
                SignerError::TypeConversion { reason, .. } => SignerError::TypeConversion {
                    key: key.clone(),
                    reason,
                },
                other => other,
            })?;
            payload.params.insert(key, value);
        }
        Ok(payload)
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_scalars_as_text() {
        assert_eq!(ParamValue::from("AbC").to_text("k").unwrap(), "AbC");
        assert_eq!(ParamValue::from(42_i64).to_text("k").unwrap(), "42");
        assert_eq!(ParamValue::from(-7_i32).to_text("k").unwrap(), "-7");
        assert_eq!(ParamValue::from(u64::MAX).to_text("k").unwrap(), "18446744073709551615");
        assert_eq!(ParamValue::from(false).to_text("k").unwrap(), "false");
        assert_eq!(ParamValue::from(1.5_f64).to_text("k").unwrap(), "1.5");
    }

    #[test]
    fn test_should_lowercase_canonical_form() {
        assert_eq!(ParamValue::from("HoMe").to_canonical("page").unwrap(), "home");
        assert_eq!(ParamValue::from("ÄBC").to_canonical("k").unwrap(), "äbc");
    }

    #[test]
    fn test_should_accept_utf8_bytes() {
        let value = ParamValue::from(b"Redirect".to_vec());
        assert_eq!(value.to_canonical("k").unwrap(), "redirect");
    }

    #[test]
    fn test_should_reject_invalid_utf8_bytes() {
        let value = ParamValue::from(vec![0xff, 0xfe]);
        let result = value.to_text("blob");
        assert!(matches!(result, Err(SignerError::TypeConversion { ref key, .. }) if key == "blob"));
    }

    #[test]
    fn test_should_keep_keys_sorted_regardless_of_insertion_order() {
        let mut payload = Payload::new();
        payload.insert("token", "t");
        payload.insert("Page", "p");
        payload.insert("redirect_uri", "r");
        assert_eq!(
            payload.keys().collect::<Vec<_>>(),
            vec!["Page", "redirect_uri", "token"]
        );
    }

    #[test]
    fn test_should_insert_and_remove_parameters() {
        let mut payload = Payload::from([("a", "1")]);
        assert_eq!(payload.insert("a", "2"), Some(ParamValue::from("1")));
        assert!(payload.contains_key("a"));
        assert_eq!(payload.remove("a"), Some(ParamValue::from("2")));
        assert!(payload.is_empty());
        assert_eq!(payload.remove("a"), None);
    }

    #[test]
    fn test_should_build_payload_from_json_object() {
        let json = serde_json::json!({
            "token": "t",
            "page": 3,
            "live": true,
            "ratio": 0.25,
        });
        let payload = Payload::try_from(json).unwrap();
        assert_eq!(payload.len(), 4);
        assert_eq!(payload.get("token"), Some(&ParamValue::Str("t".to_owned())));
        assert_eq!(payload.get("page"), Some(&ParamValue::Int(3)));
        assert_eq!(payload.get("live"), Some(&ParamValue::Bool(true)));
        assert_eq!(payload.get("ratio"), Some(&ParamValue::Float(0.25)));
    }

    #[test]
    fn test_should_reject_non_object_json() {
        let result = Payload::try_from(serde_json::json!(["token"]));
        assert!(matches!(result, Err(SignerError::InvalidPayload(_))));
    }

    #[test]
    fn test_should_reject_nested_json_values() {
        let result = Payload::try_from(serde_json::json!({ "token": null }));
        assert!(matches!(result, Err(SignerError::TypeConversion { ref key, .. }) if key == "token"));

        let result = Payload::try_from(serde_json::json!({ "nested": { "a": 1 } }));
        assert!(matches!(result, Err(SignerError::TypeConversion { ref key, .. }) if key == "nested"));
    }

    #[test]
    fn test_should_reject_arrays_on_both_json_paths() {
        let document = r#"{"a":[104,105]}"#;

        let via_serde = serde_json::from_str::<Payload>(document);
        let err = via_serde.unwrap_err().to_string();
        assert!(err.contains("`a`"), "unexpected error: {err}");

        let value: serde_json::Value = serde_json::from_str(document).unwrap();
        assert!(matches!(
            Payload::try_from(value),
            Err(SignerError::TypeConversion { ref key, .. }) if key == "a"
        ));
    }

    #[test]
    fn test_should_reject_null_and_non_object_with_serde() {
        assert!(serde_json::from_str::<Payload>(r#"{"a":null}"#).is_err());
        assert!(serde_json::from_str::<Payload>(r#"["a"]"#).is_err());
        assert!(serde_json::from_str::<ParamValue>("[1]").is_err());
    }

    #[test]
    fn test_should_deserialize_payload_with_serde() {
        let payload: Payload = serde_json::from_str(r#"{"page":"home","count":2}"#).unwrap();
        assert_eq!(payload.get("page"), Some(&ParamValue::Str("home".to_owned())));
        assert_eq!(payload.get("count"), Some(&ParamValue::Int(2)));
    }
}
