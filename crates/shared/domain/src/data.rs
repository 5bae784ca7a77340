//! Free-form extension payload attached to each user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{DomainError, DomainResult};

/// Extension attributes keyed by host-defined names.
pub type ExtData = BTreeMap<String, DataValue>;

/// A single extension value.
///
/// Numbers are `f64`, so integers are exact only within ±2^53.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<DataValue>),
    Map(BTreeMap<String, DataValue>),
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Number(v)
    }
}

/// Lossy above 2^53 in magnitude: the value is rounded to the nearest `f64`.
impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Number(v as f64)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::String(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::String(v)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(v: Vec<DataValue>) -> Self {
        DataValue::List(v)
    }
}

impl From<BTreeMap<String, DataValue>> for DataValue {
    fn from(v: BTreeMap<String, DataValue>) -> Self {
        DataValue::Map(v)
    }
}

impl DataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, DataValue>> {
        match self {
            DataValue::Map(m) => Some(m),
            _ => None,
        }
    }

    fn to_json(&self) -> DomainResult<Value> {
        Ok(match self {
            DataValue::Bool(b) => Value::Bool(*b),
            DataValue::Number(n) => Value::Number(encode_number(*n)?),
            DataValue::String(s) => Value::String(s.clone()),
            DataValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(DataValue::to_json)
                    .collect::<DomainResult<Vec<_>>>()?,
            ),
            DataValue::Map(map) => Value::Object(encode_map(map)?),
        })
    }

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(DataValue::Bool(b)),
            Value::Number(n) => n.as_f64().map(DataValue::Number),
            Value::String(s) => Some(DataValue::String(s)),
            Value::Array(items) => Some(DataValue::List(
                items.into_iter().filter_map(DataValue::from_json).collect(),
            )),
            Value::Object(map) => Some(DataValue::Map(decode_map(map))),
        }
    }
}

// Integral values are written as JSON integers so they read back unchanged.
fn encode_number(n: f64) -> DomainResult<Number> {
    if !n.is_finite() {
        return Err(DomainError::encoding(format!("non-finite number {}", n)));
    }
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or_else(|| DomainError::encoding(format!("unrepresentable number {}", n)))
}

fn encode_map(map: &BTreeMap<String, DataValue>) -> DomainResult<Map<String, Value>> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
        .collect()
}

fn decode_map(map: Map<String, Value>) -> BTreeMap<String, DataValue> {
    map.into_iter()
        .filter_map(|(k, v)| DataValue::from_json(v).map(|v| (k, v)))
        .collect()
}

/// Encode an extension payload into its stored JSON object form.
///
/// # Errors
/// Fails if any number is NaN or infinite.
pub fn encode_data(data: &ExtData) -> DomainResult<Value> {
    encode_map(data).map(Value::Object)
}

/// Decode a stored payload. Anything other than a JSON object yields an
/// empty map; null members are skipped.
pub fn decode_data(value: Value) -> ExtData {
    match value {
        Value::Object(map) => decode_map(map),
        _ => ExtData::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payload_encodes_to_empty_object() {
        assert_eq!(encode_data(&ExtData::new()).unwrap(), json!({}));
    }

    #[test]
    fn test_nested_payload_round_trip() {
        let mut prefs = BTreeMap::new();
        prefs.insert("theme".to_string(), DataValue::from("dark"));
        prefs.insert("font_size".to_string(), DataValue::from(14_i64));

        let mut data = ExtData::new();
        data.insert("preferences".to_string(), DataValue::Map(prefs));
        data.insert(
            "tags".to_string(),
            DataValue::List(vec!["a".into(), true.into(), 1.5.into()]),
        );

        let stored = encode_data(&data).unwrap();
        assert_eq!(
            stored,
            json!({
                "preferences": { "font_size": 14, "theme": "dark" },
                "tags": ["a", true, 1.5]
            })
        );
        assert_eq!(decode_data(stored), data);
    }

    #[test]
    fn test_non_finite_number_fails_encoding() {
        let mut data = ExtData::new();
        data.insert("score".to_string(), DataValue::Number(f64::NAN));
        assert!(matches!(encode_data(&data), Err(DomainError::Encoding(_))));

        let mut nested = BTreeMap::new();
        nested.insert("inf".to_string(), DataValue::Number(f64::INFINITY));
        let mut data = ExtData::new();
        data.insert("nested".to_string(), DataValue::Map(nested));
        assert!(encode_data(&data).is_err());
    }

    #[test]
    fn test_decode_non_object_is_empty() {
        assert!(decode_data(json!(null)).is_empty());
        assert!(decode_data(json!([1, 2, 3])).is_empty());
        assert!(decode_data(json!("text")).is_empty());
    }

    #[test]
    fn test_integers_exact_up_to_f64_mantissa() {
        let limit = 9_007_199_254_740_992_i64; // 2^53
        let mut data = ExtData::new();
        data.insert("exact".to_string(), DataValue::from(limit));
        data.insert("rounded".to_string(), DataValue::from(limit + 1));

        let stored = encode_data(&data).unwrap();
        assert_eq!(stored["exact"], json!(limit));
        assert_eq!(stored["rounded"], json!(limit));
    }

    #[test]
    fn test_accessors_match_variant() {
        let data = decode_data(json!({
            "name": "dark",
            "size": 14,
            "prefs": { "compact": true }
        }));

        assert_eq!(data["name"].as_str(), Some("dark"));
        assert_eq!(data["size"].as_f64(), Some(14.0));
        assert_eq!(data["name"].as_f64(), None);

        let prefs = data["prefs"].as_map().unwrap();
        assert_eq!(prefs["compact"], DataValue::Bool(true));
        assert!(data["size"].as_map().is_none());
    }

    #[test]
    fn test_decode_skips_nulls() {
        let data = decode_data(json!({ "a": null, "b": [null, 1] }));
        assert!(!data.contains_key("a"));
        assert_eq!(data["b"], DataValue::List(vec![DataValue::Number(1.0)]));
    }
}
