use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SetValue {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// An entry of `valuesTemplate`, `values` or `secrets`.
///
/// The kind is decided once when the release is decoded. Strings and
/// mappings are the only kinds the resolver ever looks into.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OverlayValue {
    Text(String),
    Mapping(Mapping),
    /// Never a string or a mapping: the snapshot round trip would decode
    /// those back as `Text`/`Mapping`. Build it through `From<Value>`.
    Other(Value),
}

impl OverlayValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OverlayValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for OverlayValue {
    fn from(s: &str) -> Self {
        OverlayValue::Text(s.to_string())
    }
}

impl From<String> for OverlayValue {
    fn from(s: String) -> Self {
        OverlayValue::Text(s)
    }
}

impl From<Mapping> for OverlayValue {
    fn from(m: Mapping) -> Self {
        OverlayValue::Mapping(m)
    }
}

impl From<Value> for OverlayValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => OverlayValue::Text(s),
            Value::Mapping(m) => OverlayValue::Mapping(m),
            other => OverlayValue::Other(other),
        }
    }
}
