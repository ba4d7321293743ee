//! Weather feed normalization.
//!
//! The upstream `weather` field has been observed as a list of names, a map of
//! name to active flag, or a bare string. Every shape is folded into a
//! [`WeatherSnapshot`] so snapshots compare equal whenever they denote the same
//! active set.

use serde_json::{Map, Value};

use crate::model::{WeatherDocument, WeatherSnapshot};

/// Accepted shapes of the raw `weather` field.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherShape {
    /// `["Rainy", "Windy"]`
    List(Vec<Value>),
    /// `{"Rainy": true, "Sunny": false}`
    Flags(Map<String, Value>),
    /// `"Rainy"`
    Scalar(String),
    /// Anything else, including a missing field.
    Absent,
}

impl From<&Value> for WeatherShape {
    fn from(raw: &Value) -> Self {
        match raw {
            Value::Array(items) => Self::List(items.clone()),
            Value::Object(map) => Self::Flags(map.clone()),
            Value::String(s) => Self::Scalar(s.clone()),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Absent,
        }
    }
}

impl WeatherShape {
    /// Fold the shape into a canonical snapshot. Never fails.
    pub fn normalize(&self) -> WeatherSnapshot {
        let names = match self {
            Self::List(items) => normalize_list(items),
            Self::Flags(map) => normalize_flags(map),
            Self::Scalar(name) => normalize_scalar(name),
            Self::Absent => Vec::new(),
        };
        WeatherSnapshot(dedup_first(names))
    }
}

/// Normalize a raw `weather` value.
pub fn normalize(raw: &Value) -> WeatherSnapshot {
    WeatherShape::from(raw).normalize()
}

/// Normalize the `weather` field of a fetched document.
pub fn normalize_document(doc: &WeatherDocument) -> WeatherSnapshot {
    normalize(&doc.weather)
}

fn normalize_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn normalize_flags(map: &Map<String, Value>) -> Vec<String> {
    map.iter()
        .filter(|(_, active)| matches!(active, Value::Bool(true)))
        .map(|(name, _)| name.clone())
        .collect()
}

fn normalize_scalar(name: &str) -> Vec<String> {
    if name.is_empty() {
        Vec::new()
    } else {
        vec![name.to_owned()]
    }
}

fn dedup_first(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
