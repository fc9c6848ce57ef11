//! Normalization of embedding payloads.
//!
//! Embedding services do not agree on how a single embedding is shaped.
//! Depending on model version and endpoint an item may be a bare array of
//! numbers, an object with a `values` array, or an object with an
//! `embedding` field. [`normalize_embedding`] tries a fixed, ordered list of
//! extraction strategies and returns the first one that yields a vector.

use serde_json::Value;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// A single extraction attempt. Returns `None` when the shape does not apply.
pub type Strategy = fn(&Value) -> Option<Embedding>;

/// Extraction strategies in priority order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("sequence", from_sequence),
    ("values", from_values_field),
    ("embedding", from_embedding_field),
    ("iteration", from_iteration),
];

/// Flatten one embedding item into a vector of floats.
pub fn normalize_embedding(item: &Value) -> Result<Embedding> {
    let (strategy, embedding) = STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(item).map(|embedding| (*name, embedding)))
        .ok_or_else(|| {
            EmbeddingError::Normalization(format!("unrecognized shape: {}", shape_of(item)))
        })?;

    if embedding.is_empty() {
        return Err(EmbeddingError::Normalization(format!(
            "strategy `{strategy}` produced an empty vector"
        )));
    }

    Ok(embedding)
}

/// A plain array of numbers (numeric strings are accepted too).
pub fn from_sequence(item: &Value) -> Option<Embedding> {
    item.as_array()?.iter().map(as_float).collect()
}

/// An object exposing a `values` array.
pub fn from_values_field(item: &Value) -> Option<Embedding> {
    from_sequence(item.get("values")?)
}

/// An object exposing an `embedding` field, either a bare array or a
/// nested `{ "values": [...] }` object.
pub fn from_embedding_field(item: &Value) -> Option<Embedding> {
    let inner = item.get("embedding")?;
    from_sequence(inner).or_else(|| from_values_field(inner))
}

/// Last resort: iterate the object itself.
///
/// Accepts objects keyed by positional indices (`{"0": 0.1, "1": 0.2}`) and
/// single-member wrappers around an array (`{"vector": [...]}`).
pub fn from_iteration(item: &Value) -> Option<Embedding> {
    let object = item.as_object()?;

    let mut indexed = Vec::with_capacity(object.len());
    for (key, value) in object {
        match key.parse::<usize>() {
            Ok(position) => indexed.push((position, value)),
            Err(_) => {
                indexed.clear();
                break;
            }
        }
    }
    if !indexed.is_empty() {
        indexed.sort_by_key(|(position, _)| *position);
        return indexed.into_iter().map(|(_, value)| as_float(value)).collect();
    }

    if object.len() == 1 {
        return object.values().next().and_then(from_sequence);
    }

    None
}

fn as_float(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn shape_of(item: &Value) -> String {
    match item {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {} non-numeric items", items.len()),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
    }
}
