//! Structured values and canonical deep equality.
//!
//! Keys and values in the grid cache are arbitrarily nested structured data
//! compared by deep structural equality, never by identity. Map-typed keys
//! must hash identically no matter the insertion order of their entries, so
//! hashing goes through a canonical, recursively key-sorted encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Structured data exchanged with the grid: null, bool, number, string,
/// sequence, or mapping.
pub type DataValue = Value;

/// One key/value pair as handed to `put_all`/`get_all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: DataValue,
    pub value: DataValue,
}

impl CacheEntry {
    pub fn new(key: DataValue, value: DataValue) -> Self {
        Self { key, value }
    }
}

/// A cache key paired with its canonical encoding.
///
/// `Hash`, `Eq`, and `Ord` are defined over the canonical text, so two keys
/// that are structurally equal always collide, and partition routing stays
/// stable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct CanonicalKey {
    value: DataValue,
    canonical: String,
}

impl CanonicalKey {
    pub fn new(value: DataValue) -> Self {
        let canonical = canonical_text(&value);
        Self { value, canonical }
    }

    /// The original structured key.
    pub fn value(&self) -> &DataValue {
        &self.value
    }

    pub fn into_value(self) -> DataValue {
        self.value
    }

    /// The canonical compact-JSON encoding of the key.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl From<DataValue> for CanonicalKey {
    fn from(value: DataValue) -> Self {
        Self::new(value)
    }
}

impl PartialEq for CanonicalKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CanonicalKey {}

impl Hash for CanonicalKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for CanonicalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Render a value as canonical compact JSON with recursively sorted map keys.
pub fn canonical_text(value: &DataValue) -> String {
    canonicalize(value).to_string()
}

/// Rebuild a value with every mapping sorted by key, leaves untouched.
fn canonicalize(value: &DataValue) -> DataValue {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, inner)| (key.clone(), canonicalize(inner)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
