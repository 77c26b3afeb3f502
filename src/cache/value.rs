//! Cache Value Module
//!
//! The polymorphic value slot stored by the cache, with the uniform
//! approximate-size rule used for memory-bound enforcement.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// == Cache Value ==
/// A value stored in the cache.
///
/// The cache treats values as opaque; this closed set of shapes exists so
/// that memory accounting can dispatch on the runtime kind and so that the
/// snapshot encoding stays self-describing across the round-trip.
///
/// `Null` doubles as the "not found" slot in bulk lookups, which makes a
/// genuinely stored `Null` indistinguishable from an absent key there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<CacheValue>),
    Map(HashMap<String, CacheValue>),
}

impl CacheValue {
    // == Size In Bytes ==
    /// Approximate number of bytes occupied by this value.
    ///
    /// Strings and blobs count their byte length, fixed-width numerics
    /// their width, booleans one byte, and aggregates the sum of their
    /// elements. The result is an estimate, not a heap measurement.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            CacheValue::Null => 1,
            CacheValue::Bool(_) => 1,
            CacheValue::Int(_) => 8,
            CacheValue::Float(_) => 8,
            CacheValue::String(s) => s.len(),
            CacheValue::Bytes(b) => b.len(),
            CacheValue::List(items) => items.iter().map(CacheValue::size_in_bytes).sum(),
            CacheValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| k.len() + v.size_in_bytes())
                .sum(),
        }
    }

    /// Returns true for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, CacheValue::Null)
    }
}

// == Conversions ==
impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::String(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::String(value)
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Bool(value)
    }
}

impl From<i32> for CacheValue {
    fn from(value: i32) -> Self {
        CacheValue::Int(i64::from(value))
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Int(value)
    }
}

impl From<f64> for CacheValue {
    fn from(value: f64) -> Self {
        CacheValue::Float(value)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(value: Vec<u8>) -> Self {
        CacheValue::Bytes(value)
    }
}

impl From<Vec<CacheValue>> for CacheValue {
    fn from(value: Vec<CacheValue>) -> Self {
        CacheValue::List(value)
    }
}
