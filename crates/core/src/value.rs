//! Value types for Quarry
//!
//! This module defines:
//! - Value: the runtime representation of one entity property value
//! - IndexKey: the canonical hashable form of a Value used as an inverted
//!   index bucket key
//!
//! ## Type Rules
//!
//! - No implicit type coercions: `Int(1) != Float(1.0)` - different types
//!   are NEVER equal
//! - `Bytes` are not `Text`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//!
//! `IndexKey` deliberately diverges from `Value` equality: bucket lookup
//! must be total, so float keys are canonicalized by bit pattern
//! (`-0.0` → `0.0`, every NaN → one quiet-NaN pattern) and `Null` is a
//! legal bucket key.

use serde::{Deserialize, Serialize};

use crate::types::ValueType;

/// Runtime representation of a single entity property value.
///
/// Entities are flat: a property holds exactly one scalar (or null).
///
/// ## Type Equality
///
/// Different types are NEVER equal, even if they contain the same "value":
/// - `Int(1) != Float(1.0)`
/// - `Bytes(b"hello") != Text("hello")`
///
/// Float equality follows IEEE-754 semantics:
/// - `NaN != NaN`
/// - `-0.0 == 0.0`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value (an optional property with no value)
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

// Custom PartialEq implementation for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            // Different types are NEVER equal
            _ => false,
        }
    }
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
            Value::Bytes(_) => "Bytes",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The declared-type tag this value inhabits, or `None` for `Null`
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Text(_) => Some(ValueType::Text),
            Value::Bytes(_) => Some(ValueType::Bytes),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Canonical hashable form of a [`Value`] used as an inverted index
/// bucket key.
///
/// Conversion is total: every value (including `Null`) maps to exactly one
/// key. Floats are canonicalized by bit pattern so that `-0.0` and `0.0`
/// share a bucket and every NaN shares one bucket, which makes bucket
/// lookup behave like the hash-map keying of the original engine rather
/// than IEEE-754 equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKey {
    /// Bucket for null-valued properties
    Null,
    /// Boolean bucket key
    Bool(bool),
    /// Integer bucket key
    Int(i64),
    /// Canonicalized IEEE-754 bit pattern
    Float(u64),
    /// String bucket key
    Text(String),
    /// Byte-string bucket key
    Bytes(Vec<u8>),
}

impl IndexKey {
    /// Canonicalize a float into its bucket bit pattern.
    ///
    /// `-0.0` folds into `0.0`; every NaN folds into the one quiet-NaN
    /// pattern.
    fn float_bits(f: f64) -> u64 {
        if f.is_nan() {
            f64::NAN.to_bits()
        } else if f == 0.0 {
            0.0f64.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl From<&Value> for IndexKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => IndexKey::Null,
            Value::Bool(b) => IndexKey::Bool(*b),
            Value::Int(i) => IndexKey::Int(*i),
            Value::Float(f) => IndexKey::Float(Self::float_bits(*f)),
            Value::Text(s) => IndexKey::Text(s.clone()),
            Value::Bytes(b) => IndexKey::Bytes(b.clone()),
        }
    }
}
