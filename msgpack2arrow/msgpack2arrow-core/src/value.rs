//! Dynamically-typed intermediate representation produced by the decoder.

use std::{mem::size_of, sync::Arc};

use indexmap::IndexMap;

use crate::error::ValueTypeError;

/// One decoded value prior to typing.
///
/// Values are immutable once decoded. Integer variants keep the signedness of
/// the wire encoding; widening happens only when a value is read as a
/// concrete column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    Array(Vec<Value>),
    Map(IndexMap<Arc<str>, Value>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn bytes(b: impl AsRef<[u8]>) -> Self {
        Self::Bytes(Arc::from(b.as_ref()))
    }

    /// Build a map value from `(key, value)` pairs, keeping first-seen key order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Arc::from(k.as_ref()), v))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a member of a map value. Non-map values have no members.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    pub fn try_bool(&self) -> Result<Option<bool>, ValueTypeError> {
        match self {
            Value::Bool(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Bool")),
        }
    }

    /// Read as a signed 64-bit integer. Unsigned values are accepted only when
    /// they fit.
    pub fn try_i64(&self) -> Result<Option<i64>, ValueTypeError> {
        match self {
            Value::I64(v) => Ok(Some(*v)),
            Value::U64(v) => i64::try_from(*v)
                .map(Some)
                .map_err(|_| ValueTypeError::new("I64", "U64 out of signed range")),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("I64")),
        }
    }

    /// Read as a 64-bit float, widening integers.
    pub fn try_f64(&self) -> Result<Option<f64>, ValueTypeError> {
        match self {
            Value::F64(v) => Ok(Some(*v)),
            Value::I64(v) => Ok(Some(*v as f64)),
            Value::U64(v) => Ok(Some(*v as f64)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("F64")),
        }
    }

    pub fn try_str(&self) -> Result<Option<&str>, ValueTypeError> {
        match self {
            Value::String(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_bytes(&self) -> Result<Option<&[u8]>, ValueTypeError> {
        match self {
            Value::Bytes(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Bytes")),
        }
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::U64(_) => "U64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
        }
    }

    /// Approximate number of bytes this value occupies, including its own slot.
    ///
    /// Used for memory-pool accounting of retained records; it is an estimate,
    /// not an exact allocator measurement.
    pub fn estimated_size(&self) -> usize {
        size_of::<Value>() + self.heap_size()
    }

    fn heap_size(&self) -> usize {
        match self {
            Value::Null | Value::Bool(_) | Value::I64(_) | Value::U64(_) | Value::F64(_) => 0,
            Value::String(s) => s.len(),
            Value::Bytes(b) => b.len(),
            Value::Array(items) => items.iter().map(Value::estimated_size).sum(),
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| size_of::<(Arc<str>, Value)>() + k.len() + v.heap_size())
                .sum(),
        }
    }
}
