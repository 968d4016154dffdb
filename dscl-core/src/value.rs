//! Property values as reported by, or sent to, the directory service.
//!
//! A [`Value`] is one of four shapes: a scalar string, a scalar integer, or
//! array forms of either. Conversions are exhaustive over the shapes:
//! the string form joins array elements with a single space, and the array
//! form of a scalar is a one-element vector.

use std::collections::HashMap;
use std::fmt;

/// Mapping from property key to value for one directory record.
///
/// Keys are case-sensitive. The tool's output order is not preserved.
pub type Properties = HashMap<String, Value>;

/// A single logical property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    Strings(Vec<String>),
    Ints(Vec<i64>),
}

impl Value {
    /// Array projection of the value. Scalars become a one-element vector.
    #[must_use]
    pub fn strings(&self) -> Vec<String> {
        match self {
            Value::String(s) => vec![s.clone()],
            Value::Int(i) => vec![i.to_string()],
            Value::Strings(v) => v.clone(),
            Value::Ints(v) => v.iter().map(i64::to_string).collect(),
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Strings(_) | Value::Ints(_))
    }

    /// Number of elements in the array projection.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::String(_) | Value::Int(_) => 1,
            Value::Strings(v) => v.len(),
            Value::Ints(v) => v.len(),
        }
    }

    /// True only for an empty array. Scalars, even `""`, are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the scalar string, if that is the active shape.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer reading of the value: the scalar integer itself, or a scalar
    /// string that parses as one (record values always arrive as strings).
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> &mut Self {
        *self = Value::String(value.into());
        self
    }

    pub fn set_strings(&mut self, values: Vec<String>) -> &mut Self {
        *self = Value::Strings(values);
        self
    }

    pub fn set_int(&mut self, value: i64) -> &mut Self {
        *self = Value::Int(value);
        self
    }

    pub fn set_ints(&mut self, values: Vec<i64>) -> &mut Self {
        *self = Value::Ints(values);
        self
    }

    /// Appends raw text onto the string form, turning the value into a
    /// scalar string. Used when a record key repeats or continues.
    pub(crate) fn append_text(&mut self, text: &str) {
        let mut joined = self.to_string();
        joined.push_str(text);
        *self = Value::String(joined);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Strings(v) => f.write_str(&v.join(" ")),
            Value::Ints(v) => {
                let parts: Vec<String> = v.iter().map(i64::to_string).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::String(String::new())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Strings(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::Strings(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Ints(v)
    }
}
