//! Scalar literal values shared by both expression grammars.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scalar literal value.
///
/// `Opaque` is the could-not-parse sentinel: document shapes neither
/// grammar can interpret are wrapped verbatim so that compilation always
/// terminates instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Opaque(Value),
}

impl ScalarValue {
    /// Convert an untyped JSON value into a scalar.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ScalarValue::Null,
            Value::Bool(b) => ScalarValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ScalarValue::Int(i)
                } else {
                    ScalarValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => ScalarValue::String(s.clone()),
            other => ScalarValue::Opaque(other.clone()),
        }
    }
}
