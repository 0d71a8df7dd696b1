//! Filter values and value conversions.

use rusqlite::types::Value;

/// The right-hand side of a filter.
///
/// A scalar renders as one comparison; a collection renders as a
/// parenthesised OR-group with one comparison per element, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Value),
    Collection(Vec<Value>),
}

impl FilterValue {
    /// Number of bind parameters this value contributes.
    pub fn len(&self) -> usize {
        match self {
            FilterValue::Scalar(_) => 1,
            FilterValue::Collection(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every element is an integer or a real.
    pub fn is_numeric(&self) -> bool {
        let numeric = |value: &Value| matches!(value, Value::Integer(_) | Value::Real(_));
        match self {
            FilterValue::Scalar(value) => numeric(value),
            FilterValue::Collection(values) => !values.is_empty() && values.iter().all(numeric),
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            FilterValue::Scalar(value) => vec![value],
            FilterValue::Collection(values) => values,
        }
    }
}

macro_rules! impl_filter_value {
    ($($t:ty => $conv:expr),* $(,)?) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::Scalar(($conv)(value))
                }
            }

            impl From<Vec<$t>> for FilterValue {
                fn from(values: Vec<$t>) -> Self {
                    FilterValue::Collection(values.into_iter().map($conv).collect())
                }
            }

            impl<const N: usize> From<[$t; N]> for FilterValue {
                fn from(values: [$t; N]) -> Self {
                    FilterValue::Collection(values.into_iter().map($conv).collect())
                }
            }
        )*
    };
}

impl_filter_value!(
    Value => |v: Value| v,
    String => Value::Text,
    &str => |v: &str| Value::Text(v.to_string()),
    i64 => Value::Integer,
    i32 => |v: i32| Value::Integer(v as i64),
    u32 => |v: u32| Value::Integer(v as i64),
    f64 => Value::Real,
    bool => |v: bool| Value::Integer(v as i64),
);

/// Converts a stored value into JSON.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Converts a JSON scalar into a bindable value. Arrays and objects are
/// bound as their JSON text.
pub fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(*b as i64),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}
