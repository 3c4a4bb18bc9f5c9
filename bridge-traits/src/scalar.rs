//! Lenient serde helpers for remote columns that arrive as strings or numbers.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

fn to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// `Option<String>` from any JSON scalar, `null` as `None`.
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(to_string))
}

/// `String` from any non-null JSON scalar.
pub fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    to_string(Value::deserialize(deserializer)?)
        .ok_or_else(|| de::Error::custom("expected a value, found null"))
}

/// `T::default()` when the field is `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
