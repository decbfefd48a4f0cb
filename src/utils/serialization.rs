//! Lenient decoding for the coordinator's numeric fields.
//!
//! The order book mixes JSON numbers and numeric strings, and now and then
//! carries placeholders like `"n/a"`. A field that can't be read becomes
//! `None` instead of failing the record, and with it the whole book.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A finite `f64` from a number or a numeric string; anything else is `None`.
pub(crate) fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

/// Decimal quantities as text ("100.50"). Bare numbers are kept as their
/// text form; parsing happens at render time. Other JSON shapes are `None`.
pub(crate) fn de_decimal_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
