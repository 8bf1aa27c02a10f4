//! Lenient decoding of upstream measurements.
//!
//! Upstream payloads are loosely typed: counts sometimes arrive as strings,
//! rates use a decimal comma, and handle times come either as plain seconds or
//! as colon-delimited clock text. Anything that cannot be read is normalized to
//! zero and logged instead of failing the whole feed.

use serde::{
    Deserialize,
    Deserializer,
};
use serde_json::Value;

/// Converts a handle-time value to seconds.
///
/// Accepts integer or fractional seconds (`"45"`, `"45.5"`), `MM:SS` and
/// `H:MM:SS`. Empty, negative or otherwise malformed text yields `0.0`.
pub fn parse_handle_time(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }

    let parts = text.split(':').map(parse_component).collect::<Option<Vec<_>>>();
    let seconds = match parts.as_deref() {
        Some([seconds]) => Some(*seconds),
        Some([minutes, seconds]) => Some(minutes * 60.0 + seconds),
        Some([hours, minutes, seconds]) => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => None,
    };

    seconds.unwrap_or_else(|| {
        malformed("handle_time", text);
        0.0
    })
}

fn parse_component(part: &str) -> Option<f64> {
    let value = part.trim().replace(',', ".").parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Renders seconds as `MM:SS`, or `HH:MM:SS` from one hour upwards.
pub fn format_handle_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

fn malformed(field: &'static str, raw: &str) {
    debug!(field, raw, "malformed measurement normalized to zero");
}

fn number_from_value(field: &'static str, value: Option<Value>) -> f64 {
    let number = match &value {
        None | Some(Value::Null) => return 0.0,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => return 0.0,
        Some(Value::String(text)) => text.trim().replace(',', ".").parse::<f64>().ok(),
        Some(Value::Bool(_) | Value::Array(_) | Value::Object(_)) => None,
    };
    match number {
        Some(number) if number.is_finite() && number >= 0.0 => number,
        _ => {
            malformed(field, &value.map(|v| v.to_string()).unwrap_or_default());
            0.0
        }
    }
}

/// Non-negative count; fractional input is truncated.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(number_from_value("count", value).min(u32::MAX as f64) as u32)
}

/// Percentage clamped to `[0, 100]`.
pub(crate) fn rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(number_from_value("rate", value).min(100.0))
}

/// Non-negative decimal such as calls per hour (`"1,5"` is accepted).
pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(number_from_value("decimal", value))
}

/// Duration in seconds, either numeric or clock text.
pub(crate) fn seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => parse_handle_time(&text),
        other => number_from_value("seconds", other),
    })
}

/// Lists and nested objects that may arrive as `null`; null reads as empty.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Collaborator codes are strings upstream but occasionally arrive as numbers.
pub(crate) fn code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid collaborator code: {other}"))),
    }
}
