//! Content sniffing for stored assistant messages.
//!
//! History records only carry a string body. A body is treated as a chart when
//! it parses as a JSON object with a truthy `type` and a truthy `data`; every
//! other body, valid JSON or not, is plain text and is kept byte-for-byte.

use nlq_types::ChartDescriptor;
use serde_json::Value;

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Text(String),
    Chart(ChartDescriptor),
}

/// Decide whether `content` is a chart payload or plain text. Never fails.
pub fn classify(content: &str) -> Classified {
    let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(content) else {
        return Classified::Text(content.to_owned());
    };

    let present = |key: &str| obj.get(key).is_some_and(is_truthy);
    if !(present("type") && present("data")) {
        return Classified::Text(content.to_owned());
    }

    let chart_type = match obj.remove("type") {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => return Classified::Text(content.to_owned()),
    };
    let data = obj.remove("data").unwrap_or(Value::Null);

    Classified::Chart(ChartDescriptor { chart_type, data })
}

/// JSON truthiness as the webhook's original consumers evaluate it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
