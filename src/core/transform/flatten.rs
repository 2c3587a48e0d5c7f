//! Message flattening
//!
//! Converts nested JSON messages to flat field paths so that detection and
//! classification operate on scalar leaves:
//!
//! - `{"user": {"email": "a@b.com"}}` → `"user.email"`
//! - `{"items": [{"sku": "X"}]}` → `"items[0].sku"`

use serde_json::Value;
use std::collections::BTreeMap;

/// Flatten a message into `field path -> scalar value` pairs
///
/// Objects recurse with `.`-joined keys and arrays with `[index]` suffixes.
/// Scalar leaves (strings, numbers, booleans, null) become entries; empty
/// objects and arrays contribute nothing.
///
/// # Examples
///
/// ```
/// use argus::core::transform::flatten_message;
/// use serde_json::json;
///
/// let message = json!({"user": {"address": {"city": "Springfield"}}});
/// let flat = flatten_message(&message);
/// assert_eq!(flat["user.address.city"], json!("Springfield"));
/// ```
pub fn flatten_message(message: &Value) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    flatten_into(message, "", &mut fields);
    fields
}

fn flatten_into(value: &Value, path: &str, fields: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let new_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(val, &new_path, fields);
            }
        }
        Value::Array(arr) => {
            for (idx, val) in arr.iter().enumerate() {
                let new_path = format!("{path}[{idx}]");
                flatten_into(val, &new_path, fields);
            }
        }
        scalar => {
            fields.insert(path.to_string(), scalar.clone());
        }
    }
}
