use serde::Serialize;
use serde_json::Value;

/// Keys whose values never reach the log.
const SECRET_KEYS: &[&str] = &["access_token", "refresh_token", "password", "apikey"];

/// Emits a backend payload at debug level as pretty JSON with credentials masked.
///
/// Serialization only happens when debug logging is on.
pub(crate) fn debug_backend_body<T: Serialize>(context: &str, value: &T) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let body = redacted_pretty(value);
    tracing::debug!(body = %body, "{context}");
}

fn redacted_pretty<T: Serialize>(value: &T) -> String {
    let mut json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(error) => return format!("<unserializable body: {error}>"),
    };
    mask_secrets(&mut json);
    serde_json::to_string_pretty(&json).unwrap_or_else(|error| format!("<pretty print failed: {error}>"))
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) {
                    *inner = Value::String("<redacted>".to_string());
                } else {
                    mask_secrets(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}
