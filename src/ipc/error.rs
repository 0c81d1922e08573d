use serde_json::{Map, Value};

fn envelope(id: &str, ok: bool, key: &str, body: Value) -> Value {
    let mut out = Map::with_capacity(3);
    out.insert("id".into(), Value::from(id));
    out.insert("ok".into(), Value::Bool(ok));
    out.insert(key.into(), body);
    Value::Object(out)
}

/// Success reply: `{id, ok: true, result}`.
pub fn ok(id: &str, result: Value) -> Value {
    envelope(id, true, "result", result)
}

/// Failure reply: `{id, ok: false, error: {code, message, details?}}`.
/// `details` is left out entirely when there is nothing to attach.
pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    let mut error = Map::new();
    error.insert("code".into(), Value::from(code));
    error.insert("message".into(), Value::String(message.into()));
    if let Some(d) = details {
        error.insert("details".into(), d);
    }
    envelope(id, false, "error", Value::Object(error))
}
