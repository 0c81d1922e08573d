use crate::calc;
use crate::error::StoreError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::Request;
use crate::models::{LessonProgress, MistakeType, Role};
use crate::quran;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

pub const MAX_DAYS: i64 = 365;
pub const MAX_LIMIT: i64 = 100;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(entity: &str, id: i64) -> Self {
        Self {
            code: "not_found",
            message: format!("{} not found", entity),
            details: Some(json!({ "entity": entity, "id": id })),
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

pub type HandlerResult = Result<Value, HandlerErr>;

pub fn respond(req: &Request, result: HandlerResult) -> Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

fn field<'a>(params: &'a Value, key: &str) -> Option<&'a Value> {
    params.get(key).filter(|v| !v.is_null())
}

pub fn required_i64(params: &Value, key: &str) -> Result<i64, HandlerErr> {
    match field(params, key) {
        Some(v) => v
            .as_i64()
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be integer", key))),
        None => Err(HandlerErr::bad_params(format!("missing {}", key))),
    }
}

pub fn optional_i64(params: &Value, key: &str) -> Result<Option<i64>, HandlerErr> {
    match field(params, key) {
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be integer", key))),
        None => Ok(None),
    }
}

/// Absent leaves the value alone, `null` clears it.
pub fn nullable_i64_patch(params: &Value, key: &str) -> Result<Option<Option<i64>>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => v
            .as_i64()
            .map(|n| Some(Some(n)))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be integer or null", key))),
    }
}

pub fn required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    match field(params, key) {
        Some(v) => v
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be string", key))),
        None => Err(HandlerErr::bad_params(format!("missing {}", key))),
    }
}

pub fn optional_str(params: &Value, key: &str) -> Result<Option<String>, HandlerErr> {
    match field(params, key) {
        Some(v) => v
            .as_str()
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be string", key))),
        None => Ok(None),
    }
}

pub fn nullable_str_patch(params: &Value, key: &str) -> Result<Option<Option<String>>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => v
            .as_str()
            .map(|s| Some(Some(s.trim().to_string())))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be string or null", key))),
    }
}

pub fn optional_bool(params: &Value, key: &str) -> Result<Option<bool>, HandlerErr> {
    match field(params, key) {
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be boolean", key))),
        None => Ok(None),
    }
}

fn juz_value(v: &Value, key: &str) -> Result<u8, HandlerErr> {
    v.as_i64()
        .filter(|n| (1..=i64::from(quran::JUZ_COUNT)).contains(n))
        .map(|n| n as u8)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer in 1..=30", key)))
}

pub fn optional_juz(params: &Value, key: &str) -> Result<Option<u8>, HandlerErr> {
    field(params, key).map(|v| juz_value(v, key)).transpose()
}

pub fn optional_juz_list(params: &Value, key: &str) -> Result<Option<Vec<u8>>, HandlerErr> {
    let Some(v) = field(params, key) else {
        return Ok(None);
    };
    let arr = v
        .as_array()
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be an array", key)))?;
    arr.iter()
        .map(|item| juz_value(item, key))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

pub fn optional_role(params: &Value, key: &str) -> Result<Option<Role>, HandlerErr> {
    match optional_str(params, key)? {
        Some(raw) => Role::parse(&raw)
            .map(Some)
            .ok_or_else(|| {
                HandlerErr::bad_params(format!("{} must be one of: student, teacher", key))
            }),
        None => Ok(None),
    }
}

pub fn optional_mistake_type(params: &Value, key: &str) -> Result<Option<MistakeType>, HandlerErr> {
    match optional_str(params, key)? {
        Some(raw) => MistakeType::parse(&raw).map(Some).ok_or_else(|| {
            HandlerErr::bad_params(format!(
                "{} must be one of: {}",
                key,
                MistakeType::ALL.map(|t| t.as_str()).join(", ")
            ))
        }),
        None => Ok(None),
    }
}

pub fn required_mistake_type(params: &Value, key: &str) -> Result<MistakeType, HandlerErr> {
    optional_mistake_type(params, key)?
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn optional_progress(params: &Value, key: &str) -> Result<Option<LessonProgress>, HandlerErr> {
    match optional_str(params, key)? {
        Some(raw) => LessonProgress::parse(&raw).map(Some).ok_or_else(|| {
            HandlerErr::bad_params(format!(
                "{} must be one of: NotStarted, InProgress, Completed",
                key
            ))
        }),
        None => Ok(None),
    }
}

pub fn patch_object(params: &Value) -> Result<&Value, HandlerErr> {
    match params.get("patch") {
        Some(v) if v.is_object() => Ok(v),
        _ => Err(HandlerErr::bad_params("patch must be an object")),
    }
}

/// Reporting date; today's UTC date unless `asOf` is given.
pub fn as_of(params: &Value) -> Result<NaiveDate, HandlerErr> {
    match optional_str(params, "asOf")? {
        Some(raw) => calc::parse_iso_date(&raw)
            .ok_or_else(|| HandlerErr::bad_params("asOf must be an ISO date (YYYY-MM-DD)")),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn bounded_count(
    params: &Value,
    key: &str,
    default: i64,
    max: i64,
) -> Result<usize, HandlerErr> {
    let n = optional_i64(params, key)?.unwrap_or(default);
    if !(1..=max).contains(&n) {
        return Err(HandlerErr::bad_params(format!("{} must be in 1..={}", key, max)));
    }
    Ok(n as usize)
}
