use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{HandlerErr, MAX_DAYS, MAX_LIMIT};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
enum SetupSection {
    Stats,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Stats => "setup.stats",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Stats => json!({
            "defaultTrendDays": 7,
            "defaultProgressDays": 30,
            "defaultRecentLimit": 5
        }),
    }
}

/// Report defaults applied when a request leaves `days` or `limit` out.
#[derive(Debug, Clone, Copy)]
pub struct StatsDefaults {
    pub trend_days: i64,
    pub progress_days: i64,
    pub recent_limit: i64,
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Stats => match k.as_str() {
                "defaultTrendDays" | "defaultProgressDays" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, MAX_DAYS)?));
                }
                "defaultRecentLimit" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, MAX_LIMIT)?));
                }
                _ => return Err(format!("unknown stats field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &rusqlite::Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Malformed stored values keep the defaults.
            let mut merged = current.clone();
            if merge_section_patch(section, &mut merged, saved_obj).is_ok() {
                current = merged;
            }
        }
    }
    Ok(current)
}

pub fn stats_defaults(state: &AppState) -> Result<StatsDefaults, HandlerErr> {
    let section = load_section(state.store.conn(), SetupSection::Stats).map_err(|e| HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
        details: None,
    })?;
    let get = |key: &str, fallback: i64| {
        section
            .get(key)
            .and_then(|v| v.as_i64())
            .unwrap_or(fallback)
    };
    Ok(StatsDefaults {
        trend_days: get("defaultTrendDays", 7),
        progress_days: get("defaultProgressDays", 30),
        recent_limit: get("defaultRecentLimit", 5),
    })
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let stats = match load_section(state.store.conn(), SetupSection::Stats) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    ok(&req.id, json!({ "stats": stats }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = state.store.conn();
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true, "stats": current }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
