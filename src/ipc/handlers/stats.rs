use crate::ipc::handlers::setup::stats_defaults;
use crate::ipc::helpers::{as_of, bounded_count, respond, HandlerResult, MAX_DAYS};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_stats_mistake_distribution(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!(state.store.mistake_type_distribution()?))
}

fn handle_stats_session_days(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "days": state.store.session_days()? }))
}

fn handle_stats_average_mistakes(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "averageMistakes": state.store.average_mistakes_per_session()? }))
}

fn handle_stats_mistake_trend(state: &mut AppState, req: &Request) -> HandlerResult {
    let defaults = stats_defaults(state)?;
    let days = bounded_count(&req.params, "days", defaults.trend_days, MAX_DAYS)?;
    let as_of = as_of(&req.params)?;
    let points = state.store.mistake_trend(days, as_of)?;
    Ok(json!({
        "days": days,
        "asOf": as_of.format("%Y-%m-%d").to_string(),
        "points": points
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "stats.mistakeDistribution" => handle_stats_mistake_distribution(state, req),
        "stats.sessionDays" => handle_stats_session_days(state, req),
        "stats.averageMistakes" => handle_stats_average_mistakes(state, req),
        "stats.mistakeTrend" => handle_stats_mistake_trend(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
