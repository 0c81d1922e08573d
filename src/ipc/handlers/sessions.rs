use crate::ipc::handlers::setup::stats_defaults;
use crate::ipc::helpers::{
    bounded_count, optional_bool, optional_i64, optional_str, patch_object, required_i64,
    required_str, respond, HandlerErr, HandlerResult, MAX_LIMIT,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{NewSession, SessionPatch};
use serde_json::json;

fn handle_sessions_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "sessions": state.store.list_sessions()? }))
}

fn handle_sessions_recent(state: &mut AppState, req: &Request) -> HandlerResult {
    let defaults = stats_defaults(state)?;
    let limit = bounded_count(&req.params, "limit", defaults.recent_limit, MAX_LIMIT)?;
    Ok(json!({ "sessions": state.store.recent_sessions(limit)? }))
}

fn handle_sessions_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let session = state
        .store
        .get_session(id)?
        .ok_or_else(|| HandlerErr::not_found("session", id))?;
    Ok(json!({ "session": session }))
}

fn handle_sessions_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let session = state.store.create_session(NewSession {
        date: required_str(p, "date")?,
        student1_id: required_i64(p, "student1Id")?,
        student2_id: required_i64(p, "student2Id")?,
        surah_start: required_str(p, "surahStart")?,
        ayah_start: required_i64(p, "ayahStart")?,
        surah_end: required_str(p, "surahEnd")?,
        ayah_end: required_i64(p, "ayahEnd")?,
        completed: optional_bool(p, "completed")?.unwrap_or(false),
    })?;
    Ok(json!({ "session": session }))
}

fn handle_sessions_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let patch = patch_object(&req.params)?;
    let session = state
        .store
        .update_session(
            id,
            SessionPatch {
                date: optional_str(patch, "date")?,
                student1_id: optional_i64(patch, "student1Id")?,
                student2_id: optional_i64(patch, "student2Id")?,
                surah_start: optional_str(patch, "surahStart")?,
                ayah_start: optional_i64(patch, "ayahStart")?,
                surah_end: optional_str(patch, "surahEnd")?,
                ayah_end: optional_i64(patch, "ayahEnd")?,
                completed: optional_bool(patch, "completed")?,
            },
        )?
        .ok_or_else(|| HandlerErr::not_found("session", id))?;
    Ok(json!({ "session": session }))
}

fn handle_sessions_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    if !state.store.delete_session(id)? {
        return Err(HandlerErr::not_found("session", id));
    }
    Ok(json!({ "ok": true }))
}

fn handle_sessions_for_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = required_i64(&req.params, "studentId")?;
    state
        .store
        .get_student(student_id)?
        .ok_or_else(|| HandlerErr::not_found("student", student_id))?;
    Ok(json!({ "sessions": state.store.sessions_for_student(student_id)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "sessions.list" => handle_sessions_list(state, req),
        "sessions.recent" => handle_sessions_recent(state, req),
        "sessions.get" => handle_sessions_get(state, req),
        "sessions.create" => handle_sessions_create(state, req),
        "sessions.update" => handle_sessions_update(state, req),
        "sessions.delete" => handle_sessions_delete(state, req),
        "sessions.forStudent" => handle_sessions_for_student(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
