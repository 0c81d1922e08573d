use crate::ipc::helpers::{
    optional_i64, optional_mistake_type, optional_str, patch_object, required_i64,
    required_mistake_type, required_str, respond, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{MistakePatch, NewMistake};
use serde_json::json;

fn handle_mistakes_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "mistakes": state.store.list_mistakes()? }))
}

fn handle_mistakes_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let mistake = state.store.create_mistake(NewMistake {
        session_id: required_i64(p, "sessionId")?,
        student_id: required_i64(p, "studentId")?,
        mistake_type: required_mistake_type(p, "type")?,
        surah: required_str(p, "surah")?,
        ayah: required_i64(p, "ayah")?,
        description: optional_str(p, "description")?.unwrap_or_default(),
    })?;
    Ok(json!({ "mistake": mistake }))
}

fn handle_mistakes_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let patch = patch_object(&req.params)?;
    let mistake = state
        .store
        .update_mistake(
            id,
            MistakePatch {
                mistake_type: optional_mistake_type(patch, "type")?,
                surah: optional_str(patch, "surah")?,
                ayah: optional_i64(patch, "ayah")?,
                description: optional_str(patch, "description")?,
            },
        )?
        .ok_or_else(|| HandlerErr::not_found("mistake", id))?;
    Ok(json!({ "mistake": mistake }))
}

fn handle_mistakes_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    if !state.store.delete_mistake(id)? {
        return Err(HandlerErr::not_found("mistake", id));
    }
    Ok(json!({ "ok": true }))
}

fn handle_mistakes_for_session(state: &mut AppState, req: &Request) -> HandlerResult {
    let session_id = required_i64(&req.params, "sessionId")?;
    state
        .store
        .get_session(session_id)?
        .ok_or_else(|| HandlerErr::not_found("session", session_id))?;
    Ok(json!({ "mistakes": state.store.mistakes_for_session(session_id)? }))
}

fn handle_mistakes_for_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = required_i64(&req.params, "studentId")?;
    state
        .store
        .get_student(student_id)?
        .ok_or_else(|| HandlerErr::not_found("student", student_id))?;
    Ok(json!({ "mistakes": state.store.mistakes_for_student(student_id)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "mistakes.list" => handle_mistakes_list(state, req),
        "mistakes.create" => handle_mistakes_create(state, req),
        "mistakes.update" => handle_mistakes_update(state, req),
        "mistakes.delete" => handle_mistakes_delete(state, req),
        "mistakes.forSession" => handle_mistakes_for_session(state, req),
        "mistakes.forStudent" => handle_mistakes_for_student(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
