use crate::ipc::helpers::{
    nullable_i64_patch, nullable_str_patch, optional_i64, optional_juz, optional_juz_list,
    optional_str, patch_object, required_i64, required_str, respond, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{NewStudent, StudentPatch};
use serde_json::json;

fn handle_students_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "students": state.store.list_students()? }))
}

fn handle_students_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let student = state
        .store
        .get_student(id)?
        .ok_or_else(|| HandlerErr::not_found("student", id))?;
    Ok(json!({ "student": student }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let student = state.store.create_student(NewStudent {
        user_id: optional_i64(p, "userId")?,
        name: required_str(p, "name")?,
        grade: optional_str(p, "grade")?.unwrap_or_default(),
        current_juz: optional_juz(p, "currentJuz")?,
        completed_juz: optional_juz_list(p, "completedJuz")?.unwrap_or_default(),
        current_surah: optional_str(p, "currentSurah")?,
        current_ayah: optional_i64(p, "currentAyah")?,
        notes: optional_str(p, "notes")?.unwrap_or_default(),
    })?;
    Ok(json!({ "student": student }))
}

fn handle_students_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let patch = patch_object(&req.params)?;
    let student = state
        .store
        .update_student(
            id,
            StudentPatch {
                user_id: nullable_i64_patch(patch, "userId")?,
                name: optional_str(patch, "name")?,
                grade: optional_str(patch, "grade")?,
                current_juz: optional_juz(patch, "currentJuz")?,
                completed_juz: optional_juz_list(patch, "completedJuz")?,
                current_surah: nullable_str_patch(patch, "currentSurah")?,
                current_ayah: nullable_i64_patch(patch, "currentAyah")?,
                notes: optional_str(patch, "notes")?,
            },
        )?
        .ok_or_else(|| HandlerErr::not_found("student", id))?;
    Ok(json!({ "student": student }))
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    if !state.store.delete_student(id)? {
        return Err(HandlerErr::not_found("student", id));
    }
    Ok(json!({ "ok": true }))
}

fn handle_students_stats(state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "students": state.store.all_students_with_stats()? }))
}

fn handle_students_get_with_stats(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let student = state
        .store
        .student_with_stats(id)?
        .ok_or_else(|| HandlerErr::not_found("student", id))?;
    Ok(json!({ "student": student }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_students_list(state, req),
        "students.get" => handle_students_get(state, req),
        "students.create" => handle_students_create(state, req),
        "students.update" => handle_students_update(state, req),
        "students.delete" => handle_students_delete(state, req),
        "students.stats" => handle_students_stats(state, req),
        "students.getWithStats" => handle_students_get_with_stats(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
