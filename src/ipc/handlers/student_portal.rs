use crate::ipc::handlers::setup::stats_defaults;
use crate::ipc::helpers::{
    as_of, bounded_count, required_i64, respond, HandlerErr, HandlerResult, MAX_DAYS, MAX_LIMIT,
};
use crate::ipc::types::{AppState, Request};
use crate::models::Student;
use serde_json::json;

/// The student record bound to the account in `userId`.
fn student_for_user(state: &AppState, req: &Request) -> Result<Student, HandlerErr> {
    let user_id = required_i64(&req.params, "userId")?;
    state
        .store
        .student_for_user(user_id)?
        .ok_or_else(|| HandlerErr {
            code: "not_found",
            message: "no student record for user".into(),
            details: Some(json!({ "userId": user_id })),
        })
}

fn handle_student_teacher(state: &mut AppState, req: &Request) -> HandlerResult {
    let student = student_for_user(state, req)?;
    let teacher = state.store.teachers_for_student(student.id)?.into_iter().next();
    Ok(json!({ "teacher": teacher }))
}

fn handle_student_lessons(state: &mut AppState, req: &Request) -> HandlerResult {
    let student = student_for_user(state, req)?;
    Ok(json!({ "lessons": state.store.lessons_for_student(student.id)? }))
}

fn handle_student_sessions_recent(state: &mut AppState, req: &Request) -> HandlerResult {
    let student = student_for_user(state, req)?;
    let defaults = stats_defaults(state)?;
    let limit = bounded_count(&req.params, "limit", defaults.recent_limit, MAX_LIMIT)?;
    Ok(json!({
        "sessions": state.store.recent_sessions_for_student(student.id, limit)?
    }))
}

fn handle_student_progress(state: &mut AppState, req: &Request) -> HandlerResult {
    let student = student_for_user(state, req)?;
    let defaults = stats_defaults(state)?;
    let days = bounded_count(&req.params, "days", defaults.progress_days, MAX_DAYS)?;
    let as_of = as_of(&req.params)?;
    Ok(json!({
        "studentId": student.id,
        "days": days,
        "asOf": as_of.format("%Y-%m-%d").to_string(),
        "points": state.store.student_progress(student.id, days, as_of)?
    }))
}

fn handle_student_lesson_progress(state: &mut AppState, req: &Request) -> HandlerResult {
    let student = student_for_user(state, req)?;
    let defaults = stats_defaults(state)?;
    let days = bounded_count(&req.params, "days", defaults.progress_days, MAX_DAYS)?;
    let as_of = as_of(&req.params)?;
    Ok(json!({
        "studentId": student.id,
        "days": days,
        "asOf": as_of.format("%Y-%m-%d").to_string(),
        "points": state.store.student_lesson_progress(student.id, days, as_of)?
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "student.teacher" => handle_student_teacher(state, req),
        "student.lessons" => handle_student_lessons(state, req),
        "student.sessions.recent" => handle_student_sessions_recent(state, req),
        "student.progress" => handle_student_progress(state, req),
        "student.lessonProgress" => handle_student_lesson_progress(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
