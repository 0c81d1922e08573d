use crate::ipc::handlers::setup::stats_defaults;
use crate::ipc::helpers::{
    bounded_count, required_i64, respond, HandlerErr, HandlerResult, MAX_LIMIT,
};
use crate::ipc::types::{AppState, Request};
use crate::models::{Role, User};
use serde_json::json;

/// Resolves `teacherId` to a user holding the teacher role.
fn require_teacher(state: &AppState, req: &Request) -> Result<User, HandlerErr> {
    let teacher_id = required_i64(&req.params, "teacherId")?;
    let user = state
        .store
        .get_user(teacher_id)?
        .ok_or_else(|| HandlerErr::not_found("teacher", teacher_id))?;
    if user.role != Role::Teacher {
        return Err(HandlerErr::bad_params(format!(
            "user {} is not a teacher",
            teacher_id
        )));
    }
    Ok(user)
}

fn handle_teacher_stats(state: &mut AppState, req: &Request) -> HandlerResult {
    let teacher = require_teacher(state, req)?;
    Ok(json!(state.store.teacher_lesson_stats(teacher.id)?))
}

fn handle_teacher_students(state: &mut AppState, req: &Request) -> HandlerResult {
    let teacher = require_teacher(state, req)?;
    let mut students = Vec::new();
    for s in state.store.students_for_teacher(teacher.id)? {
        if let Some(with_stats) = state.store.student_with_stats(s.id)? {
            students.push(with_stats);
        }
    }
    Ok(json!({ "students": students }))
}

fn handle_teacher_students_link(state: &mut AppState, req: &Request) -> HandlerResult {
    let teacher = require_teacher(state, req)?;
    let student_id = required_i64(&req.params, "studentId")?;
    let link = state.store.link_teacher_student(teacher.id, student_id)?;
    Ok(json!({ "link": link }))
}

fn handle_teacher_students_unlink(state: &mut AppState, req: &Request) -> HandlerResult {
    let teacher = require_teacher(state, req)?;
    let student_id = required_i64(&req.params, "studentId")?;
    if !state.store.unlink_teacher_student(teacher.id, student_id)? {
        return Err(HandlerErr {
            code: "not_found",
            message: "link not found".into(),
            details: Some(json!({ "teacherId": teacher.id, "studentId": student_id })),
        });
    }
    Ok(json!({ "ok": true }))
}

fn handle_teacher_lessons_recent(state: &mut AppState, req: &Request) -> HandlerResult {
    let teacher = require_teacher(state, req)?;
    let defaults = stats_defaults(state)?;
    let limit = bounded_count(&req.params, "limit", defaults.recent_limit, MAX_LIMIT)?;
    Ok(json!({ "lessons": state.store.recent_lessons_for_teacher(teacher.id, limit)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "teacher.stats" => handle_teacher_stats(state, req),
        "teacher.students" => handle_teacher_students(state, req),
        "teacher.students.link" => handle_teacher_students_link(state, req),
        "teacher.students.unlink" => handle_teacher_students_unlink(state, req),
        "teacher.lessons.recent" => handle_teacher_lessons_recent(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
