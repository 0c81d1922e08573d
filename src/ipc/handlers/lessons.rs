use crate::ipc::helpers::{
    optional_i64, optional_progress, optional_str, patch_object, required_i64,
    required_mistake_type, required_str, respond, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::models::{Lesson, LessonProgress};
use crate::store::{LessonPatch, NewLesson, NewLessonMistake};
use serde_json::json;

fn handle_lessons_list(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let teacher_id = optional_i64(p, "teacherId")?;
    let student_id = optional_i64(p, "studentId")?;
    let lessons: Vec<Lesson> = match (teacher_id, student_id) {
        (Some(teacher_id), Some(student_id)) => state
            .store
            .lessons_for_teacher(teacher_id)?
            .into_iter()
            .filter(|l| l.student_id == student_id)
            .collect(),
        (Some(teacher_id), None) => state.store.lessons_for_teacher(teacher_id)?,
        (None, Some(student_id)) => state.store.lessons_for_student(student_id)?,
        (None, None) => state.store.list_lessons()?,
    };
    Ok(json!({ "lessons": lessons }))
}

fn handle_lessons_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let lesson = state
        .store
        .get_lesson(id)?
        .ok_or_else(|| HandlerErr::not_found("lesson", id))?;
    let mistakes = state.store.lesson_mistakes_for_lesson(id)?;
    Ok(json!({ "lesson": lesson, "mistakes": mistakes }))
}

fn handle_lessons_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let lesson = state.store.create_lesson(NewLesson {
        date: required_str(p, "date")?,
        teacher_id: required_i64(p, "teacherId")?,
        student_id: required_i64(p, "studentId")?,
        surah_start: required_str(p, "surahStart")?,
        ayah_start: required_i64(p, "ayahStart")?,
        surah_end: required_str(p, "surahEnd")?,
        ayah_end: required_i64(p, "ayahEnd")?,
        notes: optional_str(p, "notes")?.unwrap_or_default(),
        progress: optional_progress(p, "progress")?.unwrap_or(LessonProgress::NotStarted),
    })?;
    Ok(json!({ "lesson": lesson }))
}

fn handle_lessons_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let patch = patch_object(&req.params)?;
    let lesson = state
        .store
        .update_lesson(
            id,
            LessonPatch {
                date: optional_str(patch, "date")?,
                surah_start: optional_str(patch, "surahStart")?,
                ayah_start: optional_i64(patch, "ayahStart")?,
                surah_end: optional_str(patch, "surahEnd")?,
                ayah_end: optional_i64(patch, "ayahEnd")?,
                notes: optional_str(patch, "notes")?,
                progress: optional_progress(patch, "progress")?,
            },
        )?
        .ok_or_else(|| HandlerErr::not_found("lesson", id))?;
    Ok(json!({ "lesson": lesson }))
}

fn handle_lessons_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    if !state.store.delete_lesson(id)? {
        return Err(HandlerErr::not_found("lesson", id));
    }
    Ok(json!({ "ok": true }))
}

fn handle_lesson_mistakes_list(state: &mut AppState, req: &Request) -> HandlerResult {
    let lesson_id = required_i64(&req.params, "lessonId")?;
    state
        .store
        .get_lesson(lesson_id)?
        .ok_or_else(|| HandlerErr::not_found("lesson", lesson_id))?;
    Ok(json!({ "mistakes": state.store.lesson_mistakes_for_lesson(lesson_id)? }))
}

fn handle_lesson_mistakes_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let mistake = state.store.create_lesson_mistake(NewLessonMistake {
        lesson_id: required_i64(p, "lessonId")?,
        mistake_type: required_mistake_type(p, "type")?,
        surah: required_str(p, "surah")?,
        ayah: required_i64(p, "ayah")?,
        description: optional_str(p, "description")?.unwrap_or_default(),
    })?;
    Ok(json!({ "mistake": mistake }))
}

fn handle_lesson_mistakes_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    if !state.store.delete_lesson_mistake(id)? {
        return Err(HandlerErr::not_found("lessonMistake", id));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "lessons.list" => handle_lessons_list(state, req),
        "lessons.get" => handle_lessons_get(state, req),
        "lessons.create" => handle_lessons_create(state, req),
        "lessons.update" => handle_lessons_update(state, req),
        "lessons.delete" => handle_lessons_delete(state, req),
        "lessons.mistakes.list" => handle_lesson_mistakes_list(state, req),
        "lessons.mistakes.create" => handle_lesson_mistakes_create(state, req),
        "lessons.mistakes.delete" => handle_lesson_mistakes_delete(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
