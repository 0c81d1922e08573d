use crate::backup;
use crate::error::StoreError;
use crate::ipc::helpers::{required_str, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn backup_failed(e: anyhow::Error, path: &str) -> HandlerErr {
    HandlerErr {
        code: "backup_failed",
        message: format!("{e:#}"),
        details: Some(json!({ "path": path })),
    }
}

fn handle_backup_export_bundle(state: &mut AppState, req: &Request) -> HandlerResult {
    let out_path = required_str(&req.params, "outPath")?;
    if out_path.is_empty() {
        return Err(HandlerErr::bad_params("missing outPath"));
    }
    let snapshot = state.store.export_snapshot()?;
    let export = backup::export_snapshot_bundle(&snapshot, &PathBuf::from(&out_path))
        .map_err(|e| backup_failed(e, &out_path))?;
    tracing::info!(path = %out_path, sha256 = %export.sha256, "backup bundle exported");
    Ok(json!({
        "ok": true,
        "path": out_path,
        "bundleFormat": export.bundle_format,
        "entryCount": export.entry_count,
        "sha256": export.sha256
    }))
}

fn handle_backup_import_bundle(state: &mut AppState, req: &Request) -> HandlerResult {
    let in_path = required_str(&req.params, "inPath")?;
    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr {
            code: "not_found",
            message: "bundle file not found".into(),
            details: Some(json!({ "path": in_path })),
        });
    }
    let snapshot = backup::read_snapshot_bundle(&src).map_err(|e| backup_failed(e, &in_path))?;
    state
        .store
        .replace_with_snapshot(&snapshot)
        .map_err(|e| match e {
            StoreError::BadParams(msg) => HandlerErr {
                code: "backup_failed",
                message: format!("bundle holds invalid data: {}", msg),
                details: Some(json!({ "path": in_path })),
            },
            other => other.into(),
        })?;
    tracing::info!(path = %in_path, students = snapshot.students.len(), "backup bundle imported");
    Ok(json!({
        "ok": true,
        "bundleFormatDetected": backup::BUNDLE_FORMAT,
        "counts": {
            "users": snapshot.users.len(),
            "students": snapshot.students.len(),
            "sessions": snapshot.sessions.len(),
            "mistakes": snapshot.mistakes.len(),
            "lessons": snapshot.lessons.len(),
            "lessonMistakes": snapshot.lesson_mistakes.len()
        }
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.exportBundle" => handle_backup_export_bundle(state, req),
        "backup.importBundle" => handle_backup_import_bundle(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
