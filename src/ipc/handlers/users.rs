use crate::ipc::helpers::{
    optional_role, optional_str, patch_object, required_i64, required_str, respond, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{NewUser, UserPatch};
use serde_json::json;

fn handle_users_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let role = optional_role(p, "role")?
        .ok_or_else(|| HandlerErr::bad_params("missing role"))?;
    let user = state.store.create_user(NewUser {
        username: required_str(p, "username")?,
        name: required_str(p, "name")?,
        role,
    })?;
    Ok(json!({ "user": user }))
}

fn handle_users_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let p = &req.params;
    let user = match optional_str(p, "username")? {
        Some(username) => state
            .store
            .get_user_by_username(&username)?
            .ok_or_else(|| HandlerErr {
                code: "not_found",
                message: "user not found".into(),
                details: Some(json!({ "username": username })),
            })?,
        None => {
            let id = required_i64(p, "id")?;
            state
                .store
                .get_user(id)?
                .ok_or_else(|| HandlerErr::not_found("user", id))?
        }
    };
    Ok(json!({ "user": user }))
}

fn handle_users_list(state: &mut AppState, req: &Request) -> HandlerResult {
    let role = optional_role(&req.params, "role")?;
    Ok(json!({ "users": state.store.list_users(role)? }))
}

fn handle_users_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    let patch = patch_object(&req.params)?;
    let user = state
        .store
        .update_user(
            id,
            UserPatch {
                name: optional_str(patch, "name")?,
                role: optional_role(patch, "role")?,
            },
        )?
        .ok_or_else(|| HandlerErr::not_found("user", id))?;
    Ok(json!({ "user": user }))
}

fn handle_users_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let id = required_i64(&req.params, "id")?;
    if !state.store.delete_user(id)? {
        return Err(HandlerErr::not_found("user", id));
    }
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "users.create" => handle_users_create(state, req),
        "users.get" => handle_users_get(state, req),
        "users.list" => handle_users_list(state, req),
        "users.update" => handle_users_update(state, req),
        "users.delete" => handle_users_delete(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
