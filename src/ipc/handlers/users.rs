use super::params::{get_object, get_required_str};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::users::{NewUser, UserPatch};
use crate::store::UserStore;
use chrono::Utc;
use serde_json::json;

fn users_create(users: &mut UserStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let data: NewUser = get_object(params, "user")?;
    if data.email.trim().is_empty() || data.name.trim().is_empty() {
        return Err(HandlerErr::bad_params("email and name are required"));
    }
    let user = users.add_user(data, Utc::now());
    Ok(json!({ "user": user }))
}

fn users_update(users: &mut UserStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "userId")?;
    let patch: UserPatch = get_object(params, "patch")?;
    let found = users.update_user(&id, patch);
    Ok(json!({ "found": found, "user": users.get(&id) }))
}

fn users_delete(users: &mut UserStore, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "userId")?;
    Ok(json!({ "found": users.delete_user(&id) }))
}

fn users_toggle_admin(
    users: &mut UserStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "userId")?;
    let found = users.toggle_admin_status(&id);
    Ok(json!({ "found": found, "user": users.get(&id) }))
}

fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let users = &mut state.users;
    match req.method.as_str() {
        "users.list" => Some(ok(&req.id, json!({ "users": users.list() }))),
        "users.create" => Some(respond(req, users_create(users, &req.params))),
        "users.update" => Some(respond(req, users_update(users, &req.params))),
        "users.delete" => Some(respond(req, users_delete(users, &req.params))),
        "users.toggleAdmin" => Some(respond(req, users_toggle_admin(users, &req.params))),
        _ => None,
    }
}
