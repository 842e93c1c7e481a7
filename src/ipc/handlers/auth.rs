use super::params::get_non_empty_str;
use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_id, User};
use crate::store::users::DEFAULT_ADMIN_ID;
use crate::store::AuthStore;
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

fn session_json(auth: &AuthStore) -> serde_json::Value {
    json!({
        "user": auth.user(),
        "isAuthenticated": auth.is_authenticated(),
    })
}

/// Sign-in is a placeholder: any non-empty email/password pair signs in as
/// the default admin identity under the given email. The password is not
/// stored or checked against anything.
fn auth_login(
    auth: &mut AuthStore,
    conn: &Connection,
    admin_name: &str,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let email = get_non_empty_str(params, "email")?;
    get_non_empty_str(params, "password")?;
    let now = Utc::now();
    let user = User {
        id: DEFAULT_ADMIN_ID.to_string(),
        email: email.trim().to_string(),
        name: admin_name.to_string(),
        is_admin: true,
        created_at: now,
        last_login: Some(now),
    };
    auth.login(conn, user)?;
    Ok(session_json(auth))
}

fn auth_register(
    auth: &mut AuthStore,
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_non_empty_str(params, "name")?;
    let email = get_non_empty_str(params, "email")?;
    let password = get_non_empty_str(params, "password")?;
    let confirm = get_non_empty_str(params, "confirmPassword")?;
    if password != confirm {
        return Err(HandlerErr::bad_params("passwords do not match"));
    }
    let user = User {
        id: new_id(),
        email: email.trim().to_string(),
        name: name.trim().to_string(),
        is_admin: false,
        created_at: Utc::now(),
        last_login: None,
    };
    auth.register(conn, user)?;
    Ok(session_json(auth))
}

fn handle_session(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, session_json(&state.auth))
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match auth_login(&mut state.auth, conn, &state.config.seed_admin.name, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_register(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match auth_register(&mut state.auth, conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match state.auth.logout(conn) {
        Ok(()) => ok(&req.id, session_json(&state.auth)),
        Err(e) => HandlerErr::from(e).response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.session" => Some(handle_session(state, req)),
        "auth.login" => Some(handle_login(state, req)),
        "auth.register" => Some(handle_register(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
