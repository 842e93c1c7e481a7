use std::path::PathBuf;

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;

use crate::config::Config;
use crate::store::{AttendanceStore, AuthStore, StudentStore, UserStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the sidecar holds for one process. The auth session and the
/// attendance records are rehydrated from the workspace database on
/// `workspace.select`; users and students live only as long as the process.
pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub auth: AuthStore,
    pub users: UserStore,
    pub students: StudentStore,
    pub attendance: AttendanceStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let users = UserStore::seeded(&config.seed_admin.email, &config.seed_admin.name, Utc::now());
        Self {
            config,
            workspace: None,
            db: None,
            auth: AuthStore::default(),
            users,
            students: StudentStore::default(),
            attendance: AttendanceStore::default(),
        }
    }
}
