use crate::model::{new_id, User};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ADMIN_ID: &str = "1";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_admin: Option<bool>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Application accounts. Lives for the process only.
#[derive(Debug)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    /// Starts with one admin so a fresh install is never locked out.
    pub fn seeded(admin_email: &str, admin_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            users: vec![User {
                id: DEFAULT_ADMIN_ID.to_string(),
                email: admin_email.to_string(),
                name: admin_name.to_string(),
                is_admin: true,
                created_at: now,
                last_login: Some(now),
            }],
        }
    }

    pub fn list(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn add_user(&mut self, data: NewUser, now: DateTime<Utc>) -> &User {
        let user = User {
            id: new_id(),
            email: data.email,
            name: data.name,
            is_admin: data.is_admin,
            created_at: now,
            last_login: data.last_login,
        };
        debug!(user_id = %user.id, "user added");
        self.users.push(user);
        &self.users[self.users.len() - 1]
    }

    pub fn update_user(&mut self, id: &str, patch: UserPatch) -> bool {
        let Some(user) = self.users.iter_mut().find(|u| u.id == id) else {
            return false;
        };
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(is_admin) = patch.is_admin {
            user.is_admin = is_admin;
        }
        if let Some(last_login) = patch.last_login {
            user.last_login = Some(last_login);
        }
        true
    }

    pub fn delete_user(&mut self, id: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        self.users.len() != before
    }

    pub fn toggle_admin_status(&mut self, id: &str) -> bool {
        match self.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_admin = !user.is_admin;
                debug!(user_id = %id, is_admin = user.is_admin, "admin flag toggled");
                true
            }
            None => false,
        }
    }
}
