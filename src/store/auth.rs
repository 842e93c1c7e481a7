use super::{read_json, StoreError};
use crate::db::KvStorage;
use crate::model::User;
use tracing::{debug, info, warn};

pub const USER_KEY: &str = "user";
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";
const AUTH_FLAG_SET: &str = "true";

/// Session identity. There is no credential check here; callers validate
/// form input and hand over the identity to sign in as.
#[derive(Debug, Default)]
pub struct AuthStore {
    user: Option<User>,
}

impl AuthStore {
    pub fn load(storage: &dyn KvStorage) -> Self {
        match storage.get(AUTH_FLAG_KEY) {
            Ok(Some(flag)) if flag == AUTH_FLAG_SET => {}
            Ok(_) => return Self::default(),
            Err(e) => {
                warn!(key = AUTH_FLAG_KEY, error = %e, "failed to read persisted value");
                return Self::default();
            }
        }
        let user: Option<User> = read_json(storage, USER_KEY);
        if let Some(u) = &user {
            info!(user_id = %u.id, "restored session");
        }
        Self { user }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn login(&mut self, storage: &dyn KvStorage, user: User) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&user)?;
        storage.set(USER_KEY, &encoded)?;
        storage.set(AUTH_FLAG_KEY, AUTH_FLAG_SET)?;
        debug!(user_id = %user.id, "signed in");
        self.user = Some(user);
        Ok(())
    }

    /// Same effect as [`AuthStore::login`]; no collision check against any roster.
    pub fn register(&mut self, storage: &dyn KvStorage, user: User) -> Result<(), StoreError> {
        self.login(storage, user)
    }

    pub fn logout(&mut self, storage: &dyn KvStorage) -> Result<(), StoreError> {
        storage.remove(USER_KEY)?;
        storage.remove(AUTH_FLAG_KEY)?;
        debug!("signed out");
        self.user = None;
        Ok(())
    }
}
