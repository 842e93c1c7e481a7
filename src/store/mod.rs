pub mod attendance;
pub mod auth;
pub mod students;
pub mod users;

mod error;

pub use attendance::AttendanceStore;
pub use auth::AuthStore;
pub use error::StoreError;
pub use students::StudentStore;
pub use users::UserStore;

use crate::db::KvStorage;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Reads a JSON value from storage. Absent, unreadable, or malformed values read as `None`.
pub(crate) fn read_json<T: DeserializeOwned>(storage: &dyn KvStorage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted value");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed persisted value");
            None
        }
    }
}
