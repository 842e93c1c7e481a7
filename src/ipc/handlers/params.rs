use crate::ipc::error::HandlerErr;
use crate::model::parse_record_date;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Like [`get_required_str`], but blank input counts as missing.
pub fn get_non_empty_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let v = get_required_str(params, key)?;
    if v.trim().is_empty() {
        return Err(HandlerErr::bad_params(format!("{} must not be empty", key)));
    }
    Ok(v)
}

pub fn get_date(params: &serde_json::Value, key: &str) -> Result<NaiveDateTime, HandlerErr> {
    let raw = get_required_str(params, key)?;
    parse_record_date(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD or an ISO timestamp", key)))
}

pub fn get_object<T: DeserializeOwned>(params: &serde_json::Value, key: &str) -> Result<T, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    serde_json::from_value(v.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid {}: {}", key, e)))
}
