//! Request payloads and their validation, one module per area of the store.
//!
//! # Modules
//!
//! - [`users`]: registration, login, profiles and admin user management
//! - [`records`]: daily health measurements
//! - [`care`]: medications, goals, reminders and diet logs
//! - [`notifications`]: admin-to-user messages

pub mod care;
pub mod notifications;
pub mod records;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ServerError, ServerResult};

/// Decode an action payload. A missing payload is treated as an empty object.
pub fn parse_payload<T: DeserializeOwned>(payload: Value) -> ServerResult<T> {
    let payload = if payload.is_null() {
        Value::Object(Default::default())
    } else {
        payload
    };
    serde_json::from_value(payload)
        .map_err(|e| ServerError::Validation(format!("invalid payload: {e}")))
}

/// Normalize a calendar date to `YYYY-MM-DD`.
///
/// Accepts:
/// - YYYY-MM-DD
/// - RFC3339 datetime (local date part is kept)
/// - Naive datetime YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD HH:MM:SS
pub fn normalize_date(s: &str) -> Option<String> {
    let s = s.trim();
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().format("%Y-%m-%d").to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.format("%Y-%m-%d").to_string());
        }
    }
    None
}

pub(crate) fn require_date(field: &str, value: &str) -> ServerResult<String> {
    normalize_date(value)
        .ok_or_else(|| ServerError::Validation(format!("{field} must be a YYYY-MM-DD date: {value}")))
}

pub(crate) fn require_text(field: &str, value: &str) -> ServerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServerError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Current local time in the `YYYY-MM-DD HH:MM:SS` form used for `created_at`.
pub(crate) fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
