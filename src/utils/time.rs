use chrono::Utc;

/// Current time as Unix epoch milliseconds, matching the unit the login
/// cache is persisted with.
pub fn now_unix_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
