use chrono::Utc;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

pub(crate) fn now() -> Timestamp {
    Utc::now().timestamp_millis()
}
