use chrono::{TimeZone, Utc};
use tokio::time::Instant;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Renders an epoch-milliseconds timestamp, `None` when out of chrono's range.
pub fn ms_to_rfc3339(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|date_time| date_time.to_rfc3339())
}

pub fn get_instant() -> Instant {
    Instant::now()
}
