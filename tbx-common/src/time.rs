//! Timestamp utilities

use chrono::{DateTime, Local, Utc};

/// Format used for the `year` field of exported playlists
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a generation timestamp in local time
pub fn format_generated_at(at: DateTime<Local>) -> String {
    at.format(GENERATED_AT_FORMAT).to_string()
}

/// Convert whole seconds to duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}
