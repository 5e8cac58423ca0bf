use std::time::{SystemTime, UNIX_EPOCH};

/// Format a unix timestamp (seconds) relative to `now` as "2d ago", "3h ago",
/// "15m ago" or "just now".
pub fn format_age(timestamp: i64, now: i64) -> String {
    // Clock skew can put items slightly in the future
    let delta = now.saturating_sub(timestamp).max(0);
    match (delta / 86_400, delta / 3_600, delta / 60) {
        (days, _, _) if days > 0 => format!("{days}d ago"),
        (_, hours, _) if hours > 0 => format!("{hours}h ago"),
        (_, _, minutes) if minutes > 0 => format!("{minutes}m ago"),
        _ => "just now".to_string(),
    }
}

/// Seconds since the unix epoch; 0 if the clock is set before it.
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now.as_secs() as i64)
        .unwrap_or(0)
}
