use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// Offset used to render publish times when nothing else is configured. The
/// supported platforms are all CN sites, so their embedded timestamps are
/// conventionally shown in UTC+8.
pub fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// Render a Unix-seconds timestamp as `YYYY-MM-DD HH:MM` in the given offset.
/// Out-of-range values yield the empty string (treated as "not found").
pub fn format_unix_seconds(secs: i64, offset: FixedOffset) -> String {
    match Utc.timestamp_opt(secs, 0) {
        chrono::LocalResult::Single(dt) => format_local(dt, offset),
        _ => String::new(),
    }
}

/// Same as [`format_unix_seconds`] for millisecond timestamps (douyin note
/// records and 13-digit `create_time` fields carry milliseconds).
pub fn format_unix_millis(millis: i64, offset: FixedOffset) -> String {
    match Utc.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => format_local(dt, offset),
        _ => String::new(),
    }
}

fn format_local(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}
