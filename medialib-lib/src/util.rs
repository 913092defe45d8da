/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parent of a normalized relative path: `"Pictures/Holiday/"` → `"Pictures/"`.
///
/// A single-segment path has no parent.
pub fn parent_relative_path(normalized: &str) -> Option<&str> {
    let body = normalized.strip_suffix('/').unwrap_or(normalized);
    let (parent, _) = body.rsplit_once('/')?;
    Some(&normalized[..parent.len() + 1])
}
