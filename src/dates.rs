use chrono::{DateTime, Utc};

const DAY_MS: i64 = 86_400_000;

/// Whole days `now` is past `due`, floored and clamped to zero.
///
/// This is the dispatch/banding convention: an invoice due later today is 0
/// days overdue, and so is one that is not due yet.
pub fn days_overdue(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let diff_ms = (now - due).num_milliseconds();
    diff_ms.div_euclid(DAY_MS).max(0)
}

/// Signed whole days from `from` until `to`, rounded up.
///
/// This is the display convention: any remaining fraction of a day counts as
/// a full day left, and the result goes negative once `to` has passed.
pub fn days_until(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let diff_ms = (to - from).num_milliseconds();
    -(-diff_ms).div_euclid(DAY_MS)
}
