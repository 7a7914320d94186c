//! Timestamp-based identifiers for records minted by this process.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_MINTED: AtomicI64 = AtomicI64::new(0);

/// Mint an identifier from the current time in milliseconds.
///
/// Successive calls are strictly increasing within the process. Identifiers
/// are only unique within the tier that stores them.
pub fn mint_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_MINTED
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(previous + 1)
}
