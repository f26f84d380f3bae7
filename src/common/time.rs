//! Time utilities.
//!
//! Timestamps cross the domain boundary as explicit `Timestamp` values in
//! Unix milliseconds (UTC); only the call sites at the edges read the wall
//! clock.

use chrono::Utc;

/// Get current Unix timestamp in milliseconds (UTC)
pub fn get_unix_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}
