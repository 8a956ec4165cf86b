//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for rate limiting and event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Seconds elapsed between `since` and `at`, negative if `since` is later.
#[must_use]
pub fn seconds_between(since: Timestamp, at: Timestamp) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = (at - since).num_milliseconds() as f64;
    millis / 1000.0
}
