//! Clock port

use chrono::{DateTime, Utc};

/// Port for reading the current time.
///
/// Used to derive fresh field names; tests substitute a fixed clock.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch.
    fn epoch_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}
