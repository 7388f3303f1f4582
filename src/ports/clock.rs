//! Clock port for stamping generated artifacts.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Artifacts embed a generation timestamp; a fixed or recorded clock keeps
/// rendered output byte-stable in tests and cassette replays.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
