//! Replaying adapters that serve recorded interactions.

pub mod clock;
pub mod file_source;

pub use clock::ReplayingClock;
pub use file_source::ReplayingFileSource;
