//! Live adapters backed by the real filesystem, clock and stdout.

pub mod clock;
pub mod file_source;
pub mod presenter;

pub use clock::LiveClock;
pub use file_source::LiveFileSource;
pub use presenter::{FilePresenter, StdoutPresenter};
