//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the pipeline core and an
//! external collaborator (file access, time, artifact delivery).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod file_source;
pub mod presenter;

pub use clock::{Clock, FixedClock};
pub use file_source::{join_path, DirEntry, EntryKind, FileSource, FileStat, ReadFuture};
pub use presenter::Presenter;
