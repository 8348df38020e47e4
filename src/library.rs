//! Music library: directory scanning, album grouping and track deletion.
//!
//! The library is the desktop stand-in for a system media index. It is
//! rebuilt from disk on start and only mutated by deletions.

mod artwork;
mod display;
mod error;
mod index;
mod model;
mod queue;
mod scan;

pub use error::LibraryError;
pub use index::Library;
pub use model::{Album, Track};
pub use queue::AlbumQueue;
pub use scan::scan;
