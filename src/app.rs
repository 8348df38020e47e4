//! Application module: the browser model used by the TUI and runtime.
//!
//! `App` holds the library and cursor state; `NowPlaying` mirrors the
//! playback session through the observer interface.

mod model;
mod now_playing;

pub use model::*;
pub use now_playing::{NowPlaying, NowPlayingState};
