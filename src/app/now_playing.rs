//! Now-playing snapshot kept up to date through the observer interface.

use std::cell::RefCell;

use crate::playback::{PlaybackObserver, TrackInfo};

/// What the status box shows about the current session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlayingState {
    pub track: Option<TrackInfo>,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

/// Observer that keeps a copy of the session for the UI to draw each frame.
#[derive(Debug, Default)]
pub struct NowPlaying {
    state: RefCell<NowPlayingState>,
}

impl NowPlaying {
    pub fn snapshot(&self) -> NowPlayingState {
        self.state.borrow().clone()
    }
}

impl PlaybackObserver for NowPlaying {
    fn on_track_changed(&self, track: &TrackInfo) {
        let mut s = self.state.borrow_mut();
        s.track = Some(track.clone());
        s.position_ms = 0;
        s.duration_ms = 0;
    }

    fn on_state_changed(&self, playing: bool) {
        self.state.borrow_mut().playing = playing;
    }

    fn on_progress(&self, position_ms: u64, duration_ms: u64) {
        let mut s = self.state.borrow_mut();
        s.position_ms = position_ms;
        s.duration_ms = duration_ms;
    }

    fn on_unloaded(&self) {
        *self.state.borrow_mut() = NowPlayingState::default();
    }
}
