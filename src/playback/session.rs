//! Session state: what is loaded and where the transport is.
//!
//! The session holds at most one `LoadedTrack`. Transport fields only exist
//! inside it, so "playing with nothing loaded" cannot be represented.

use std::path::{Path, PathBuf};

/// Metadata describing the track bound to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Locator of the audio source.
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    /// Optional cover art reference (image file next to the track).
    pub artwork: Option<PathBuf>,
}

impl TrackInfo {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            artist: None,
            artwork: None,
        }
    }

    #[cfg(test)]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[cfg(test)]
    pub fn with_artwork(mut self, artwork: impl Into<PathBuf>) -> Self {
        self.artwork = Some(artwork.into());
        self
    }

    pub fn is_at(&self, path: &Path) -> bool {
        self.path == path
    }
}

/// A track bound to the session together with its transport state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTrack {
    pub info: TrackInfo,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSession {
    loaded: Option<LoadedTrack>,
}

impl PlaybackSession {
    pub fn loaded(&self) -> Option<&LoadedTrack> {
        self.loaded.as_ref()
    }

    pub(super) fn loaded_mut(&mut self) -> Option<&mut LoadedTrack> {
        self.loaded.as_mut()
    }

    pub fn track(&self) -> Option<&TrackInfo> {
        self.loaded.as_ref().map(|l| &l.info)
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_none()
    }

    pub fn is_playing(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.playing)
    }

    /// `(position_ms, duration_ms)` of the loaded track.
    pub fn progress(&self) -> Option<(u64, u64)> {
        self.loaded
            .as_ref()
            .map(|l| (l.position_ms, l.duration_ms))
    }

    /// Overwrite the session in place with a freshly started track.
    pub(super) fn replace(&mut self, info: TrackInfo, duration_ms: u64) {
        self.loaded = Some(LoadedTrack {
            info,
            playing: true,
            position_ms: 0,
            duration_ms,
        });
    }

    pub(super) fn clear(&mut self) {
        self.loaded = None;
    }
}
