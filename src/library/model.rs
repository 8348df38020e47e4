use std::path::PathBuf;
use std::time::Duration;

use crate::playback::TrackInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub duration: Option<Duration>,
    pub artwork: Option<PathBuf>,
    pub display: String,
}

impl Track {
    /// Session metadata handed to the playback coordinator.
    pub fn info(&self) -> TrackInfo {
        TrackInfo {
            path: self.path.clone(),
            title: self.title.clone(),
            artist: self.artist.clone(),
            artwork: self.artwork.clone(),
        }
    }
}

/// Tracks sharing an album tag. `tracks` indexes into `Library::tracks`.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub title: String,
    pub artist: Option<String>,
    pub artwork: Option<PathBuf>,
    pub tracks: Vec<usize>,
}
