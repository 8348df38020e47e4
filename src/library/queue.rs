//! Album-backed navigation for the playback coordinator.

use std::path::Path;

use rand::seq::SliceRandom;

use crate::playback::{QueueProvider, TrackInfo};

/// Ordered track list for one album. Does not wrap at either end.
#[derive(Debug, Clone, Default)]
pub struct AlbumQueue {
    tracks: Vec<TrackInfo>,
}

impl AlbumQueue {
    pub fn new(tracks: Vec<TrackInfo>) -> Self {
        Self { tracks }
    }

    /// Random order, with `first` (when present in the list) moved to the front.
    pub fn shuffled(mut tracks: Vec<TrackInfo>, first: Option<&Path>) -> Self {
        tracks.shuffle(&mut rand::rng());
        if let Some(pos) = first.and_then(|p| tracks.iter().position(|t| t.is_at(p))) {
            let head = tracks.remove(pos);
            tracks.insert(0, head);
        }
        Self { tracks }
    }

    /// The same queue with `path` left out, for after it was deleted.
    pub fn without(&self, path: &Path) -> Self {
        Self {
            tracks: self.tracks.iter().filter(|t| !t.is_at(path)).cloned().collect(),
        }
    }

    #[cfg(test)]
    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    fn position_of(&self, current: Option<&TrackInfo>) -> Option<usize> {
        let current = current?;
        self.tracks.iter().position(|t| t.is_at(&current.path))
    }
}

impl QueueProvider for AlbumQueue {
    /// With nothing playing (or a track from elsewhere) the queue starts at its head.
    fn next_track(&self, current: Option<&TrackInfo>) -> Option<TrackInfo> {
        match self.position_of(current) {
            Some(pos) => self.tracks.get(pos + 1).cloned(),
            None => self.tracks.first().cloned(),
        }
    }

    fn previous_track(&self, current: Option<&TrackInfo>) -> Option<TrackInfo> {
        let pos = self.position_of(current)?;
        pos.checked_sub(1).and_then(|p| self.tracks.get(p).cloned())
    }
}
