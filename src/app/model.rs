//! Application model: the library browser state behind the TUI.

use std::path::{Path, PathBuf};

use crate::library::{AlbumQueue, Library, Track};
use crate::playback::{QueueProvider, TrackInfo};

/// Which list has keyboard focus.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Albums,
    Tracks,
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub pane: Pane,
    pub selected_album: usize,
    pub selected_track: usize,
    /// Track awaiting a `y` to confirm deletion.
    pub pending_delete: Option<PathBuf>,
    pub status: Option<String>,
    pub shuffle: bool,
    pub current_dir: Option<String>,
}

impl App {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            pane: Pane::Albums,
            selected_album: 0,
            selected_track: 0,
            pending_delete: None,
            status: None,
            shuffle: false,
            current_dir: None,
        }
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn switch_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Albums => Pane::Tracks,
            Pane::Tracks => Pane::Albums,
        };
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn album_tracks(&self) -> Vec<&Track> {
        self.library.album_tracks(self.selected_album)
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.album_tracks().get(self.selected_track).copied()
    }

    /// Move the cursor of the focused pane down, wrapping at the end.
    pub fn next(&mut self) {
        match self.pane {
            Pane::Albums => {
                let n = self.library.albums().len();
                if n > 0 {
                    self.selected_album = (self.selected_album + 1) % n;
                    self.selected_track = 0;
                }
            }
            Pane::Tracks => {
                let n = self.album_tracks().len();
                if n > 0 {
                    self.selected_track = (self.selected_track + 1) % n;
                }
            }
        }
    }

    /// Move the cursor of the focused pane up, wrapping at the start.
    pub fn prev(&mut self) {
        match self.pane {
            Pane::Albums => {
                let n = self.library.albums().len();
                if n > 0 {
                    self.selected_album = (self.selected_album + n - 1) % n;
                    self.selected_track = 0;
                }
            }
            Pane::Tracks => {
                let n = self.album_tracks().len();
                if n > 0 {
                    self.selected_track = (self.selected_track + n - 1) % n;
                }
            }
        }
    }

    /// Queue for the selected album plus the track to start with.
    ///
    /// From the albums pane playback starts at the head of the album (or of the
    /// shuffled order); from the tracks pane it starts at the cursor.
    pub fn play_selection(&self) -> Option<(AlbumQueue, TrackInfo)> {
        let tracks: Vec<TrackInfo> = self.album_tracks().iter().map(|t| t.info()).collect();
        if tracks.is_empty() {
            return None;
        }
        let start = match self.pane {
            Pane::Tracks => self.selected_track().map(|t| t.info()),
            Pane::Albums => None,
        };

        let queue = if self.shuffle {
            AlbumQueue::shuffled(tracks, start.as_ref().map(|t| t.path.as_path()))
        } else {
            AlbumQueue::new(tracks)
        };
        // With no current track the queue yields its head.
        let first = start.or_else(|| queue.next_track(None))?;
        Some((queue, first))
    }

    /// Point both cursors at `path`, if it is in the library.
    pub fn follow(&mut self, path: &Path) {
        for (ai, album) in self.library.albums().iter().enumerate() {
            let pos = album
                .tracks
                .iter()
                .position(|&i| self.library.tracks().get(i).is_some_and(|t| t.path == path));
            if let Some(ti) = pos {
                self.selected_album = ai;
                self.selected_track = ti;
                return;
            }
        }
    }

    /// Ask for confirmation before deleting the track under the cursor.
    pub fn request_delete(&mut self) -> bool {
        if self.pane != Pane::Tracks {
            return false;
        }
        self.pending_delete = self.selected_track().map(|t| t.path.clone());
        self.pending_delete.is_some()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Keep both cursors inside the library after it shrank.
    pub fn clamp_selection(&mut self) {
        let albums = self.library.albums().len();
        if albums == 0 {
            self.selected_album = 0;
            self.selected_track = 0;
            self.pane = Pane::Albums;
            return;
        }
        self.selected_album = self.selected_album.min(albums - 1);
        let tracks = self.album_tracks().len();
        self.selected_track = self.selected_track.min(tracks.saturating_sub(1));
    }
}
