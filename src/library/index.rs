use std::collections::HashMap;
use std::io;
use std::path::Path;

use super::error::LibraryError;
use super::model::{Album, Track};

pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Tracks plus their album grouping.
#[derive(Debug, Clone, Default)]
pub struct Library {
    tracks: Vec<Track>,
    albums: Vec<Album>,
}

impl Library {
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let albums = group_albums(&tracks);
        Self { tracks, albums }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks of the album at `album`, in album order.
    pub fn album_tracks(&self, album: usize) -> Vec<&Track> {
        self.albums
            .get(album)
            .map(|a| a.tracks.iter().filter_map(|&i| self.tracks.get(i)).collect())
            .unwrap_or_default()
    }

    pub fn track_by_path(&self, path: &Path) -> Option<&Track> {
        self.tracks.iter().find(|t| t.path == path)
    }

    /// Delete `path` from disk and from the index.
    ///
    /// A file that is already gone from disk is still dropped from the index.
    /// Any other I/O failure leaves both untouched.
    pub fn delete_track(&mut self, path: &Path) -> Result<Track, LibraryError> {
        if self.track_by_path(path).is_none() {
            return Err(LibraryError::NotFound(path.to_path_buf()));
        }

        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("{} was already gone from disk", path.display());
            }
            Err(source) => {
                return Err(LibraryError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        self.remove_track(path)
            .ok_or_else(|| LibraryError::NotFound(path.to_path_buf()))
    }

    /// Drop `path` from the index only and regroup albums.
    pub fn remove_track(&mut self, path: &Path) -> Option<Track> {
        let idx = self.tracks.iter().position(|t| t.path == path)?;
        let removed = self.tracks.remove(idx);
        self.albums = group_albums(&self.tracks);
        Some(removed)
    }
}

fn album_key(track: &Track) -> String {
    track
        .album
        .as_deref()
        .unwrap_or(UNKNOWN_ALBUM)
        .to_lowercase()
}

fn group_albums(tracks: &[Track]) -> Vec<Album> {
    let mut albums: Vec<Album> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (i, track) in tracks.iter().enumerate() {
        let slot = *by_key.entry(album_key(track)).or_insert_with(|| {
            albums.push(Album {
                title: track.album.clone().unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
                artist: None,
                artwork: None,
                tracks: Vec::new(),
            });
            albums.len() - 1
        });

        let album = &mut albums[slot];
        album.tracks.push(i);
        if album.artist.is_none() {
            album.artist = track.artist.clone();
        }
        if album.artwork.is_none() {
            album.artwork = track.artwork.clone();
        }
    }

    for album in &mut albums {
        album.tracks.sort_by(|&a, &b| {
            let (ta, tb) = (&tracks[a], &tracks[b]);
            ta.track_number
                .unwrap_or(u32::MAX)
                .cmp(&tb.track_number.unwrap_or(u32::MAX))
                .then_with(|| ta.display.to_lowercase().cmp(&tb.display.to_lowercase()))
        });
    }
    albums.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    albums
}
