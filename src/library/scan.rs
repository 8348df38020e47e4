use std::path::Path;
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::artwork::ArtworkCache;
use super::display::display_from_fields;
use super::model::Track;

/// Lowercased extensions without the leading dot.
fn wanted_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn has_extension(path: &Path, wanted: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    wanted.iter().any(|w| w.eq_ignore_ascii_case(ext))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read a single audio file into a `Track`. Untagged or unreadable files
/// still produce a track titled after the file stem.
fn read_track(path: &Path, settings: &LibrarySettings, artwork: &mut ArtworkCache) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist: Option<String> = None;
    let mut album: Option<String> = None;
    let mut track_number: Option<u32> = None;
    let mut duration: Option<Duration> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = non_empty(tag.title()) {
                    title = v;
                }
                artist = non_empty(tag.artist());
                album = non_empty(tag.album());
                track_number = tag.track();
            }
        }
        Err(e) => log::debug!("no tags for {}: {e}", path.display()),
    }

    let display = display_from_fields(
        path,
        &title,
        artist.as_deref(),
        album.as_deref(),
        &settings.display_fields,
        &settings.display_separator,
    );

    Track {
        path: path.to_path_buf(),
        title,
        artist,
        album,
        track_number,
        duration,
        artwork: artwork.lookup(path, &settings.artwork_names),
        display,
    }
}

/// Walk `dir` and read every audio file under it, sorted by display text.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let wanted = wanted_extensions(settings);
    let mut artwork = ArtworkCache::default();

    // Non-recursive means the root directory only.
    let depth_cap = match settings.recursive {
        true => settings.max_depth,
        false => Some(1),
    };
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut tracks: Vec<Track> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && has_extension(e.path(), &wanted))
        .map(|e| read_track(e.path(), settings, &mut artwork))
        .collect();

    log::info!("scanned {} tracks under {}", tracks.len(), dir.display());
    tracks.sort_by_cached_key(|t| t.display.to_lowercase());
    tracks
}
