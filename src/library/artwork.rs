use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Return the first of `names` that exists as a file inside `dir`.
///
/// Names are matched exactly first, then case-insensitively against the
/// directory listing (`Cover.JPG` is common on FAT-formatted players).
pub fn find_artwork(dir: &Path, names: &[String]) -> Option<PathBuf> {
    for name in names {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();

    names.iter().find_map(|name| {
        entries
            .iter()
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .cloned()
    })
}

/// Memoizes `find_artwork` per directory for the duration of a scan.
#[derive(Default)]
pub struct ArtworkCache {
    by_dir: HashMap<PathBuf, Option<PathBuf>>,
}

impl ArtworkCache {
    pub fn lookup(&mut self, track_path: &Path, names: &[String]) -> Option<PathBuf> {
        let dir = track_path.parent()?;
        self.by_dir
            .entry(dir.to_path_buf())
            .or_insert_with(|| find_artwork(dir, names))
            .clone()
    }
}
