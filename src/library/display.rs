use std::path::Path;

use crate::config::TrackDisplayField;

/// List label for a track: the configured `fields` joined by `sep`, skipping
/// blank ones. Falls back to `title` when every field is blank.
pub fn display_from_fields(
    path: &Path,
    title: &str,
    artist: Option<&str>,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|f| match f {
            TrackDisplayField::Title => Some(title.to_string()),
            TrackDisplayField::Artist => artist.map(str::to_string),
            TrackDisplayField::Album => album.map(str::to_string),
            TrackDisplayField::Filename => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            TrackDisplayField::Path => Some(path.display().to_string()),
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        title.to_string()
    } else {
        parts.join(sep)
    }
}
