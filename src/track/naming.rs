use std::path::{self, Path, PathBuf};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Replace every path separator in `value` with a space.
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if path::is_separator(c) { ' ' } else { c })
        .collect()
}

/// Sanitize `value` for use as a directory name, falling back to `fallback`
/// when nothing usable is left (empty, `.` or `..`).
pub fn directory_component(value: Option<&str>, fallback: &str) -> String {
    let cleaned = value.map(sanitize_component).unwrap_or_default();
    match cleaned.trim() {
        "" | "." | ".." => fallback.to_string(),
        _ => cleaned,
    }
}

/// Join a list of names into one display string ("X, Y").
pub fn join_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Two-digit prefix for the file name; negative numbers are treated as 0.
pub fn track_number_prefix(track_number: i32) -> String {
    format!("{:02}", track_number.max(0))
}

/// `<NN> <title> - <artist>.<ext>`
pub fn file_name(track_number: i32, title: &str, artist: &str, extension: &str) -> String {
    format!(
        "{} {} - {}.{}",
        track_number_prefix(track_number),
        title,
        artist,
        extension
    )
}

/// `<albumArtist>/<album>/<file name>`, relative to a music root.
pub fn relative_path(album_artist: &str, album: &str, file_name: &str) -> PathBuf {
    Path::new(album_artist).join(album).join(file_name)
}
