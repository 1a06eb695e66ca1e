use std::path::{Path, PathBuf};

use music_logging::music_debug;
use walkdir::WalkDir;

/// Lowercase extensions without the leading dot; blanks dropped.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Recursively lists audio files under `root`, relative to it and sorted.
///
/// A missing root yields an empty list; unreadable subtrees are skipped.
pub fn scan_catalog(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    let allowed = normalize_extensions(extensions);

    let mut entries: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                music_debug!("skipping unreadable catalog path: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_allowed_extension(entry.path(), &allowed))
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();

    entries.sort();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_normalised() {
        let exts = vec![".MP3".to_string(), "wav".to_string(), " . ".to_string()];
        assert_eq!(normalize_extensions(&exts), vec!["mp3", "wav"]);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let allowed = vec!["mp3".to_string(), "p3".to_string()];
        assert!(has_allowed_extension(Path::new("a/晴天.MP3"), &allowed));
        assert!(has_allowed_extension(Path::new("x.p3"), &allowed));
        assert!(!has_allowed_extension(Path::new("x.mp4"), &allowed));
        assert!(!has_allowed_extension(Path::new("mp3"), &allowed));
    }
}
