use std::fs;
use std::path::Path;

use anyhow::Context;
use music_engine::MusicConfig;
use music_logging::{music_info, music_warn};

pub const DEFAULT_CONFIG_PATH: &str = "./music.ron";

/// Reads a RON `MusicConfig`; fields left out keep their defaults.
///
/// A missing file means the built-in defaults. A file that exists but does not
/// parse or validate is an error rather than a silent fallback.
pub fn load_config(path: &Path) -> anyhow::Result<MusicConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            music_warn!("No config at {:?}, using defaults", path);
            return Ok(MusicConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };

    let config: MusicConfig =
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating config {}", path.display()))?;

    music_info!("Loaded music config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use music_engine::BackendKind;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, MusicConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music.ron");
        fs::write(
            &path,
            r#"(
                music_dir: "/srv/music",
                refresh_time: 300,
                backends: [
                    (kind: DetailPage, base_url: "https://mirror.example.com"),
                ],
            )"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.music_dir, PathBuf::from("/srv/music"));
        assert_eq!(config.refresh_time, 300);
        assert_eq!(config.backends.len(), 1);
        assert_eq!(config.backends[0].kind, BackendKind::DetailPage);
        assert_eq!(config.music_ext, MusicConfig::default().music_ext);
        assert_eq!(config.announce_template, "正在播放{title}");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music.ron");
        fs::write(&path, "(refresh_time: 0)").unwrap();
        assert!(load_config(&path).is_err());

        fs::write(&path, "(refresh_time: \"soon\")").unwrap();
        assert!(load_config(&path).is_err());
    }
}
