use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::http::HttpSettings;

/// Music handler settings, normally read from the host configuration.
///
/// Every field has a default, so a partial document is enough.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub music_dir: PathBuf,
    pub music_cache_dir: PathBuf,
    /// Generic phrases that request music without naming a song.
    pub music_commands: Vec<String>,
    /// Allowed catalog extensions, with or without the leading dot.
    pub music_ext: Vec<String>,
    /// Catalog refresh interval in seconds.
    pub refresh_time: u64,
    /// Priority-ordered keywords that introduce a song name.
    pub hint_keywords: Vec<String>,
    /// Titles picked at random for generic requests.
    pub fallback_playlist: Vec<String>,
    /// `{title}` is replaced with the song title.
    pub announce_template: String,
    /// Search backends, tried in order.
    pub backends: Vec<BackendConfig>,
    pub verify_audio_content_type: bool,
    pub http: HttpConfig,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            music_dir: PathBuf::from("./music"),
            music_cache_dir: PathBuf::from("./music/cache"),
            music_commands: strings(&[
                "来一首歌",
                "唱一首歌",
                "播放音乐",
                "来点音乐",
                "背景音乐",
                "放首歌",
                "播放歌曲",
                "来点背景音乐",
                "我想听歌",
                "我要听歌",
                "放点音乐",
            ]),
            music_ext: strings(&[".mp3", ".wav", ".p3"]),
            refresh_time: 60,
            hint_keywords: strings(&["听", "播放", "放", "唱"]),
            fallback_playlist: strings(&[
                "卜卦",
                "土坡上的狗尾草",
                "没关系",
                "一点",
                "越来越不懂",
                "特别的人",
                "唯一",
                "舍得",
                "平凡日子里的挣扎",
            ]),
            announce_template: "正在播放{title}".to_string(),
            backends: vec![
                BackendConfig {
                    kind: BackendKind::FormSearch,
                    base_url: "https://y.0msl.com/".to_string(),
                },
                BackendConfig {
                    kind: BackendKind::DetailPage,
                    base_url: "https://www.gequbao.com".to_string(),
                },
            ],
            verify_audio_content_type: true,
            http: HttpConfig::default(),
        }
    }
}

impl MusicConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_time)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_time == 0 {
            return Err(ConfigError::Invalid(
                "refresh_time must be greater than zero".into(),
            ));
        }
        if self.music_ext.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
            return Err(ConfigError::Invalid("music_ext lists no extension".into()));
        }
        if self.fallback_playlist.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid("fallback_playlist is empty".into()));
        }
        for backend in &self.backends {
            url::Url::parse(&backend.base_url).map_err(|err| {
                ConfigError::Invalid(format!("backend url {}: {err}", backend.base_url))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BackendKind {
    /// Form POST search answering with a JSON candidate list.
    FormSearch,
    /// HTML search page, detail page, then a play-url endpoint.
    DetailPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Whole-request deadline; unset means none, callers cancel instead.
    pub request_timeout_secs: Option<u64>,
    pub redirect_limit: usize,
    pub max_page_bytes: u64,
    pub max_download_bytes: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            redirect_limit: 5,
            max_page_bytes: 2 * 1024 * 1024,
            max_download_bytes: 64 * 1024 * 1024,
            user_agent: concat!("music_engine/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn to_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            redirect_limit: self.redirect_limit,
            max_page_bytes: self.max_page_bytes,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
