use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    MatchingLocal,
    Resolving,
    Downloading,
    Decoding,
    Dispatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgress {
    pub request_id: RequestId,
    pub stage: Stage,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MusicEvent {
    Progress(StageProgress),
    CommandCompleted {
        request_id: RequestId,
        result: Result<PlayedTrack, FailureKind>,
    },
}

/// A song name resolved to a playable stream by one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterResult {
    pub title: String,
    pub url: String,
    /// The stream answered with an `audio/*` content type.
    pub verified_audio: bool,
}

/// A downloaded network track, fully written and renamed into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
    pub path: PathBuf,
    pub bytes: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Pre-encoded opus packets read from a packet container.
    Opus,
    /// Mono 16-bit little-endian PCM.
    Pcm16 { sample_rate: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub frames: Vec<Vec<u8>>,
    pub format: FrameFormat,
    pub duration: Duration,
}

/// Handed to the playback queue; owned by the consumer afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub frames: Vec<Vec<u8>>,
    pub format: FrameFormat,
    pub title: String,
    pub start_offset: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    Local,
    Network { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedTrack {
    pub title: String,
    pub path: PathBuf,
    pub source: TrackSource,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CatalogUnavailable,
    NoMatch,
    AdapterFailure,
    DownloadFailure,
    DecodeFailure,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::CatalogUnavailable => write!(f, "catalog unavailable"),
            FailureKind::NoMatch => write!(f, "no match"),
            FailureKind::AdapterFailure => write!(f, "no backend resolved the song"),
            FailureKind::DownloadFailure => write!(f, "download failed"),
            FailureKind::DecodeFailure => write!(f, "decode failed"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one command. Only `NotHandled` lets another handler take the text.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    NotHandled,
    Played(PlayedTrack),
    /// The command was accepted but resolution failed; silent for the user.
    Failed(FailureKind),
}

impl CommandOutcome {
    pub fn handled(&self) -> bool {
        !matches!(self, CommandOutcome::NotHandled)
    }
}
