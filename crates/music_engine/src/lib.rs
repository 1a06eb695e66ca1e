//! Music engine: catalog, network resolution, download and playback dispatch.
mod adapters;
mod audio;
mod catalog_store;
mod charset;
mod config;
mod dispatch;
mod download;
mod events;
mod extract;
mod filename;
mod http;
mod persist;
mod router;
mod scan;
mod types;

pub use adapters::{AdapterChain, AdapterError, DetailPageAdapter, FormSearchAdapter, SongAdapter};
pub use audio::{
    decode_packets, is_packet_file, AudioDecoder, DecodeError, PacketFileDecoder,
    SymphoniaTranscoder, FRAME_DURATION, PACKET_EXTENSION,
};
pub use catalog_store::CatalogStore;
pub use charset::{decode_page, CharsetError};
pub use config::{BackendConfig, BackendKind, ConfigError, HttpConfig, MusicConfig};
pub use dispatch::{PlaybackDispatcher, SessionHandle};
pub use download::{AssetDownloader, DownloadError, HttpDownloader};
pub use events::{ChannelEventSink, EventSink, LogEventSink};
pub use extract::{extract_play_id, find_marked_anchor, DOWNLOAD_MARKER};
pub use filename::cache_filename;
pub use http::{is_audio_content_type, HttpClient, HttpError, HttpSettings};
pub use persist::{ensure_cache_dir, PersistError, StagedFile};
pub use router::MusicCommandRouter;
pub use scan::{normalize_extensions, scan_catalog};
pub use types::{
    AdapterResult, CachedAsset, CommandOutcome, DecodedAudio, FailureKind, FrameFormat,
    MusicEvent, PlaybackRequest, PlayedTrack, RequestId, Stage, StageProgress, TrackSource,
};
