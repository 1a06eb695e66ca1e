//! Decoders that turn an audio file into playable frames.
mod packet;
mod transcode;

use std::io;
use std::path::Path;
use std::time::Duration;

pub use packet::{decode_packets, PacketFileDecoder};
pub use transcode::SymphoniaTranscoder;

use crate::DecodedAudio;

/// Extension of the pre-packetized container decoded without transcoding.
pub const PACKET_EXTENSION: &str = "p3";

/// Playback time covered by one frame.
pub const FRAME_DURATION: Duration = Duration::from_millis(60);

pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, DecodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("truncated packet at byte {offset}")]
    Truncated { offset: usize },
    #[error("no audio frames")]
    Empty,
    #[error("no decodable audio track")]
    NoTrack,
    #[error("codec error: {0}")]
    Codec(String),
    #[error("decoder task failed: {0}")]
    Task(String),
}

pub fn is_packet_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKET_EXTENSION))
}
