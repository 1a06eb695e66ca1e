use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use music_logging::music_info;

use crate::audio::{is_packet_file, AudioDecoder, DecodeError, PacketFileDecoder, SymphoniaTranscoder};
use crate::{DecodedAudio, PlaybackRequest};

/// The voice session a command arrived on.
#[async_trait::async_trait]
pub trait SessionHandle: Send + Sync {
    /// Deliver a short text through text-to-speech.
    async fn announce(&self, text: &str);

    /// Stop further response generation for the current turn.
    fn finish_response(&self);

    /// Reset the per-turn text-streaming cursors.
    fn reset_text_cursors(&self);

    /// Push onto the FIFO playback queue.
    fn enqueue_playback(&self, request: PlaybackRequest);
}

/// Decodes a local file and hands it to the session's playback queue.
pub struct PlaybackDispatcher {
    packet_decoder: Arc<dyn AudioDecoder>,
    transcoder: Arc<dyn AudioDecoder>,
    announce_template: String,
}

impl PlaybackDispatcher {
    pub fn new(
        packet_decoder: Arc<dyn AudioDecoder>,
        transcoder: Arc<dyn AudioDecoder>,
        announce_template: impl Into<String>,
    ) -> Self {
        Self {
            packet_decoder,
            transcoder,
            announce_template: announce_template.into(),
        }
    }

    /// Packet container decoder plus the symphonia transcoder.
    pub fn with_default_decoders(announce_template: impl Into<String>) -> Self {
        Self::new(
            Arc::new(PacketFileDecoder),
            Arc::new(SymphoniaTranscoder),
            announce_template,
        )
    }

    pub fn announcement(&self, title: &str) -> String {
        self.announce_template.replace("{title}", title)
    }

    fn decoder_for(&self, path: &Path) -> Arc<dyn AudioDecoder> {
        if is_packet_file(path) {
            Arc::clone(&self.packet_decoder)
        } else {
            Arc::clone(&self.transcoder)
        }
    }

    /// Decode `path` off the async threads, then announce and enqueue it.
    ///
    /// Nothing reaches the session when decoding fails.
    pub async fn dispatch(
        &self,
        session: &dyn SessionHandle,
        path: &Path,
        title: &str,
    ) -> Result<Duration, DecodeError> {
        let decoded = self.decode(path).await?;
        Ok(self.deliver(session, decoded, title).await)
    }

    /// Decode on the blocking pool. Safe to abandon; the session is untouched.
    pub async fn decode(&self, path: &Path) -> Result<DecodedAudio, DecodeError> {
        let decoder = self.decoder_for(path);
        let owned = path.to_path_buf();
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&owned))
            .await
            .map_err(|err| DecodeError::Task(err.to_string()))??;
        if decoded.frames.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(decoded)
    }

    /// Announce, close the turn and enqueue. Runs to completion once started,
    /// so the session never sees an announcement without its playback.
    pub async fn deliver(
        &self,
        session: &dyn SessionHandle,
        decoded: DecodedAudio,
        title: &str,
    ) -> Duration {
        session.announce(&self.announcement(title)).await;
        session.finish_response();
        session.reset_text_cursors();
        music_info!(
            "enqueueing {:?}: {} frames, {:.1}s",
            title,
            decoded.frames.len(),
            decoded.duration.as_secs_f64()
        );
        session.enqueue_playback(PlaybackRequest {
            frames: decoded.frames,
            format: decoded.format,
            title: title.to_string(),
            start_offset: Duration::ZERO,
        });
        decoded.duration
    }
}
