#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use music_engine::{PlaybackRequest, SessionHandle};
use tokio_util::sync::CancellationToken;

/// What a session saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Announce(String),
    Finish,
    ResetCursors,
    Enqueue { title: String, frames: usize },
}

#[derive(Default)]
pub struct RecordingSession {
    calls: Mutex<Vec<Call>>,
    queue: Mutex<Vec<PlaybackRequest>>,
    cancel_on_announce: Option<CancellationToken>,
}

impl RecordingSession {
    /// A session whose user interrupts while the announcement is spoken.
    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_announce: Some(token),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queued(&self) -> Vec<PlaybackRequest> {
        self.queue.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SessionHandle for RecordingSession {
    async fn announce(&self, text: &str) {
        self.calls.lock().unwrap().push(Call::Announce(text.to_string()));
        if let Some(token) = &self.cancel_on_announce {
            token.cancel();
            tokio::task::yield_now().await;
        }
    }

    fn finish_response(&self) {
        self.calls.lock().unwrap().push(Call::Finish);
    }

    fn reset_text_cursors(&self) {
        self.calls.lock().unwrap().push(Call::ResetCursors);
    }

    fn enqueue_playback(&self, request: PlaybackRequest) {
        self.calls.lock().unwrap().push(Call::Enqueue {
            title: request.title.clone(),
            frames: request.frames.len(),
        });
        self.queue.lock().unwrap().push(request);
    }
}

/// Packet container holding `count` small opus-sized payloads.
pub fn packet_file_bytes(count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..count {
        let payload = vec![i as u8; 40];
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        out.extend_from_slice(&payload);
    }
    out
}

/// Canonical 16-bit PCM WAV of a sawtooth.
pub fn wav_bytes(sample_rate: u32, channels: u16, frames: u32) -> Vec<u8> {
    let block_align = channels * 2;
    let data_len = frames * block_align as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..frames {
        let sample = ((i % 200) as i16 - 100) * 100;
        for _ in 0..channels {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
    out
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}
