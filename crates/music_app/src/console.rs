use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use music_engine::{FrameFormat, PlaybackRequest, SessionHandle};
use music_logging::{music_debug, music_info};

/// Stand-in voice session: speech goes to stdout, playback is queued in memory.
pub struct ConsoleSession {
    responding: AtomicBool,
    queue: Mutex<Vec<PlaybackRequest>>,
}

impl ConsoleSession {
    pub fn new() -> Self {
        Self {
            responding: AtomicBool::new(true),
            queue: Mutex::new(Vec::new()),
        }
    }

    pub fn is_responding(&self) -> bool {
        self.responding.load(Ordering::Relaxed)
    }

    /// Takes everything queued so far.
    pub fn drain_queue(&self) -> Vec<PlaybackRequest> {
        match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionHandle for ConsoleSession {
    async fn announce(&self, text: &str) {
        println!("[tts] {text}");
    }

    fn finish_response(&self) {
        self.responding.store(false, Ordering::Relaxed);
    }

    fn reset_text_cursors(&self) {
        music_debug!("text cursors reset");
    }

    fn enqueue_playback(&self, request: PlaybackRequest) {
        let kind = match request.format {
            FrameFormat::Opus => "opus".to_string(),
            FrameFormat::Pcm16 { sample_rate } => format!("pcm16@{sample_rate}Hz"),
        };
        music_info!(
            "queued {:?}: {} {} frames",
            request.title,
            request.frames.len(),
            kind
        );
        match self.queue.lock() {
            Ok(mut queue) => queue.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
    }
}
