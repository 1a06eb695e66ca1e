use std::sync::mpsc;

use music_logging::{music_debug, music_info, music_warn};

use crate::{MusicEvent, RequestId, Stage, StageProgress};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: MusicEvent);
}

pub(crate) fn emit_stage(sink: &dyn EventSink, request_id: RequestId, stage: Stage, bytes: Option<u64>) {
    sink.emit(MusicEvent::Progress(StageProgress {
        request_id,
        stage,
        bytes,
    }));
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<MusicEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<MusicEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: MusicEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes completion events to the log; progress only at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: MusicEvent) {
        match event {
            MusicEvent::Progress(progress) => {
                music_debug!(
                    "request {} stage {:?} bytes {:?}",
                    progress.request_id,
                    progress.stage,
                    progress.bytes
                );
            }
            MusicEvent::CommandCompleted {
                request_id,
                result: Ok(track),
            } => {
                music_info!("request {} playing {:?}", request_id, track.title);
            }
            MusicEvent::CommandCompleted {
                request_id,
                result: Err(kind),
            } => {
                music_warn!("request {} accepted but failed: {}", request_id, kind);
            }
        }
    }
}
