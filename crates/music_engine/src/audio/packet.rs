use std::fs;
use std::path::Path;

use super::{AudioDecoder, DecodeError, FRAME_DURATION};
use crate::{DecodedAudio, FrameFormat};

const HEADER_LEN: usize = 4;

/// Reads the packet container: repeated `[type u8][reserved u8][len u16 BE][payload]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PacketFileDecoder;

impl AudioDecoder for PacketFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, DecodeError> {
        let bytes = fs::read(path)?;
        let frames = decode_packets(&bytes)?;
        if frames.is_empty() {
            return Err(DecodeError::Empty);
        }
        let duration = FRAME_DURATION * frames.len() as u32;
        Ok(DecodedAudio {
            frames,
            format: FrameFormat::Opus,
            duration,
        })
    }
}

/// Splits container bytes into packet payloads; a short header or payload is an error.
pub fn decode_packets(bytes: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let header = bytes
            .get(offset..offset + HEADER_LEN)
            .ok_or(DecodeError::Truncated { offset })?;
        let len = u16::from_be_bytes([header[2], header[3]]) as usize;
        let start = offset + HEADER_LEN;
        let payload = bytes
            .get(start..start + len)
            .ok_or(DecodeError::Truncated { offset })?;
        frames.push(payload.to_vec());
        offset = start + len;
    }
    Ok(frames)
}
