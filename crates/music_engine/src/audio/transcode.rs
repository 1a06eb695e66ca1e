use std::fs::File;
use std::path::Path;
use std::time::Duration;

use music_logging::music_debug;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioDecoder, DecodeError, FRAME_DURATION};
use crate::{DecodedAudio, FrameFormat};

/// Decodes any waveform format symphonia knows into mono 16-bit PCM frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaTranscoder;

impl AudioDecoder for SymphoniaTranscoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, DecodeError> {
        let (samples, sample_rate) = decode_mono(path)?;
        if samples.is_empty() || sample_rate == 0 {
            return Err(DecodeError::Empty);
        }

        let per_frame = (sample_rate as u128 * FRAME_DURATION.as_millis() / 1000).max(1) as usize;
        let frames = samples
            .chunks(per_frame)
            .map(|chunk| chunk.iter().flat_map(|s| s.to_le_bytes()).collect())
            .collect();
        let duration = Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64);

        Ok(DecodedAudio {
            frames,
            format: FrameFormat::Pcm16 { sample_rate },
            duration,
        })
    }
}

fn codec(err: SymphoniaError) -> DecodeError {
    DecodeError::Codec(err.to_string())
}

fn decode_mono(path: &Path) -> Result<(Vec<i16>, u32), DecodeError> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(codec)?;
    let mut format = probed.format;
    let track = format.default_track().ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(codec)?;

    let mut mono: Vec<i16> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(codec(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let rate = *sample_rate.get_or_insert(spec.rate);
                if rate != spec.rate {
                    return Err(DecodeError::Codec(format!(
                        "sample rate changed from {rate} to {}",
                        spec.rate
                    )));
                }
                let channels = spec.channels.count().max(1);
                let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                for frame in buf.samples().chunks(channels) {
                    let sum: i32 = frame.iter().map(|s| *s as i32).sum();
                    mono.push((sum / frame.len() as i32) as i16);
                }
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                music_debug!("skipping corrupt packet in {:?}: {}", path, msg);
            }
            Err(e) => return Err(codec(e)),
        }
    }

    Ok((mono, sample_rate.unwrap_or(0)))
}
