//! Speech PCM codec.
//!
//! The speech-synthesis collaborator returns base64-encoded, little-endian, 16-bit mono PCM at
//! 24 kHz. This module turns that payload into sample sets and canonical 44-byte-header WAV
//! containers that standard players and decoders accept.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};

use crate::foundation::error::{DubframeError, DubframeResult};

/// Sample rate of every speech payload produced by the synthesis collaborator.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
/// Channel count of speech payloads.
pub const SPEECH_CHANNELS: u16 = 1;
/// Bit depth of speech payloads.
pub const SPEECH_BITS_PER_SAMPLE: u16 = 16;

/// Size of the canonical RIFF/WAVE/fmt/data header.
pub const WAV_HEADER_LEN: usize = 44;
/// MIME type used when offering a WAV container for download.
pub const WAV_MIME: &str = "audio/wav";

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const FMT: &[u8; 4] = b"fmt ";
const DATA: &[u8; 4] = b"data";
const PCM_FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Decode standard (padded) base64 into raw bytes.
pub fn decode_base64(input: &str) -> DubframeResult<Vec<u8>> {
    general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| DubframeError::input(format!("malformed base64 audio: {e}")))
}

/// Immutable set of interleaved signed 16-bit samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioSamples {
    samples: Arc<[i16]>,
    channels: u16,
    sample_rate: u32,
}

impl AudioSamples {
    /// Wrap interleaved samples.
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> DubframeResult<Self> {
        if channels == 0 {
            return Err(DubframeError::validation("audio channels must be > 0"));
        }
        if sample_rate == 0 {
            return Err(DubframeError::validation("audio sample_rate must be > 0"));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(DubframeError::validation(
                "sample count must be a multiple of the channel count",
            ));
        }
        Ok(Self {
            samples: samples.into(),
            channels,
            sample_rate,
        })
    }

    /// Reinterpret little-endian 16-bit PCM bytes as samples.
    pub fn from_pcm16le(bytes: &[u8], channels: u16, sample_rate: u32) -> DubframeResult<Self> {
        if bytes.len() % 2 != 0 {
            return Err(DubframeError::input(format!(
                "pcm16 payload has odd byte length {}",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Self::new(samples, channels, sample_rate)
    }

    /// Decode a base64 speech payload (mono, 24 kHz, 16-bit).
    pub fn from_speech_base64(payload: &str) -> DubframeResult<Self> {
        let bytes = decode_base64(payload)?;
        Self::from_pcm16le(&bytes, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE)
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Return `true` when there is no audio at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    /// Interleaved samples scaled to `[-1, 1)`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|&s| f32::from(s) / 32768.0)
            .collect()
    }
}

/// Write the canonical 44-byte WAV/PCM header followed by little-endian samples.
///
/// Chunk ids are written as ASCII; every numeric field is little-endian.
pub fn encode_wav(
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
) -> DubframeResult<Vec<u8>> {
    if bits_per_sample != 16 {
        return Err(DubframeError::validation(format!(
            "only 16-bit PCM is supported, got {bits_per_sample} bits"
        )));
    }
    if channels == 0 || sample_rate == 0 {
        return Err(DubframeError::validation(
            "wav channels and sample_rate must be > 0",
        ));
    }

    let bytes_per_sample = u32::from(bits_per_sample / 8);
    let data_size = u32::try_from(samples.len())
        .ok()
        .and_then(|n| n.checked_mul(bytes_per_sample))
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| DubframeError::validation("pcm payload too large for a wav container"))?;
    let byte_rate = sample_rate
        .checked_mul(u32::from(channels) * bytes_per_sample)
        .ok_or_else(|| DubframeError::validation("wav byte rate overflows u32"))?;
    let block_align = channels
        .checked_mul(bits_per_sample / 8)
        .ok_or_else(|| DubframeError::validation("wav block align overflows u16"))?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);
    out.extend_from_slice(RIFF);
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(WAVE);
    out.extend_from_slice(FMT);
    out.extend_from_slice(&PCM_FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(DATA);
    out.extend_from_slice(&data_size.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    Ok(out)
}

/// Fields read back from a canonical WAV header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavHeader {
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bytes per second.
    pub byte_rate: u32,
    /// Bytes per sample frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Length of the `data` chunk payload in bytes.
    pub data_size: u32,
}

/// Immutable, playable WAV container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WavContainer {
    bytes: Arc<[u8]>,
    header: WavHeader,
}

impl WavContainer {
    /// Encode a sample set into a container.
    pub fn from_samples(samples: &AudioSamples) -> DubframeResult<Self> {
        let bytes = encode_wav(
            samples.samples(),
            samples.channels(),
            samples.sample_rate(),
            SPEECH_BITS_PER_SAMPLE,
        )?;
        Self::parse(bytes)
    }

    /// Build a container straight from a base64 speech payload.
    pub fn from_speech_base64(payload: &str) -> DubframeResult<Self> {
        Self::from_samples(&AudioSamples::from_speech_base64(payload)?)
    }

    /// Validate and wrap canonical 16-bit PCM WAV bytes.
    pub fn parse(bytes: Vec<u8>) -> DubframeResult<Self> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(DubframeError::input("wav data is shorter than its header"));
        }
        if &bytes[0..4] != RIFF || &bytes[8..12] != WAVE {
            return Err(DubframeError::input("missing RIFF/WAVE signature"));
        }
        if &bytes[12..16] != FMT || read_u32(&bytes, 16) != PCM_FMT_CHUNK_LEN {
            return Err(DubframeError::input("expected a 16-byte PCM fmt chunk"));
        }
        if read_u16(&bytes, 20) != FORMAT_PCM {
            return Err(DubframeError::input("wav format is not PCM"));
        }
        if &bytes[36..40] != DATA {
            return Err(DubframeError::input("missing data chunk at offset 36"));
        }

        let header = WavHeader {
            channels: read_u16(&bytes, 22),
            sample_rate: read_u32(&bytes, 24),
            byte_rate: read_u32(&bytes, 28),
            block_align: read_u16(&bytes, 32),
            bits_per_sample: read_u16(&bytes, 34),
            data_size: read_u32(&bytes, 40),
        };
        if header.bits_per_sample != 16 {
            return Err(DubframeError::input(format!(
                "unsupported wav bit depth {}",
                header.bits_per_sample
            )));
        }
        if header.channels == 0 || header.sample_rate == 0 {
            return Err(DubframeError::input("wav channels and sample rate must be > 0"));
        }
        if bytes.len() - WAV_HEADER_LEN < header.data_size as usize {
            return Err(DubframeError::input("wav data chunk is truncated"));
        }

        Ok(Self {
            bytes: bytes.into(),
            header,
        })
    }

    /// Complete container bytes (header + data).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parsed header fields.
    pub fn header(&self) -> WavHeader {
        self.header
    }

    /// Raw bytes of the `data` chunk.
    pub fn data(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..WAV_HEADER_LEN + self.header.data_size as usize]
    }

    /// Decode the `data` chunk back into samples.
    pub fn decode_samples(&self) -> DubframeResult<AudioSamples> {
        AudioSamples::from_pcm16le(self.data(), self.header.channels, self.header.sample_rate)
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.header.byte_rate == 0 {
            return 0.0;
        }
        f64::from(self.header.data_size) / f64::from(self.header.byte_rate)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;
