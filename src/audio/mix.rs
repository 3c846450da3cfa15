use crate::audio::pcm::AudioSamples;
use crate::foundation::core::Fps;
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::media::element::AudioElement;

/// Sample rate of the recorded audio track.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Channel count of the recorded audio track.
pub const MIX_CHANNELS: u16 = 2;

/// Format of the track an [`AudioGraph`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioTrackInfo {
    /// Output sample rate.
    pub sample_rate: u32,
    /// Output channel count (interleaved).
    pub channels: u16,
}

/// Audio context owned by one export session.
///
/// The voice element is routed into a stream destination whose output becomes the recorded
/// audio track. A closed graph rejects every further call.
pub trait AudioGraph {
    /// Route `voice` to the destination and report the output track format.
    fn connect_voice(&mut self, voice: &AudioElement) -> DubframeResult<AudioTrackInfo>;

    /// Pull `frames` interleaved output frames for voice position `position_secs`.
    fn render(&mut self, position_secs: f64, frames: usize) -> DubframeResult<Vec<f32>>;

    /// Release the context.
    fn close(&mut self) -> DubframeResult<()>;

    /// `true` after [`AudioGraph::close`].
    fn is_closed(&self) -> bool;
}

/// In-process graph resampling the voice PCM with linear interpolation.
#[derive(Clone, Debug)]
pub struct PcmAudioGraph {
    track: AudioTrackInfo,
    voice: Option<AudioSamples>,
    voice_f32: Vec<f32>,
    closed: bool,
}

impl Default for PcmAudioGraph {
    fn default() -> Self {
        Self::new(MIX_SAMPLE_RATE, MIX_CHANNELS)
    }
}

impl PcmAudioGraph {
    /// Graph producing `channels` at `sample_rate`.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            track: AudioTrackInfo {
                sample_rate,
                channels,
            },
            voice: None,
            voice_f32: Vec::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> DubframeResult<()> {
        if self.closed {
            return Err(DubframeError::resource("audio graph is closed"));
        }
        Ok(())
    }
}

impl AudioGraph for PcmAudioGraph {
    fn connect_voice(&mut self, voice: &AudioElement) -> DubframeResult<AudioTrackInfo> {
        self.ensure_open()?;
        if self.track.sample_rate == 0 || self.track.channels == 0 {
            return Err(DubframeError::resource(
                "audio graph needs a non-zero sample rate and channel count",
            ));
        }
        let samples = voice.samples().clone();
        self.voice_f32 = samples.to_f32();
        self.voice = Some(samples);
        Ok(self.track)
    }

    fn render(&mut self, position_secs: f64, frames: usize) -> DubframeResult<Vec<f32>> {
        self.ensure_open()?;
        let voice = self
            .voice
            .as_ref()
            .ok_or_else(|| DubframeError::resource("no voice connected to the audio graph"))?;

        let out_channels = usize::from(self.track.channels);
        let mut out = vec![0.0f32; frames * out_channels];
        resample_into(
            &mut out,
            self.track,
            &self.voice_f32,
            usize::from(voice.channels()),
            voice.sample_rate(),
            position_secs,
        );
        Ok(out)
    }

    fn close(&mut self) -> DubframeResult<()> {
        self.closed = true;
        self.voice = None;
        self.voice_f32 = Vec::new();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

fn resample_into(
    out: &mut [f32],
    track: AudioTrackInfo,
    src: &[f32],
    src_channels: usize,
    src_rate: u32,
    start_secs: f64,
) {
    if src_channels == 0 {
        return;
    }
    let src_frames = src.len() / src_channels;
    if src_frames == 0 || !start_secs.is_finite() || start_secs < 0.0 {
        return;
    }
    let out_channels = usize::from(track.channels);

    for (i, dst) in out.chunks_exact_mut(out_channels).enumerate() {
        let src_sec = start_secs + (i as f64) / f64::from(track.sample_rate);
        let src_pos = src_sec * f64::from(src_rate);
        let src_frame0 = src_pos.floor() as usize;
        if src_frame0 >= src_frames {
            break;
        }
        let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
        let frac = (src_pos - src_frame0 as f64) as f32;

        let lerp = |ch: usize| {
            let v0 = src[src_frame0 * src_channels + ch];
            let v1 = src[src_frame1 * src_channels + ch];
            v0 + (v1 - v0) * frac
        };
        let (l, r) = if src_channels == 1 {
            let v = lerp(0);
            (v, v)
        } else {
            (lerp(0), lerp(1))
        };

        dst[0] = l.clamp(-1.0, 1.0);
        if out_channels > 1 {
            dst[1] = r.clamp(-1.0, 1.0);
        }
    }
}

/// Convert a frame delta to the nearest sample index at `sample_rate`.
pub fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

/// Audio frames belonging to video frame `frame_index`, so that per-frame chunks sum to the
/// exact sample count of the elapsed time.
pub fn samples_for_frame(frame_index: u64, fps: Fps, sample_rate: u32) -> usize {
    let start = frame_to_sample(frame_index, fps, sample_rate);
    let end = frame_to_sample(frame_index + 1, fps, sample_rate);
    (end - start) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
