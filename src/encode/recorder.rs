use std::sync::{Arc, Mutex, MutexGuard};

use crate::audio::mix::AudioTrackInfo;
use crate::foundation::core::Fps;
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::render::backend::FrameRGBA;

/// Container and codecs a recording is made in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RecordingFormat {
    /// WebM with VP9 video and Opus audio.
    #[default]
    #[serde(rename = "webm")]
    WebmVp9Opus,
    /// MP4 with H.264 video and AAC audio.
    #[serde(rename = "mp4")]
    Mp4H264Aac,
}

impl RecordingFormat {
    /// MIME type including codecs.
    pub fn mime(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "video/webm; codecs=vp9,opus",
            Self::Mp4H264Aac => "video/mp4; codecs=avc1,mp4a",
        }
    }

    /// MIME type without codec parameters, used for the downloaded file.
    pub fn container_mime(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "video/webm",
            Self::Mp4H264Aac => "video/mp4",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "webm",
            Self::Mp4H264Aac => "mp4",
        }
    }

    /// ffmpeg video encoder name.
    pub fn video_encoder(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "libvpx-vp9",
            Self::Mp4H264Aac => "libx264",
        }
    }

    /// ffmpeg audio encoder name.
    pub fn audio_encoder(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "libopus",
            Self::Mp4H264Aac => "aac",
        }
    }
}

impl std::str::FromStr for RecordingFormat {
    type Err = DubframeError;

    fn from_str(s: &str) -> DubframeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(Self::WebmVp9Opus),
            "mp4" => Ok(Self::Mp4H264Aac),
            other => Err(DubframeError::validation(format!(
                "unknown recording format '{other}' (expected webm or mp4)"
            ))),
        }
    }
}

/// Stream description handed to [`Recorder::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Video width in pixels.
    pub width: u32,
    /// Video height in pixels.
    pub height: u32,
    /// Nominal capture rate of the canvas track.
    pub fps: Fps,
    /// Audio track format.
    pub audio: AudioTrackInfo,
    /// Output container and codecs.
    pub format: RecordingFormat,
}

impl RecorderConfig {
    /// Check dimensions, rate and audio format.
    pub fn validate(&self) -> DubframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DubframeError::validation(
                "recorder width/height must be non-zero",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(DubframeError::validation("recorder fps must be non-zero"));
        }
        if self.audio.sample_rate == 0 || self.audio.channels == 0 {
            return Err(DubframeError::validation(
                "recorder audio needs a non-zero sample rate and channel count",
            ));
        }
        Ok(())
    }

    /// Bytes in one RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Lifecycle of a [`Recorder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecorderState {
    /// Not started, or aborted.
    #[default]
    Inactive,
    /// Accepting frames and audio.
    Recording,
    /// Stopped; chunks were handed out.
    Stopped,
}

/// Sink that records one video track plus one audio track into a container.
///
/// Frames and audio arrive in presentation order. `stop` returns the recorded chunks, which
/// concatenate into the output file. `abort` discards everything.
pub trait Recorder {
    /// Return `true` when `format` can be recorded.
    fn is_format_supported(&self, format: RecordingFormat) -> bool;

    /// Begin recording.
    fn start(&mut self, cfg: RecorderConfig) -> DubframeResult<()>;

    /// Append one video frame.
    fn push_video_frame(&mut self, frame: &FrameRGBA) -> DubframeResult<()>;

    /// Append interleaved audio samples in the configured track format.
    fn push_audio(&mut self, interleaved: &[f32]) -> DubframeResult<()>;

    /// Finish and return the recorded chunks.
    fn stop(&mut self) -> DubframeResult<Vec<Vec<u8>>>;

    /// Drop any in-progress recording without producing output.
    fn abort(&mut self);

    /// Current state.
    fn state(&self) -> RecorderState;
}

/// What an [`InMemoryRecorder`] has seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingLog {
    /// Config passed to the last `start`.
    pub config: Option<RecorderConfig>,
    /// Frames pushed since the last `start`.
    pub frames: Vec<FrameRGBA>,
    /// Audio samples pushed since the last `start`.
    pub audio: Vec<f32>,
    /// Number of `abort` calls.
    pub aborts: u32,
    /// Current state.
    pub state: RecorderState,
}

#[derive(Debug, Default)]
struct InMemoryInner {
    log: RecordingLog,
    unsupported: Vec<RecordingFormat>,
    fail_start: bool,
    fail_after_frames: Option<usize>,
}

/// Recorder that keeps everything in memory; clones share state.
///
/// `stop` yields a single chunk: a short text header followed by the raw frame bytes.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecorder {
    inner: Arc<Mutex<InMemoryInner>>,
}

impl InMemoryRecorder {
    /// Recorder supporting every format.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Report `format` as unsupported.
    pub fn without_format(self, format: RecordingFormat) -> Self {
        self.lock().unsupported.push(format);
        self
    }

    /// Make `start` fail as if the recorder could not be constructed.
    pub fn failing_start(self) -> Self {
        self.lock().fail_start = true;
        self
    }

    /// Make `push_video_frame` fail once `n` frames were accepted.
    pub fn failing_after_frames(self, n: usize) -> Self {
        self.lock().fail_after_frames = Some(n);
        self
    }

    /// Snapshot of what was recorded.
    pub fn log(&self) -> RecordingLog {
        self.lock().log.clone()
    }

    fn recording(inner: &InMemoryInner) -> DubframeResult<RecorderConfig> {
        match (inner.log.state, inner.log.config) {
            (RecorderState::Recording, Some(cfg)) => Ok(cfg),
            _ => Err(DubframeError::export("recorder is not recording")),
        }
    }
}

impl Recorder for InMemoryRecorder {
    fn is_format_supported(&self, format: RecordingFormat) -> bool {
        !self.lock().unsupported.contains(&format)
    }

    fn start(&mut self, cfg: RecorderConfig) -> DubframeResult<()> {
        cfg.validate()?;
        let mut inner = self.lock();
        if inner.fail_start {
            return Err(DubframeError::resource("recorder construction failed"));
        }
        if inner.unsupported.contains(&cfg.format) {
            return Err(DubframeError::unsupported_format(cfg.format.mime()));
        }
        if inner.log.state == RecorderState::Recording {
            return Err(DubframeError::export("recorder already started"));
        }
        inner.log.config = Some(cfg);
        inner.log.frames.clear();
        inner.log.audio.clear();
        inner.log.state = RecorderState::Recording;
        Ok(())
    }

    fn push_video_frame(&mut self, frame: &FrameRGBA) -> DubframeResult<()> {
        let mut inner = self.lock();
        let cfg = Self::recording(&inner)?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(DubframeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if inner
            .fail_after_frames
            .is_some_and(|n| inner.log.frames.len() >= n)
        {
            return Err(DubframeError::export("recorder rejected a frame"));
        }
        inner.log.frames.push(frame.clone());
        Ok(())
    }

    fn push_audio(&mut self, interleaved: &[f32]) -> DubframeResult<()> {
        let mut inner = self.lock();
        let cfg = Self::recording(&inner)?;
        if !interleaved.len().is_multiple_of(usize::from(cfg.audio.channels)) {
            return Err(DubframeError::validation(
                "audio chunk is not a whole number of frames",
            ));
        }
        inner.log.audio.extend_from_slice(interleaved);
        Ok(())
    }

    fn stop(&mut self) -> DubframeResult<Vec<Vec<u8>>> {
        let mut inner = self.lock();
        let cfg = Self::recording(&inner)?;
        inner.log.state = RecorderState::Stopped;

        let header = format!(
            "{} {}x{} frames={} audio_samples={}\n",
            cfg.format.mime(),
            cfg.width,
            cfg.height,
            inner.log.frames.len(),
            inner.log.audio.len()
        );
        let mut chunk = header.into_bytes();
        for frame in &inner.log.frames {
            chunk.extend_from_slice(&frame.data);
        }
        Ok(vec![chunk])
    }

    fn abort(&mut self) {
        let mut inner = self.lock();
        inner.log.aborts += 1;
        inner.log.frames.clear();
        inner.log.audio.clear();
        inner.log.state = RecorderState::Inactive;
    }

    fn state(&self) -> RecorderState {
        self.lock().log.state
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;
