use std::collections::VecDeque;

use crate::audio::pcm::{AudioSamples, WAV_MIME, WavContainer};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::media::blob::{BlobStore, BlobUrl};
use crate::media::source::{VideoInfo, VideoSource};
use crate::render::backend::FrameRGBA;

/// Playback notifications emitted by a media element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started or resumed.
    Play,
    /// Playback paused.
    Pause,
    /// The position was moved explicitly.
    Seeking,
    /// Playback reached the end.
    Ended,
}

/// Position and paused/ended flags of a playable element.
///
/// Time only moves through [`PlaybackClock::advance`], so playback is deterministic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackClock {
    current_secs: f64,
    duration_secs: f64,
    paused: bool,
    ended: bool,
}

impl PlaybackClock {
    /// Paused clock at zero.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            current_secs: 0.0,
            duration_secs: duration_secs.max(0.0),
            paused: true,
            ended: false,
        }
    }

    /// Current position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_secs
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration_secs
    }

    /// `true` unless playing.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// `true` once playback ran to the end.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Start playing. Returns `false` when already playing. Playing an ended clock rewinds it.
    pub fn play(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        if self.ended {
            self.current_secs = 0.0;
            self.ended = false;
        }
        self.paused = false;
        true
    }

    /// Pause. Returns `false` when already paused.
    pub fn pause(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    /// Jump to `secs`, clamped to `[0, duration]`.
    pub fn seek(&mut self, secs: f64) {
        let secs = if secs.is_finite() { secs } else { 0.0 };
        self.current_secs = secs.clamp(0.0, self.duration_secs);
        self.ended = false;
    }

    /// Move forward by `dt` seconds while playing. Returns `true` when this step reached the end.
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.paused || self.ended || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.current_secs = (self.current_secs + dt).min(self.duration_secs);
        if self.current_secs >= self.duration_secs {
            self.ended = true;
            self.paused = true;
            return true;
        }
        false
    }
}

/// A video being played: decoded pictures plus a clock and queued events.
pub struct VideoElement {
    source: Box<dyn VideoSource>,
    info: Option<VideoInfo>,
    clock: PlaybackClock,
    events: VecDeque<PlaybackEvent>,
}

impl VideoElement {
    /// Wrap a source. Metadata is not loaded yet.
    pub fn new(source: Box<dyn VideoSource>) -> Self {
        Self {
            source,
            info: None,
            clock: PlaybackClock::new(0.0),
            events: VecDeque::new(),
        }
    }

    /// Probe the source once and size the clock from its duration.
    pub fn load_metadata(&mut self) -> DubframeResult<VideoInfo> {
        if let Some(info) = self.info {
            return Ok(info);
        }
        let info = self.source.probe()?.validate()?;
        self.clock = PlaybackClock::new(info.duration_secs);
        self.info = Some(info);
        tracing::debug!(
            width = info.width,
            height = info.height,
            duration_secs = info.duration_secs,
            "video metadata loaded"
        );
        Ok(info)
    }

    /// Metadata, once loaded.
    pub fn info(&self) -> Option<VideoInfo> {
        self.info
    }

    /// Playback state.
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Current position in seconds.
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Start playing; queues [`PlaybackEvent::Play`] when state changed.
    pub fn play(&mut self) -> DubframeResult<()> {
        if self.info.is_none() {
            return Err(DubframeError::validation(
                "video metadata must be loaded before play",
            ));
        }
        if self.clock.play() {
            self.events.push_back(PlaybackEvent::Play);
        }
        Ok(())
    }

    /// Pause; queues [`PlaybackEvent::Pause`] when state changed.
    pub fn pause(&mut self) {
        if self.clock.pause() {
            self.events.push_back(PlaybackEvent::Pause);
        }
    }

    /// Seek; always queues [`PlaybackEvent::Seeking`].
    pub fn seek(&mut self, secs: f64) {
        self.clock.seek(secs);
        self.events.push_back(PlaybackEvent::Seeking);
    }

    /// Advance playback by `dt`; queues [`PlaybackEvent::Ended`] on reaching the end.
    pub fn advance(&mut self, dt: f64) {
        if self.clock.advance(dt) {
            self.events.push_back(PlaybackEvent::Ended);
        }
    }

    /// Decode the picture at the current position.
    pub fn current_frame(&mut self) -> DubframeResult<FrameRGBA> {
        self.source.frame_at(self.clock.current_time())
    }

    /// Take queued events in emission order.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain(..).collect()
    }
}

impl std::fmt::Debug for VideoElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoElement")
            .field("info", &self.info)
            .field("clock", &self.clock)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// The synthesized-voice player: a WAV exposed through a blob URL plus a clock.
///
/// The URL is revoked by [`AudioElement::release`] or on drop, whichever happens first.
#[derive(Debug)]
pub struct AudioElement {
    store: BlobStore,
    url: Option<BlobUrl>,
    samples: AudioSamples,
    clock: PlaybackClock,
}

impl AudioElement {
    /// Register `wav` in `store` and decode it for playback.
    pub fn from_wav(store: &BlobStore, wav: &WavContainer) -> DubframeResult<Self> {
        let samples = wav.decode_samples()?;
        let url = store.create(wav.as_bytes().to_vec(), WAV_MIME);
        tracing::debug!(url = %url, duration_secs = samples.duration_secs(), "voice element created");
        Ok(Self {
            store: store.clone(),
            url: Some(url),
            clock: PlaybackClock::new(samples.duration_secs()),
            samples,
        })
    }

    /// Blob URL while the element is live.
    pub fn url(&self) -> Option<&BlobUrl> {
        self.url.as_ref()
    }

    /// Decoded voice samples.
    pub fn samples(&self) -> &AudioSamples {
        &self.samples
    }

    /// Playback state.
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Current position in seconds.
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// `true` while the voice is audible.
    pub fn is_playing(&self) -> bool {
        !self.clock.is_paused() && !self.clock.is_ended()
    }

    /// Start playing.
    pub fn play(&mut self) {
        self.clock.play();
    }

    /// Pause.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Move the playhead.
    pub fn seek(&mut self, secs: f64) {
        self.clock.seek(secs);
    }

    /// Advance playback by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.clock.advance(dt);
    }

    /// Pause and revoke the blob URL. Safe to call more than once.
    pub fn release(&mut self) {
        self.clock.pause();
        if let Some(url) = self.url.take()
            && !self.store.revoke(&url)
        {
            tracing::warn!(url = %url, "voice blob url was already revoked");
        }
    }
}

impl Drop for AudioElement {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/element.rs"]
mod tests;
