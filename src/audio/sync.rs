use crate::foundation::error::DubframeResult;
use crate::media::element::{AudioElement, PlaybackEvent, VideoElement};

/// Drift between video and voice that a seek must exceed before the voice is snapped.
pub const RESYNC_THRESHOLD_SECS: f64 = 0.5;

/// What the voice did in response to a video event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncAction {
    /// Nothing changed.
    None,
    /// Voice started playing.
    Played,
    /// Voice paused.
    Paused,
    /// Voice position jumped to the video's.
    Snapped {
        /// Voice position before the snap.
        from: f64,
        /// Voice position after the snap.
        to: f64,
    },
}

/// Makes the voice element follow the video element's play, pause and seek events.
///
/// Ordinary forward drift is tolerated; the voice position is only corrected on a seek that
/// leaves it more than [`RESYNC_THRESHOLD_SECS`] away from the video.
#[derive(Clone, Debug, Default)]
pub struct PlaybackSync {
    snaps: u64,
}

impl PlaybackSync {
    /// Fresh sync with no snaps recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of corrective snaps performed so far.
    pub fn snap_count(&self) -> u64 {
        self.snaps
    }

    /// Apply one video event to the voice.
    pub fn handle(
        &mut self,
        event: PlaybackEvent,
        video_time: f64,
        voice: &mut AudioElement,
    ) -> SyncAction {
        match event {
            PlaybackEvent::Play => {
                voice.play();
                SyncAction::Played
            }
            PlaybackEvent::Pause => {
                voice.pause();
                SyncAction::Paused
            }
            PlaybackEvent::Seeking => {
                let from = voice.current_time();
                if (from - video_time).abs() > RESYNC_THRESHOLD_SECS {
                    voice.seek(video_time);
                    self.snaps += 1;
                    tracing::warn!(from, to = video_time, "voice drifted; snapped to video");
                    SyncAction::Snapped {
                        from,
                        to: video_time,
                    }
                } else {
                    SyncAction::None
                }
            }
            PlaybackEvent::Ended => SyncAction::None,
        }
    }

    /// Drain the video's queued events and apply each to the voice.
    pub fn pump(&mut self, video: &mut VideoElement, voice: &mut AudioElement) -> Vec<SyncAction> {
        let time = video.current_time();
        video
            .drain_events()
            .into_iter()
            .map(|event| self.handle(event, time, voice))
            .collect()
    }
}

/// Preview playback of a video with its synthesized voice kept in step.
pub struct PreviewPlayer {
    video: VideoElement,
    voice: AudioElement,
    sync: PlaybackSync,
}

impl PreviewPlayer {
    /// Load the video's metadata and pair it with `voice`.
    pub fn new(mut video: VideoElement, voice: AudioElement) -> DubframeResult<Self> {
        video.load_metadata()?;
        Ok(Self {
            video,
            voice,
            sync: PlaybackSync::new(),
        })
    }

    /// Video element.
    pub fn video(&self) -> &VideoElement {
        &self.video
    }

    /// Voice element.
    pub fn voice(&self) -> &AudioElement {
        &self.voice
    }

    /// Sync bookkeeping.
    pub fn sync(&self) -> &PlaybackSync {
        &self.sync
    }

    /// Start both.
    pub fn play(&mut self) -> DubframeResult<Vec<SyncAction>> {
        self.video.play()?;
        Ok(self.sync.pump(&mut self.video, &mut self.voice))
    }

    /// Pause both.
    pub fn pause(&mut self) -> Vec<SyncAction> {
        self.video.pause();
        self.sync.pump(&mut self.video, &mut self.voice)
    }

    /// Seek the video; the voice follows when it drifted past the threshold.
    pub fn seek(&mut self, secs: f64) -> Vec<SyncAction> {
        self.video.seek(secs);
        self.sync.pump(&mut self.video, &mut self.voice)
    }

    /// Let `dt` seconds of playback elapse on both elements.
    pub fn advance(&mut self, dt: f64) -> Vec<SyncAction> {
        self.video.advance(dt);
        self.voice.advance(dt);
        self.sync.pump(&mut self.video, &mut self.voice)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/sync.rs"]
mod tests;
