use crate::foundation::core::Color;
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::render::backend::FrameRGBA;

/// Metadata a video reports once loaded.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    /// Intrinsic width in pixels.
    pub width: u32,
    /// Intrinsic height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl VideoInfo {
    /// Validate that the video has pixels and a finite, positive duration.
    pub fn validate(self) -> DubframeResult<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(DubframeError::input(format!(
                "video reports empty dimensions {}x{}",
                self.width, self.height
            )));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(DubframeError::input(format!(
                "video reports invalid duration {}",
                self.duration_secs
            )));
        }
        Ok(self)
    }
}

/// Decodable source of video pictures.
pub trait VideoSource {
    /// Load metadata (dimensions and duration).
    fn probe(&mut self) -> DubframeResult<VideoInfo>;

    /// Decode the picture shown at `time_secs`.
    fn frame_at(&mut self, time_secs: f64) -> DubframeResult<FrameRGBA>;
}

/// Synthetic source that shows one color for its whole duration.
#[derive(Clone, Debug)]
pub struct SolidVideoSource {
    info: VideoInfo,
    color: Color,
    fail_after_secs: Option<f64>,
    decoded: u64,
}

impl SolidVideoSource {
    /// Source of the given size and duration.
    pub fn new(width: u32, height: u32, duration_secs: f64, color: Color) -> Self {
        Self {
            info: VideoInfo {
                width,
                height,
                duration_secs,
            },
            color,
            fail_after_secs: None,
            decoded: 0,
        }
    }

    /// Make decoding fail for any time at or past `secs`.
    pub fn failing_after(mut self, secs: f64) -> Self {
        self.fail_after_secs = Some(secs);
        self
    }

    /// Number of frames decoded so far.
    pub fn decoded_frames(&self) -> u64 {
        self.decoded
    }
}

impl VideoSource for SolidVideoSource {
    fn probe(&mut self) -> DubframeResult<VideoInfo> {
        Ok(self.info)
    }

    fn frame_at(&mut self, time_secs: f64) -> DubframeResult<FrameRGBA> {
        if self.fail_after_secs.is_some_and(|limit| time_secs >= limit) {
            return Err(DubframeError::input(format!(
                "video decode failed at {time_secs:.3}s"
            )));
        }
        self.decoded += 1;
        Ok(FrameRGBA::solid(self.info.width, self.info.height, self.color))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
