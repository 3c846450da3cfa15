use crate::captions::style::CaptionPreset;
use crate::encode::recorder::RecordingFormat;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::media::source::VideoInfo;

/// Output size rule for an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TargetRatio {
    /// Source dimensions unchanged.
    #[default]
    #[serde(rename = "original")]
    Original,
    /// Keep the width, height becomes `width * 9/16`.
    #[serde(rename = "16:9")]
    Landscape,
    /// Keep the height, width becomes `height * 9/16`.
    #[serde(rename = "9:16")]
    Portrait,
    /// 480 px high, source aspect.
    #[serde(rename = "480p")]
    P480,
    /// 720 px high, source aspect.
    #[serde(rename = "720p")]
    P720,
    /// 1080 px high, source aspect.
    #[serde(rename = "1080p")]
    P1080,
    /// 1440 px high, source aspect.
    #[serde(rename = "2k")]
    P1440,
}

impl TargetRatio {
    /// Every rule, in menu order.
    pub const ALL: [Self; 7] = [
        Self::Original,
        Self::Landscape,
        Self::Portrait,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P1440,
    ];

    /// Label used in configs and download names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::P1440 => "2k",
        }
    }

    /// Fixed output height, for the resolution presets.
    pub fn fixed_height(self) -> Option<u32> {
        match self {
            Self::P480 => Some(480),
            Self::P720 => Some(720),
            Self::P1080 => Some(1080),
            Self::P1440 => Some(1440),
            Self::Original | Self::Landscape | Self::Portrait => None,
        }
    }

    /// Canvas for a source video. Fractional sizes are truncated.
    pub fn canvas_for(self, video: VideoInfo) -> DubframeResult<Canvas> {
        let (vw, vh) = (f64::from(video.width), f64::from(video.height));
        let (w, h) = match self {
            Self::Original => (vw, vh),
            Self::Landscape => (vw, vw * 9.0 / 16.0),
            Self::Portrait => (vh * 9.0 / 16.0, vh),
            Self::P480 | Self::P720 | Self::P1080 | Self::P1440 => {
                let h = f64::from(self.fixed_height().unwrap_or(video.height));
                (h * vw / vh, h)
            }
        };
        Canvas::new(w.floor() as u32, h.floor() as u32).map_err(|_| {
            DubframeError::validation(format!(
                "target ratio {} gives an empty canvas for a {}x{} video",
                self.label(),
                video.width,
                video.height
            ))
        })
    }
}

impl std::fmt::Display for TargetRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TargetRatio {
    type Err = DubframeError;

    fn from_str(s: &str) -> DubframeResult<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DubframeError::validation(format!(
                    "unknown target ratio '{s}' (expected original, 16:9, 9:16, 480p, 720p, 1080p or 2k)"
                ))
            })
    }
}

fn default_fps() -> u32 {
    30
}

/// Everything that shapes one export.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Output size rule.
    #[serde(default)]
    pub target_ratio: TargetRatio,
    /// Caption look.
    #[serde(default)]
    pub style: CaptionPreset,
    /// Capture rate of the canvas track.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Output container and codecs.
    #[serde(default)]
    pub format: RecordingFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_ratio: TargetRatio::default(),
            style: CaptionPreset::default(),
            fps: default_fps(),
            format: RecordingFormat::default(),
        }
    }
}

impl ExportConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> DubframeResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the capture rate.
    pub fn validate(&self) -> DubframeResult<()> {
        self.frame_rate().map(|_| ())
    }

    /// Capture rate as a rational.
    pub fn frame_rate(&self) -> DubframeResult<Fps> {
        Fps::new(self.fps, 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
