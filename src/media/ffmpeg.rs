use std::path::{Path, PathBuf};

use crate::foundation::error::{DubframeError, DubframeResult};
use crate::media::source::{VideoInfo, VideoSource};
use crate::render::backend::FrameRGBA;

/// Frames decoded per ffmpeg invocation.
const DECODE_BATCH_FRAMES: u32 = 30;

/// Video file decoded with the `ffprobe`/`ffmpeg` command-line tools.
///
/// Frames are decoded in batches starting at the requested position and served from memory
/// while playback stays inside the batch.
#[derive(Debug)]
pub struct FfmpegVideoSource {
    path: PathBuf,
    probed: Option<ProbedVideo>,
    batch: Option<FrameBatch>,
}

#[derive(Clone, Copy, Debug)]
struct ProbedVideo {
    info: VideoInfo,
    fps: f64,
}

#[derive(Debug)]
struct FrameBatch {
    first_index: u64,
    frames: Vec<Vec<u8>>,
}

impl FfmpegVideoSource {
    /// Source for the video at `path`. Nothing is read until [`VideoSource::probe`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            probed: None,
            batch: None,
        }
    }

    /// Path of the video file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn probed(&mut self) -> DubframeResult<ProbedVideo> {
        if let Some(p) = self.probed {
            return Ok(p);
        }
        let p = probe_video(&self.path)?;
        self.probed = Some(p);
        Ok(p)
    }
}

impl VideoSource for FfmpegVideoSource {
    fn probe(&mut self) -> DubframeResult<VideoInfo> {
        Ok(self.probed()?.info)
    }

    fn frame_at(&mut self, time_secs: f64) -> DubframeResult<FrameRGBA> {
        let probed = self.probed()?;
        let index = (time_secs.max(0.0) * probed.fps).floor() as u64;

        let cached = self.batch.as_ref().and_then(|b| {
            let offset = index.checked_sub(b.first_index)?;
            b.frames.get(offset as usize).cloned()
        });
        let data = match cached {
            Some(data) => data,
            None => {
                let start = index as f64 / probed.fps;
                let frames = decode_video_frames_rgba8(
                    &self.path,
                    probed.info,
                    start,
                    DECODE_BATCH_FRAMES,
                )?;
                tracing::trace!(start, count = frames.len(), "decoded video batch");
                let first = frames.first().cloned().ok_or_else(|| {
                    DubframeError::input(format!(
                        "ffmpeg returned no video frames for '{}' at {start:.3}s",
                        self.path.display()
                    ))
                })?;
                self.batch = Some(FrameBatch {
                    first_index: index,
                    frames,
                });
                first
            }
        };

        Ok(FrameRGBA {
            width: probed.info.width,
            height: probed.info.height,
            data,
            premultiplied: false,
        })
    }
}

#[cfg(feature = "media-ffmpeg")]
fn probe_video(source_path: &Path) -> DubframeResult<ProbedVideo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| DubframeError::resource(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(DubframeError::input(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| DubframeError::input(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DubframeError::input("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| DubframeError::input("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| DubframeError::input("missing video height from ffprobe"))?;
    let (fps_num, fps_den) =
        parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
            .ok_or_else(|| DubframeError::input("invalid video r_frame_rate"))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(ProbedVideo {
        info: VideoInfo {
            width,
            height,
            duration_secs,
        },
        fps: f64::from(fps_num) / f64::from(fps_den),
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
fn probe_video(_source_path: &Path) -> DubframeResult<ProbedVideo> {
    Err(DubframeError::resource(
        "video decoding requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_video_frames_rgba8(
    source_path: &Path,
    info: VideoInfo,
    start_time_sec: f64,
    frame_count: u32,
) -> DubframeResult<Vec<Vec<u8>>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{start_time_sec:.9}")])
        .arg("-i")
        .arg(source_path)
        .args([
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            DubframeError::resource(format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(DubframeError::input(format!(
            "ffmpeg video decode failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = info.width as usize * info.height as usize * 4;
    if expected_len == 0 {
        return Err(DubframeError::input(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !out.stdout.len().is_multiple_of(expected_len) {
        return Err(DubframeError::input(format!(
            "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
            out.stdout.len()
        )));
    }

    Ok(out
        .stdout
        .chunks_exact(expected_len)
        .take(frame_count as usize)
        .map(<[u8]>::to_vec)
        .collect())
}

#[cfg(not(feature = "media-ffmpeg"))]
fn decode_video_frames_rgba8(
    _source_path: &Path,
    _info: VideoInfo,
    _start_time_sec: f64,
    _frame_count: u32,
) -> DubframeResult<Vec<Vec<u8>>> {
    Err(DubframeError::resource(
        "video decoding requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (a, b) = s.split_once('/')?;
    let a = a.trim().parse::<u32>().ok()?;
    let b = b.trim().parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
