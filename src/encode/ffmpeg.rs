use std::fs::File;
use std::io::{BufWriter, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::OnceLock;
use std::thread::JoinHandle;

use crate::encode::recorder::{Recorder, RecorderConfig, RecorderState, RecordingFormat};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

/// Size of the chunks `stop` splits the muxed file into.
pub const CHUNK_BYTES: usize = 1 << 20;

/// Return `true` when an `ffmpeg` binary can be spawned.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` when missing.
pub fn ensure_parent_dir(path: &Path) -> DubframeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn encoder_listing() -> &'static str {
    static LISTING: OnceLock<String> = OnceLock::new();
    LISTING.get_or_init(|| {
        Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stderr(Stdio::null())
            .output()
            .ok()
            .filter(|out| out.status.success())
            .map(|out| String::from_utf8_lossy(&out.stdout).into_owned())
            .unwrap_or_default()
    })
}

/// Return `true` when `listing` (output of `ffmpeg -encoders`) names `encoder`.
pub(crate) fn listing_has_encoder(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|name| name == encoder)
}

/// Arguments of the pass that encodes raw RGBA frames from stdin into `out`.
pub(crate) fn video_pass_args(cfg: &RecorderConfig, out: &Path) -> Vec<String> {
    let mut args: Vec<String> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.push("-r".to_owned());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den));
    args.extend(
        ["-i", "pipe:0", "-an", "-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2", "-c:v"]
            .iter()
            .map(|s| (*s).to_owned()),
    );
    args.push(cfg.format.video_encoder().to_owned());
    let tuning: &[&str] = match cfg.format {
        RecordingFormat::WebmVp9Opus => &[
            "-b:v", "0", "-crf", "32", "-deadline", "realtime", "-cpu-used", "8",
        ],
        RecordingFormat::Mp4H264Aac => &["-preset", "veryfast", "-crf", "23"],
    };
    args.extend(tuning.iter().map(|s| (*s).to_owned()));
    args.extend(["-pix_fmt", "yuv420p"].iter().map(|s| (*s).to_owned()));
    args.push(out.display().to_string());
    args
}

/// Arguments of the pass that joins the encoded video with the raw `f32le` voice track.
pub(crate) fn mux_pass_args(
    cfg: &RecorderConfig,
    video: &Path,
    audio: &Path,
    out: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-loglevel", "error", "-i"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
    args.push(video.display().to_string());
    args.extend(["-f", "f32le", "-ar"].iter().map(|s| (*s).to_owned()));
    args.push(cfg.audio.sample_rate.to_string());
    args.push("-ac".to_owned());
    args.push(cfg.audio.channels.to_string());
    args.push("-i".to_owned());
    args.push(audio.display().to_string());
    args.extend(
        ["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a"]
            .iter()
            .map(|s| (*s).to_owned()),
    );
    args.push(cfg.format.audio_encoder().to_owned());
    args.extend(["-b:a", "128k"].iter().map(|s| (*s).to_owned()));
    if cfg.format == RecordingFormat::Mp4H264Aac {
        args.extend(["-movflags", "+faststart"].iter().map(|s| (*s).to_owned()));
    }
    args.push(out.display().to_string());
    args
}

struct ActiveRecording {
    cfg: RecorderConfig,
    dir: tempfile::TempDir,
    video_path: PathBuf,
    audio_path: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<String>>,
    audio: BufWriter<File>,
    scratch: Vec<u8>,
}

/// Recorder backed by the system `ffmpeg` binary.
///
/// Video frames stream into an encoder process; the voice track is spooled to a temp file. On
/// `stop` a second pass muxes both into the requested container. All intermediates live in a
/// temp directory removed when the recording ends or is aborted.
#[derive(Default)]
pub struct FfmpegRecorder {
    active: Option<ActiveRecording>,
    state: RecorderState,
}

impl std::fmt::Debug for FfmpegRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegRecorder")
            .field("state", &self.state)
            .field("config", &self.active.as_ref().map(|a| a.cfg))
            .finish()
    }
}

impl FfmpegRecorder {
    /// Idle recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn active_mut(&mut self) -> DubframeResult<&mut ActiveRecording> {
        self.active
            .as_mut()
            .ok_or_else(|| DubframeError::export("recorder is not recording"))
    }
}

impl Recorder for FfmpegRecorder {
    fn is_format_supported(&self, format: RecordingFormat) -> bool {
        let listing = encoder_listing();
        listing_has_encoder(listing, format.video_encoder())
            && listing_has_encoder(listing, format.audio_encoder())
    }

    #[tracing::instrument(skip(self), fields(format = ?cfg.format))]
    fn start(&mut self, cfg: RecorderConfig) -> DubframeResult<()> {
        cfg.validate()?;
        if self.active.is_some() {
            return Err(DubframeError::export("recorder already started"));
        }
        if !is_ffmpeg_on_path() {
            return Err(DubframeError::resource(
                "ffmpeg is required for recording, but was not found on PATH",
            ));
        }
        if !self.is_format_supported(cfg.format) {
            return Err(DubframeError::unsupported_format(cfg.format.mime()));
        }

        let dir = tempfile::Builder::new()
            .prefix("dubframe-rec-")
            .tempdir()
            .map_err(|e| DubframeError::resource(format!("failed to create temp dir: {e}")))?;
        let video_path = dir.path().join(format!("video.{}", cfg.format.extension()));
        let audio_path = dir.path().join("voice.f32le");

        let audio = File::create(&audio_path)
            .map(BufWriter::new)
            .map_err(|e| DubframeError::resource(format!("failed to create audio spool: {e}")))?;

        let mut child = Command::new("ffmpeg")
            .args(video_pass_args(&cfg, &video_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DubframeError::resource(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DubframeError::resource("failed to open ffmpeg stdin"))?;
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        tracing::debug!(dir = %dir.path().display(), "ffmpeg recording started");
        self.active = Some(ActiveRecording {
            scratch: vec![0u8; cfg.frame_len()],
            cfg,
            dir,
            video_path,
            audio_path,
            child,
            stdin: Some(stdin),
            stderr,
            audio,
        });
        self.state = RecorderState::Recording;
        Ok(())
    }

    fn push_video_frame(&mut self, frame: &FrameRGBA) -> DubframeResult<()> {
        let active = self.active_mut()?;
        if frame.width != active.cfg.width || frame.height != active.cfg.height {
            return Err(DubframeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, active.cfg.width, active.cfg.height
            )));
        }
        flatten_to_opaque_rgba8(
            &mut active.scratch,
            &frame.data,
            frame.premultiplied,
            [0, 0, 0, 255],
        )?;
        let Some(stdin) = active.stdin.as_mut() else {
            return Err(DubframeError::export("ffmpeg video input already closed"));
        };
        stdin.write_all(&active.scratch).map_err(|e| {
            DubframeError::resource(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn push_audio(&mut self, interleaved: &[f32]) -> DubframeResult<()> {
        let active = self.active_mut()?;
        if !interleaved
            .len()
            .is_multiple_of(usize::from(active.cfg.audio.channels))
        {
            return Err(DubframeError::validation(
                "audio chunk is not a whole number of frames",
            ));
        }
        for s in interleaved {
            active
                .audio
                .write_all(&s.to_le_bytes())
                .map_err(|e| DubframeError::resource(format!("failed to spool audio: {e}")))?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn stop(&mut self) -> DubframeResult<Vec<Vec<u8>>> {
        let mut active = self
            .active
            .take()
            .ok_or_else(|| DubframeError::export("recorder is not recording"))?;
        self.state = RecorderState::Stopped;

        drop(active.stdin.take());
        let status = active
            .child
            .wait()
            .map_err(|e| DubframeError::resource(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = active
            .stderr
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        if !status.success() {
            return Err(DubframeError::resource(format!(
                "ffmpeg video pass exited with status {status}: {}",
                stderr.trim()
            )));
        }
        active
            .audio
            .flush()
            .map_err(|e| DubframeError::resource(format!("failed to flush audio spool: {e}")))?;

        let out_path = active
            .dir
            .path()
            .join(format!("out.{}", active.cfg.format.extension()));
        let mux = Command::new("ffmpeg")
            .args(mux_pass_args(
                &active.cfg,
                &active.video_path,
                &active.audio_path,
                &out_path,
            ))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DubframeError::resource(format!("failed to run ffmpeg mux: {e}")))?;
        if !mux.status.success() {
            return Err(DubframeError::resource(format!(
                "ffmpeg mux exited with status {}: {}",
                mux.status,
                String::from_utf8_lossy(&mux.stderr).trim()
            )));
        }

        let bytes = std::fs::read(&out_path)
            .map_err(|e| DubframeError::resource(format!("failed to read recording: {e}")))?;
        tracing::debug!(bytes = bytes.len(), "ffmpeg recording finished");
        Ok(bytes.chunks(CHUNK_BYTES).map(<[u8]>::to_vec).collect())
    }

    fn abort(&mut self) {
        if let Some(mut active) = self.active.take() {
            drop(active.stdin.take());
            let _ = active.child.kill();
            let _ = active.child.wait();
            if let Some(h) = active.stderr.take() {
                let _ = h.join();
            }
            tracing::debug!("ffmpeg recording aborted");
        }
        self.state = RecorderState::Inactive;
    }

    fn state(&self) -> RecorderState {
        self.state
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        self.abort();
    }
}

pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> DubframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(DubframeError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let [bg_r, bg_g, bg_b, _] = bg_rgba.map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        let ch = |c: u8, bg: u16| {
            let fg = if src_is_premul {
                u16::from(c)
            } else {
                mul_div255_u16(u16::from(c), a)
            };
            (fg + mul_div255_u16(bg, inv)).min(255) as u8
        };
        d[0] = ch(s[0], bg_r);
        d[1] = ch(s[1], bg_g);
        d[2] = ch(s[2], bg_b);
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
