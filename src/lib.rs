#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! `dubframe` turns a source video, a translated caption script and a synthesized voiceover
//! into one exported video file.
//!
//! The pieces, bottom-up:
//!
//! - [`audio::pcm`] wraps raw speech PCM into a canonical WAV container.
//! - [`captions`] parses `[MM:SS] text` scripts into a [`Timeline`] and holds the caption style
//!   catalogue.
//! - [`render`] draws cover-fitted video frames plus styled captions onto a [`Surface`].
//! - [`audio::mix`] and [`audio::sync`] carry the voice into the recording and keep it in step
//!   with the video.
//! - [`encode`] records canvas frames and voice audio into a container and delivers the file.
//! - [`session`] drives one export through `Idle → Preparing → Recording → Finalizing → Done`.
//! - [`dubbing`] produces the timeline and voiceover through transcription, translation and
//!   speech collaborators.

pub mod audio;
pub mod captions;
pub mod dubbing;
pub mod encode;
pub(crate) mod foundation;
pub mod media;
pub mod render;
pub mod session;

pub use audio::mix::{AudioGraph, AudioTrackInfo, PcmAudioGraph};
pub use audio::pcm::{AudioSamples, WavContainer, encode_wav};
pub use audio::sync::{PlaybackSync, PreviewPlayer, SyncAction};
pub use captions::style::{CaptionPreset, CaptionStyle};
pub use captions::timeline::{Subtitle, Timeline, active_subtitle, parse_timeline};
pub use encode::download::{DeliveredFile, DirectoryDownloads, DownloadTarget, InMemoryDownloads};
pub use encode::ffmpeg::FfmpegRecorder;
pub use encode::recorder::{InMemoryRecorder, Recorder, RecorderConfig, RecordingFormat};
pub use foundation::core::{Canvas, Color, Fps, Point, Rect};
pub use foundation::error::{DubframeError, DubframeResult};
pub use media::blob::BlobStore;
pub use media::element::{AudioElement, VideoElement};
pub use media::ffmpeg::FfmpegVideoSource;
pub use media::source::{SolidVideoSource, VideoInfo, VideoSource};
pub use render::backend::{FrameRGBA, Surface, SurfaceFactory};
pub use render::compositor::{compose_frame, cover_fit, frame_to_png};
pub use render::cpu::{CpuSurface, CpuSurfaceFactory};
pub use render::recording::{RecordingSurface, RecordingSurfaceFactory};
pub use session::config::{ExportConfig, TargetRatio};
pub use session::controller::{ExportController, ExportHandle};
pub use session::export::{
    ExportBackends, ExportInputs, ExportProgress, ExportSession, ExportState, StepOutcome,
};
