use crate::audio::mix::{AudioGraph, AudioTrackInfo, samples_for_frame};
use crate::audio::pcm::WavContainer;
use crate::audio::sync::PlaybackSync;
use crate::captions::style::CaptionStyle;
use crate::captions::timeline::Timeline;
use crate::encode::download::{DeliveredFile, DownloadTarget, export_file_name, timestamp_ms};
use crate::encode::recorder::{Recorder, RecorderConfig, RecorderState};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::media::blob::BlobStore;
use crate::media::element::{AudioElement, VideoElement};
use crate::media::source::VideoSource;
use crate::render::backend::{Surface, SurfaceFactory};
use crate::render::compositor::compose_frame;
use crate::session::config::ExportConfig;

/// Where an [`ExportSession`] is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    /// Created, nothing acquired yet.
    #[default]
    Idle,
    /// Metadata loaded, canvas and audio graph built; waiting for [`ExportSession::start`].
    Preparing,
    /// Frames are being drawn and recorded.
    Recording,
    /// Recorder stopped; output being assembled and delivered.
    Finalizing,
    /// Output delivered.
    Done,
    /// Aborted by an error or a cancel.
    Failed,
}

impl ExportState {
    /// `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Export position reported once per drawn frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ExportProgress {
    /// Video position of the drawn frame, in seconds.
    pub current_time: f64,
    /// Video duration in seconds.
    pub duration: f64,
}

impl ExportProgress {
    /// `current_time / duration` in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Result of one [`ExportSession::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// A frame was drawn and recorded.
    Frame(ExportProgress),
    /// Playback ended; the file was delivered.
    Finished(DeliveredFile),
}

/// Playable inputs of an export.
pub struct ExportInputs {
    /// Source video.
    pub video: Box<dyn VideoSource>,
    /// Synthesized voice track.
    pub voice: WavContainer,
    /// Captions to burn in.
    pub timeline: Timeline,
}

/// Capabilities an export session draws, mixes, records and delivers with.
pub struct ExportBackends {
    /// Creates the export canvas.
    pub surfaces: Box<dyn SurfaceFactory>,
    /// Audio context carrying the voice into the recording.
    pub graph: Box<dyn AudioGraph>,
    /// Records canvas and audio into the output container.
    pub recorder: Box<dyn Recorder>,
    /// Receives the finished file.
    pub downloads: Box<dyn DownloadTarget>,
    /// Registry for object URLs made during the export.
    pub blobs: BlobStore,
}

struct Prepared {
    canvas: Canvas,
    surface: Box<dyn Surface>,
    audio: AudioTrackInfo,
}

/// One export run: video and voice played in step, composited with captions, recorded, and
/// delivered as a single file.
///
/// The session exclusively owns its canvas, audio graph and recorder. Every exit path (done,
/// failed, cancelled, dropped) pauses both elements, aborts an active recorder, closes the
/// audio graph and revokes the object URLs the session created.
pub struct ExportSession {
    config: ExportConfig,
    fps: Fps,
    style: CaptionStyle,
    state: ExportState,
    video: VideoElement,
    voice: AudioElement,
    timeline: Timeline,
    surfaces: Box<dyn SurfaceFactory>,
    graph: Box<dyn AudioGraph>,
    recorder: Box<dyn Recorder>,
    downloads: Box<dyn DownloadTarget>,
    blobs: BlobStore,
    sync: PlaybackSync,
    prepared: Option<Prepared>,
    frame_index: u64,
    last_caption: Option<String>,
    torn_down: bool,
}

impl std::fmt::Debug for ExportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("frame_index", &self.frame_index)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl ExportSession {
    /// Build an idle session. Decoding the voice registers its object URL in `backends.blobs`.
    pub fn new(
        config: ExportConfig,
        inputs: ExportInputs,
        backends: ExportBackends,
    ) -> DubframeResult<Self> {
        let fps = config.frame_rate()?;
        let voice = AudioElement::from_wav(&backends.blobs, &inputs.voice)?;
        Ok(Self {
            style: config.style.style(),
            config,
            fps,
            state: ExportState::Idle,
            video: VideoElement::new(inputs.video),
            voice,
            timeline: inputs.timeline,
            surfaces: backends.surfaces,
            graph: backends.graph,
            recorder: backends.recorder,
            downloads: backends.downloads,
            blobs: backends.blobs,
            sync: PlaybackSync::new(),
            prepared: None,
            frame_index: 0,
            last_caption: None,
            torn_down: false,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Export settings.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Output canvas, once prepared.
    pub fn canvas(&self) -> Option<Canvas> {
        self.prepared.as_ref().map(|p| p.canvas)
    }

    /// Frames recorded so far.
    pub fn frames_recorded(&self) -> u64 {
        self.frame_index
    }

    /// Video element being exported.
    pub fn video(&self) -> &VideoElement {
        &self.video
    }

    /// Voice element being exported.
    pub fn voice(&self) -> &AudioElement {
        &self.voice
    }

    /// Voice re-sync bookkeeping.
    pub fn sync(&self) -> &PlaybackSync {
        &self.sync
    }

    /// `true` once every resource was released.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Current position over duration.
    pub fn progress(&self) -> ExportProgress {
        ExportProgress {
            current_time: self.video.current_time(),
            duration: self.video.clock().duration(),
        }
    }

    fn expect_state(&self, expected: ExportState, op: &str) -> DubframeResult<()> {
        if self.state != expected {
            return Err(DubframeError::export(format!(
                "cannot {op} while export is {:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn transition(&mut self, next: ExportState) {
        tracing::debug!(from = ?self.state, to = ?next, "export state");
        self.state = next;
    }

    fn fail<T>(&mut self, err: DubframeError) -> DubframeResult<T> {
        tracing::warn!(error = %err, state = ?self.state, "export failed");
        self.transition(ExportState::Failed);
        self.teardown();
        Err(err)
    }

    /// Load metadata, size the canvas, obtain a drawing surface and route the voice into the
    /// audio graph.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn prepare(&mut self) -> DubframeResult<()> {
        self.expect_state(ExportState::Idle, "prepare")?;
        self.transition(ExportState::Preparing);
        match self.try_prepare() {
            Ok(prepared) => {
                tracing::debug!(
                    width = prepared.canvas.width,
                    height = prepared.canvas.height,
                    ratio = %self.config.target_ratio,
                    "export prepared"
                );
                self.prepared = Some(prepared);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn try_prepare(&mut self) -> DubframeResult<Prepared> {
        let info = self.video.load_metadata()?;
        if self.voice.samples().is_empty() {
            return Err(DubframeError::NoAudioTrack);
        }
        let canvas = self.config.target_ratio.canvas_for(info)?;
        let surface = self.surfaces.create_surface(canvas)?;
        if !self.recorder.is_format_supported(self.config.format) {
            return Err(DubframeError::unsupported_format(self.config.format.mime()));
        }
        let audio = self.graph.connect_voice(&self.voice)?;
        Ok(Prepared {
            canvas,
            surface,
            audio,
        })
    }

    /// Start the recorder and play video and voice together.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn start(&mut self) -> DubframeResult<()> {
        self.expect_state(ExportState::Preparing, "start")?;
        let res = self.try_start();
        match res {
            Ok(()) => {
                self.transition(ExportState::Recording);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn try_start(&mut self) -> DubframeResult<()> {
        let prepared = self
            .prepared
            .as_ref()
            .ok_or_else(|| DubframeError::export("export was not prepared"))?;
        self.recorder.start(RecorderConfig {
            width: prepared.canvas.width,
            height: prepared.canvas.height,
            fps: self.fps,
            audio: prepared.audio,
            format: self.config.format,
        })?;
        self.video.play()?;
        self.sync.pump(&mut self.video, &mut self.voice);
        Ok(())
    }

    /// Run one iteration of the render loop.
    ///
    /// While the video plays, the frame at the current position is composited, recorded with
    /// its slice of voice audio, and both elements move one frame ahead. Once the video is
    /// paused or ended the recorder is stopped and the output is delivered.
    pub fn step(&mut self) -> DubframeResult<StepOutcome> {
        self.expect_state(ExportState::Recording, "step")?;
        let clock = self.video.clock();
        if clock.is_paused() || clock.is_ended() {
            return self.finalize().map(StepOutcome::Finished);
        }
        match self.record_frame() {
            Ok(progress) => Ok(StepOutcome::Frame(progress)),
            Err(e) => self.fail(e),
        }
    }

    fn record_frame(&mut self) -> DubframeResult<ExportProgress> {
        let prepared = self
            .prepared
            .as_mut()
            .ok_or_else(|| DubframeError::export("export was not prepared"))?;
        let time = self.video.current_time();

        let frame = self.video.current_frame()?;
        let caption = compose_frame(
            prepared.surface.as_mut(),
            &frame,
            &self.timeline,
            &self.style,
            time,
        )?;
        if caption != self.last_caption.as_deref() {
            tracing::trace!(time, caption, "caption changed");
            self.last_caption = caption.map(str::to_owned);
        }
        let composed = prepared.surface.snapshot()?;
        self.recorder.push_video_frame(&composed)?;

        let frames = samples_for_frame(self.frame_index, self.fps, prepared.audio.sample_rate);
        let audio = if self.voice.is_playing() {
            self.graph.render(self.voice.current_time(), frames)?
        } else {
            vec![0.0; frames * usize::from(prepared.audio.channels)]
        };
        self.recorder.push_audio(&audio)?;

        let progress = ExportProgress {
            current_time: time,
            duration: self.video.clock().duration(),
        };

        let dt = self.fps.frame_duration_secs();
        self.frame_index += 1;
        self.video.advance(dt);
        self.voice.advance(dt);
        self.sync.pump(&mut self.video, &mut self.voice);
        Ok(progress)
    }

    /// Seek the video during recording; the voice follows when it drifted too far.
    pub fn seek(&mut self, secs: f64) -> DubframeResult<()> {
        self.expect_state(ExportState::Recording, "seek")?;
        self.video.seek(secs);
        self.sync.pump(&mut self.video, &mut self.voice);
        Ok(())
    }

    /// Pause the video; the voice pauses with it and the next step finalizes.
    pub fn pause(&mut self) -> DubframeResult<()> {
        self.expect_state(ExportState::Recording, "pause")?;
        self.video.pause();
        self.sync.pump(&mut self.video, &mut self.voice);
        Ok(())
    }

    /// Stop the recorder, join its chunks into one file and deliver it.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn finalize(&mut self) -> DubframeResult<DeliveredFile> {
        self.expect_state(ExportState::Recording, "finalize")?;
        self.transition(ExportState::Finalizing);
        match self.try_finalize() {
            Ok(delivered) => {
                self.teardown();
                self.transition(ExportState::Done);
                tracing::info!(
                    file = %delivered.file_name,
                    bytes = delivered.len,
                    frames = self.frame_index,
                    "export finished"
                );
                Ok(delivered)
            }
            Err(e) => self.fail(e),
        }
    }

    fn try_finalize(&mut self) -> DubframeResult<DeliveredFile> {
        self.video.pause();
        self.sync.pump(&mut self.video, &mut self.voice);

        let chunks = self.recorder.stop()?;
        let bytes: Vec<u8> = chunks.concat();
        if bytes.is_empty() {
            return Err(DubframeError::export("recorder produced no data"));
        }

        let mime = self.config.format.container_mime();
        let url = self.blobs.create(bytes, mime);
        let result = match self.blobs.get(&url) {
            Some(blob) => {
                let name = export_file_name(
                    self.config.target_ratio.label(),
                    timestamp_ms(),
                    self.config.format.extension(),
                );
                self.downloads.deliver(&name, mime, &blob.bytes)
            }
            None => Err(DubframeError::export("output blob vanished before delivery")),
        };
        self.blobs.revoke(&url);
        result
    }

    /// Abort the export and release everything it holds.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        tracing::debug!(state = ?self.state, "export cancelled");
        self.transition(ExportState::Failed);
        self.teardown();
    }

    /// Release every resource. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.video.pause();
        self.video.drain_events();
        self.voice.release();
        if self.recorder.state() == RecorderState::Recording {
            self.recorder.abort();
        }
        if !self.graph.is_closed()
            && let Err(e) = self.graph.close()
        {
            tracing::warn!(error = %e, "failed to close audio graph");
        }
        self.prepared = None;
        tracing::debug!(live_urls = self.blobs.live_count(), "export resources released");
    }

    /// Drive the session from `Idle` to `Done`, reporting progress after each frame.
    pub fn run(
        &mut self,
        mut on_progress: impl FnMut(ExportProgress),
    ) -> DubframeResult<DeliveredFile> {
        self.prepare()?;
        self.start()?;
        loop {
            match self.step()? {
                StepOutcome::Frame(progress) => on_progress(progress),
                StepOutcome::Finished(delivered) => return Ok(delivered),
            }
        }
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        if !self.state.is_terminal() && self.state != ExportState::Idle {
            tracing::warn!(state = ?self.state, "export session dropped mid-run");
        }
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
