use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::pcm::WavContainer;
use crate::captions::timeline::Timeline;
use crate::encode::download::DeliveredFile;
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::media::source::VideoSource;
use crate::session::config::ExportConfig;
use crate::session::export::{
    ExportBackends, ExportInputs, ExportProgress, ExportSession, ExportState, StepOutcome,
};

/// Holds the single export slot until dropped.
#[derive(Debug)]
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        tracing::trace!("export slot released");
    }
}

/// Starts export sessions, allowing at most one at a time.
///
/// Clones share the slot.
#[derive(Clone, Debug, Default)]
pub struct ExportController {
    busy: Arc<AtomicBool>,
}

impl ExportController {
    /// Controller with a free slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a started export has not been dropped.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> DubframeResult<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DubframeError::ExportInProgress)?;
        Ok(SlotGuard(self.busy.clone()))
    }

    /// Validate the request, take the export slot and prepare a session.
    ///
    /// Fails with [`DubframeError::NoAudioTrack`] when no voice was generated,
    /// [`DubframeError::ExportInProgress`] while another export holds the slot,
    /// [`DubframeError::UnsupportedRecordingFormat`] when the recorder cannot produce the
    /// configured format and [`DubframeError::SurfaceUnavailable`] when no canvas can be made.
    #[tracing::instrument(level = "debug", skip_all, fields(ratio = %config.target_ratio, format = ?config.format))]
    pub fn start_export(
        &self,
        video: Box<dyn VideoSource>,
        voice: Option<&WavContainer>,
        timeline: Timeline,
        config: ExportConfig,
        backends: ExportBackends,
    ) -> DubframeResult<ExportHandle> {
        let voice = voice.ok_or(DubframeError::NoAudioTrack)?;
        let slot = self.acquire()?;
        if !backends.recorder.is_format_supported(config.format) {
            return Err(DubframeError::unsupported_format(config.format.mime()));
        }

        let mut session = ExportSession::new(
            config,
            ExportInputs {
                video,
                voice: voice.clone(),
                timeline,
            },
            backends,
        )?;
        session.prepare()?;
        session.start()?;
        Ok(ExportHandle {
            session,
            slot: Some(slot),
        })
    }
}

/// A running export that owns the controller's slot.
///
/// The slot is freed once a step leaves the session `Done` or `Failed`, or when the handle is
/// dropped. Dropping also tears the session down.
#[derive(Debug)]
pub struct ExportHandle {
    session: ExportSession,
    slot: Option<SlotGuard>,
}

impl ExportHandle {
    /// The session being driven.
    pub fn session(&self) -> &ExportSession {
        &self.session
    }

    /// Mutable access, e.g. to seek or pause mid-export.
    pub fn session_mut(&mut self) -> &mut ExportSession {
        &mut self.session
    }

    /// Lifecycle state of the session.
    pub fn state(&self) -> ExportState {
        self.session.state()
    }

    /// Run one render-loop iteration.
    pub fn step(&mut self) -> DubframeResult<StepOutcome> {
        let outcome = self.session.step();
        self.release_if_finished();
        outcome
    }

    /// `true` while this handle still holds the controller's slot.
    pub fn holds_slot(&self) -> bool {
        self.slot.is_some()
    }

    fn release_if_finished(&mut self) {
        if self.session.state().is_terminal() {
            self.slot.take();
        }
    }

    /// Stop and tear down without producing output.
    pub fn cancel(mut self) {
        self.session.cancel();
    }

    /// Drive the export to completion, reporting progress after each frame.
    pub fn run(
        mut self,
        mut on_progress: impl FnMut(ExportProgress),
    ) -> DubframeResult<DeliveredFile> {
        loop {
            match self.step()? {
                StepOutcome::Frame(progress) => on_progress(progress),
                StepOutcome::Finished(delivered) => return Ok(delivered),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
