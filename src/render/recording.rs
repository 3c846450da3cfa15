use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::core::{Canvas, Color, Point, Rect};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::render::backend::{
    FontSpec, FrameRGBA, ShadowSpec, Surface, SurfaceFactory, TextAlign, TextBaseline,
};

/// One call made against a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Surface cleared.
    Clear(Color),
    /// Video frame drawn.
    DrawFrame {
        /// Source frame width.
        src_width: u32,
        /// Source frame height.
        src_height: u32,
        /// Destination rectangle on the surface.
        dest: Rect,
    },
    /// Font changed.
    SetFont(FontSpec),
    /// Text anchor changed.
    SetTextAlign(TextAlign, TextBaseline),
    /// Shadow set or cleared.
    SetShadow(Option<ShadowSpec>),
    /// Rectangle filled.
    FillRect {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Rounded rectangle filled.
    FillRoundedRect {
        /// Filled area.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Fill color.
        color: Color,
    },
    /// Text outline stroked.
    StrokeText {
        /// Stroked text.
        text: String,
        /// Anchor point.
        at: Point,
        /// Line width in pixels.
        line_width: f64,
        /// Stroke color.
        color: Color,
        /// Shadow in effect for this call.
        shadow: Option<ShadowSpec>,
    },
    /// Text filled.
    FillText {
        /// Filled text.
        text: String,
        /// Anchor point.
        at: Point,
        /// Fill color.
        color: Color,
        /// Shadow in effect for this call.
        shadow: Option<ShadowSpec>,
    },
}

/// Shared, cloneable list of recorded draw calls.
#[derive(Clone, Debug, Default)]
pub struct CommandLog(Arc<Mutex<Vec<DrawCommand>>>);

impl CommandLog {
    fn lock(&self) -> MutexGuard<'_, Vec<DrawCommand>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, cmd: DrawCommand) {
        self.lock().push(cmd);
    }

    /// Copy of the calls recorded so far.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.lock().clone()
    }

    /// Drain recorded calls.
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.lock())
    }
}

/// A [`Surface`] that draws nothing and records every call.
///
/// Text measures as `0.5 * font size` per character so layout math is predictable.
#[derive(Debug)]
pub struct RecordingSurface {
    canvas: Canvas,
    font: FontSpec,
    shadow: Option<ShadowSpec>,
    log: CommandLog,
}

impl RecordingSurface {
    /// Empty recording for a surface of the given size.
    pub fn new(canvas: Canvas) -> Self {
        Self::with_log(canvas, CommandLog::default())
    }

    /// Surface appending to an existing log.
    pub fn with_log(canvas: Canvas, log: CommandLog) -> Self {
        Self {
            canvas,
            font: FontSpec::default(),
            shadow: None,
            log,
        }
    }

    /// Handle to this surface's log.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// Copy of the calls recorded so far.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.log.commands()
    }

    /// Shadow currently in effect.
    pub fn current_shadow(&self) -> Option<ShadowSpec> {
        self.shadow
    }
}

impl Surface for RecordingSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, color: Color) {
        self.log.push(DrawCommand::Clear(color));
    }

    fn draw_frame(&mut self, frame: &FrameRGBA, dest: Rect) -> DubframeResult<()> {
        self.log.push(DrawCommand::DrawFrame {
            src_width: frame.width,
            src_height: frame.height,
            dest,
        });
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
        self.log.push(DrawCommand::SetFont(font.clone()));
    }

    fn set_text_align(&mut self, align: TextAlign, baseline: TextBaseline) {
        self.log.push(DrawCommand::SetTextAlign(align, baseline));
    }

    fn measure_text(&mut self, text: &str) -> DubframeResult<f64> {
        Ok(text.chars().count() as f64 * self.font.size_px * 0.5)
    }

    fn set_shadow(&mut self, shadow: Option<ShadowSpec>) {
        self.shadow = shadow;
        self.log.push(DrawCommand::SetShadow(shadow));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> DubframeResult<()> {
        self.log.push(DrawCommand::FillRect { rect, color });
        Ok(())
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) -> DubframeResult<()> {
        self.log.push(DrawCommand::FillRoundedRect {
            rect,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_text(
        &mut self,
        text: &str,
        at: Point,
        line_width: f64,
        color: Color,
    ) -> DubframeResult<()> {
        self.log.push(DrawCommand::StrokeText {
            text: text.to_owned(),
            at,
            line_width,
            color,
            shadow: self.shadow,
        });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, at: Point, color: Color) -> DubframeResult<()> {
        self.log.push(DrawCommand::FillText {
            text: text.to_owned(),
            at,
            color,
            shadow: self.shadow,
        });
        Ok(())
    }

    fn snapshot(&self) -> DubframeResult<FrameRGBA> {
        Ok(FrameRGBA::solid(
            self.canvas.width,
            self.canvas.height,
            Color::TRANSPARENT,
        ))
    }
}

/// Factory handing out [`RecordingSurface`]s that share one log, or failing on demand.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurfaceFactory {
    /// When set, every request fails as if no drawing context could be obtained.
    pub unavailable: bool,
    log: CommandLog,
}

impl RecordingSurfaceFactory {
    /// Factory with an empty shared log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose every request fails, as when no drawing context can be obtained.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Log shared by every surface this factory creates.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

impl SurfaceFactory for RecordingSurfaceFactory {
    fn create_surface(&mut self, canvas: Canvas) -> DubframeResult<Box<dyn Surface>> {
        if self.unavailable {
            return Err(DubframeError::surface_unavailable(
                "no 2d context for the export canvas",
            ));
        }
        Ok(Box::new(RecordingSurface::with_log(canvas, self.log.clone())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
