use crate::foundation::core::{Canvas, Color, Point, Rect};
use crate::foundation::error::{DubframeError, DubframeResult};

/// A rendered RGBA8 frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with one color, stored premultiplied.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let px = color.premultiplied().to_array();
        Self {
            width,
            height,
            data: px.repeat(width as usize * height as usize),
            premultiplied: true,
        }
    }

    /// Wrap premultiplied bytes after checking their length.
    pub fn from_premul_bytes(width: u32, height: u32, data: Vec<u8>) -> DubframeResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| DubframeError::validation("frame buffer size overflow"))?;
        if data.len() != expected {
            return Err(DubframeError::validation(format!(
                "frame expects {expected} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Bytes of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(idx..idx + 4)
            .and_then(|px| <[u8; 4]>::try_from(px).ok())
    }

    /// Copy the frame as straight-alpha RGBA8, as expected by encoders and image files.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        out
    }
}

/// A CSS-like font selection.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// Family name.
    pub family: String,
    /// Numeric weight (400 normal, 700 bold).
    pub weight: u16,
    /// Italic face.
    pub italic: bool,
    /// Size in pixels.
    pub size_px: f64,
}

impl FontSpec {
    /// Render as a canvas font string, e.g. `italic 700 54px Georgia`.
    pub fn css(&self) -> String {
        let style = if self.italic { "italic " } else { "" };
        format!(
            "{style}{} {}px {}",
            self.weight,
            trim_float(self.size_px),
            self.family
        )
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_owned(),
            weight: 400,
            italic: false,
            size_px: 10.0,
        }
    }
}

fn trim_float(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextAlign {
    /// Anchor at the left edge.
    #[default]
    Left,
    /// Anchor at the horizontal center.
    Center,
    /// Anchor at the right edge.
    Right,
}

/// Vertical text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextBaseline {
    /// Anchor at the top of the line box.
    Top,
    /// Anchor at the middle of the line box.
    Middle,
    /// Anchor at the alphabetic baseline.
    #[default]
    Alphabetic,
    /// Anchor at the bottom of the line box.
    Bottom,
}

/// Shadow applied to subsequent draw calls.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShadowSpec {
    /// Shadow color; a transparent color disables the shadow.
    pub color: Color,
    /// Blur amount in pixels.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl ShadowSpec {
    /// Return `true` when the shadow would draw nothing.
    pub fn is_visible(&self) -> bool {
        !self.color.is_transparent()
    }
}

/// A 2D drawing surface the compositor and caption renderer paint onto.
///
/// Mirrors the small slice of canvas state the export loop needs: current font, text anchor
/// and shadow persist between calls until changed.
pub trait Surface {
    /// Surface dimensions.
    fn canvas(&self) -> Canvas;

    /// Fill every pixel with `color`, ignoring shadow state.
    fn clear(&mut self, color: Color);

    /// Draw a whole video frame scaled into `dest`. Parts outside the surface are clipped.
    fn draw_frame(&mut self, frame: &FrameRGBA, dest: Rect) -> DubframeResult<()>;

    /// Set the font used by text calls.
    fn set_font(&mut self, font: &FontSpec);

    /// Set the text anchor.
    fn set_text_align(&mut self, align: TextAlign, baseline: TextBaseline);

    /// Advance width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> DubframeResult<f64>;

    /// Set or clear the shadow used by subsequent fills and strokes.
    fn set_shadow(&mut self, shadow: Option<ShadowSpec>);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color) -> DubframeResult<()>;

    /// Fill a rectangle with rounded corners.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) -> DubframeResult<()>;

    /// Stroke glyph outlines of `text` anchored at `at`.
    fn stroke_text(
        &mut self,
        text: &str,
        at: Point,
        line_width: f64,
        color: Color,
    ) -> DubframeResult<()>;

    /// Fill `text` anchored at `at`.
    fn fill_text(&mut self, text: &str, at: Point, color: Color) -> DubframeResult<()>;

    /// Capture the current pixels.
    fn snapshot(&self) -> DubframeResult<FrameRGBA>;
}

/// Creates one exclusive [`Surface`] per export session.
pub trait SurfaceFactory {
    /// Create a surface of the given size, failing with
    /// [`DubframeError::SurfaceUnavailable`] when none can be provided.
    fn create_surface(&mut self, canvas: Canvas) -> DubframeResult<Box<dyn Surface>>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
