use std::io::Cursor;

use crate::captions::style::CaptionStyle;
use crate::captions::timeline::Timeline;
use crate::foundation::core::{Canvas, Color, Point, Rect};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::render::backend::{FrameRGBA, Surface};
use crate::render::caption::render_caption;

/// Smallest caption font size in pixels.
pub const MIN_CAPTION_FONT_PX: f64 = 20.0;
/// Caption font size as a fraction of canvas height.
pub const CAPTION_FONT_FRACTION: f64 = 0.05;
/// Distance of the caption baseline above the bottom edge, as a fraction of canvas height.
pub const CAPTION_BOTTOM_MARGIN: f64 = 0.1;

/// Scale and placement that make a video fully cover a canvas, cropping overflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the video.
    pub ratio: f64,
    /// Horizontal offset of the scaled video; negative when cropped.
    pub shift_x: f64,
    /// Vertical offset of the scaled video; negative when cropped.
    pub shift_y: f64,
    /// Destination rectangle of the scaled video.
    pub dest: Rect,
}

/// Compute the cover-fit of a `video_width x video_height` source onto `canvas`.
pub fn cover_fit(video_width: u32, video_height: u32, canvas: Canvas) -> CoverFit {
    let (vw, vh) = (f64::from(video_width), f64::from(video_height));
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let ratio = (cw / vw).max(ch / vh);
    let shift_x = (cw - vw * ratio) / 2.0;
    let shift_y = (ch - vh * ratio) / 2.0;
    CoverFit {
        ratio,
        shift_x,
        shift_y,
        dest: Rect::new(shift_x, shift_y, shift_x + vw * ratio, shift_y + vh * ratio),
    }
}

/// Caption font size for a canvas of the given height.
pub fn caption_font_size(canvas_height: u32) -> f64 {
    (f64::from(canvas_height) * CAPTION_FONT_FRACTION).max(MIN_CAPTION_FONT_PX)
}

/// Caption anchor: horizontal center, a tenth of the height above the bottom.
pub fn caption_anchor(canvas: Canvas) -> Point {
    let h = f64::from(canvas.height);
    Point::new(f64::from(canvas.width) / 2.0, h - h * CAPTION_BOTTOM_MARGIN)
}

/// Draw one output frame: the cover-fitted video plus the caption active at `time_secs`.
///
/// Returns the caption text that was drawn, if any.
pub fn compose_frame<'t>(
    surface: &mut dyn Surface,
    frame: &FrameRGBA,
    timeline: &'t Timeline,
    style: &CaptionStyle,
    time_secs: f64,
) -> DubframeResult<Option<&'t str>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(DubframeError::input("video frame has no pixels"));
    }
    let canvas = surface.canvas();
    let fit = cover_fit(frame.width, frame.height, canvas);

    surface.clear(Color::BLACK);
    surface.draw_frame(frame, fit.dest)?;

    let Some(sub) = timeline.active_at(time_secs) else {
        return Ok(None);
    };
    render_caption(
        surface,
        style,
        &sub.text,
        caption_anchor(canvas),
        caption_font_size(canvas.height),
    )?;
    Ok(Some(sub.text.as_str()))
}

/// Encode a frame as PNG bytes.
pub fn frame_to_png(frame: &FrameRGBA) -> DubframeResult<Vec<u8>> {
    let rgba = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba())
        .ok_or_else(|| DubframeError::validation("frame buffer does not match its size"))?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| DubframeError::export(format!("png encode failed: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
