use crate::captions::style::CaptionStyle;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::DubframeResult;
use crate::render::backend::{FontSpec, ShadowSpec, Surface, TextAlign, TextBaseline};

/// Glow blur relative to the style's own shadow blur.
const NEON_GLOW_SCALE: f64 = 2.0;
/// Glow blur relative to font size when the style has no shadow blur to scale.
const NEON_GLOW_FONT_FRACTION: f64 = 0.3;
/// Downward nudge of the background box, as a fraction of font size, so it sits around glyphs
/// drawn on a bottom baseline.
const BACKGROUND_BASELINE_NUDGE: f64 = 0.2;

/// Font a caption is drawn with at `font_size_px`.
pub fn caption_font(style: &CaptionStyle, font_size_px: f64) -> FontSpec {
    FontSpec {
        family: style.font_family.clone(),
        weight: style.font_weight,
        italic: style.italic,
        size_px: font_size_px,
    }
}

/// Box behind a caption of `text_width` centered on `anchor`'s x with its bottom baseline at
/// `anchor`'s y.
pub fn background_rect(anchor: Point, text_width: f64, font_size_px: f64, padding: f64) -> Rect {
    let x = anchor.x - text_width / 2.0 - padding;
    let y = anchor.y - font_size_px - padding + font_size_px * BACKGROUND_BASELINE_NUDGE;
    Rect::new(
        x,
        y,
        x + text_width + 2.0 * padding,
        y + font_size_px + 2.0 * padding,
    )
}

/// Draw `text` in `style`, horizontally centered on `anchor.x` with its bottom at `anchor.y`.
///
/// Order: background box, optional neon glow, stroke, fill. The shadow is cleared afterwards
/// even when a draw call fails, so it never leaks into the next video draw.
pub fn render_caption(
    surface: &mut dyn Surface,
    style: &CaptionStyle,
    text: &str,
    anchor: Point,
    font_size_px: f64,
) -> DubframeResult<()> {
    let result = draw_passes(surface, style, text, anchor, font_size_px);
    surface.set_shadow(None);
    result
}

fn draw_passes(
    surface: &mut dyn Surface,
    style: &CaptionStyle,
    text: &str,
    anchor: Point,
    font_size_px: f64,
) -> DubframeResult<()> {
    surface.set_font(&caption_font(style, font_size_px));
    surface.set_text_align(TextAlign::Center, TextBaseline::Bottom);

    if let Some(bg) = style.background {
        let text_width = surface.measure_text(text)?;
        let padding = font_size_px * bg.padding;
        let radius = font_size_px * bg.radius;
        let rect = background_rect(anchor, text_width, font_size_px, padding);
        if radius > 0.0 {
            surface.fill_rounded_rect(rect, radius, bg.color)?;
        } else {
            surface.fill_rect(rect, bg.color)?;
        }
    }

    if style.neon
        && let Some(stroke) = style.stroke
    {
        let blur = match style.shadow {
            Some(shadow) if shadow.blur > 0.0 => shadow.blur * NEON_GLOW_SCALE,
            _ => font_size_px * NEON_GLOW_FONT_FRACTION,
        };
        surface.set_shadow(Some(ShadowSpec {
            color: stroke.color,
            blur,
            offset_x: 0.0,
            offset_y: 0.0,
        }));
        surface.stroke_text(text, anchor, font_size_px * stroke.width, stroke.color)?;
    }

    surface.set_shadow(style.shadow.map(|s| ShadowSpec {
        color: s.color,
        blur: s.blur,
        offset_x: s.offset_x,
        offset_y: s.offset_y,
    }));

    if let Some(stroke) = style.stroke {
        surface.stroke_text(text, anchor, font_size_px * stroke.width, stroke.color)?;
    }

    surface.fill_text(text, anchor, style.text_color)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
