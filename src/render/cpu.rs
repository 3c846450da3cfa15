use std::sync::Arc;

use crate::foundation::core::{Canvas, Color, Point, Rect};
use crate::foundation::error::{DubframeError, DubframeResult};
use crate::foundation::math::{mul_div255_u8, premul_over_in_place};
use crate::render::backend::{
    FontSpec, FrameRGBA, ShadowSpec, Surface, SurfaceFactory, TextAlign, TextBaseline,
};
use crate::render::blur::{blur_rgba8_premul, shadow_kernel_params};
use crate::render::text::{TextLayoutEngine, line_metrics};

/// Software [`Surface`] rasterized with `vello_cpu`, with text shaped by `parley`.
///
/// Each draw call is rendered into a cleared scratch layer and then composited over the
/// canvas, so a shadow can be derived from exactly what that call painted.
pub struct CpuSurface {
    canvas: Canvas,
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    layer: vello_cpu::Pixmap,
    text: Option<TextLayoutEngine>,
    font: FontSpec,
    align: TextAlign,
    baseline: TextBaseline,
    shadow: Option<ShadowSpec>,
}

impl CpuSurface {
    /// Create a transparent surface. Without `font_bytes` every text call fails.
    pub fn new(canvas: Canvas, font_bytes: Option<&[u8]>) -> DubframeResult<Self> {
        let width: u16 = canvas.width.try_into().map_err(|_| {
            DubframeError::surface_unavailable(format!("width {} exceeds u16", canvas.width))
        })?;
        let height: u16 = canvas.height.try_into().map_err(|_| {
            DubframeError::surface_unavailable(format!("height {} exceeds u16", canvas.height))
        })?;
        let text = font_bytes.map(TextLayoutEngine::new).transpose()?;

        Ok(Self {
            canvas,
            width,
            height,
            pixels: vec![0u8; canvas.width as usize * canvas.height as usize * 4],
            layer: vello_cpu::Pixmap::new(width, height),
            text,
            font: FontSpec::default(),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
            shadow: None,
        })
    }

    /// Family name of the loaded caption font.
    pub fn font_family(&self) -> Option<&str> {
        self.text.as_ref().map(TextLayoutEngine::family_name)
    }

    fn paint_layer(
        &mut self,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> DubframeResult<()> {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw(&mut ctx);
        ctx.flush();
        clear_pixmap(&mut self.layer);
        ctx.render_to_pixmap(&mut self.layer);

        composite_layer(
            &mut self.pixels,
            self.layer.data_as_u8_slice(),
            self.canvas,
            self.shadow,
        )
    }

    fn text_engine(&mut self) -> DubframeResult<&mut TextLayoutEngine> {
        self.text
            .as_mut()
            .ok_or_else(|| DubframeError::resource("no caption font loaded"))
    }

    fn draw_text(&mut self, text: &str, at: Point, pass: TextPass) -> DubframeResult<()> {
        let font = self.font.clone();
        let (align, baseline) = (self.align, self.baseline);
        let engine = self.text_engine()?;
        let layout = engine.layout_line(text, &font)?;
        let font_data = engine.font_data().clone();

        let m = line_metrics(&layout);
        let x = match align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - m.width / 2.0,
            TextAlign::Right => at.x - m.width,
        };
        let y = match baseline {
            TextBaseline::Top => at.y,
            TextBaseline::Middle => at.y - m.height / 2.0,
            TextBaseline::Alphabetic => at.y - m.baseline,
            TextBaseline::Bottom => at.y - m.height,
        };

        self.paint_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
            match pass {
                TextPass::Fill(color) => ctx.set_paint(to_cpu_color(color)),
                TextPass::Stroke(color, width) => {
                    ctx.set_paint(to_cpu_color(color));
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                }
            }
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    let builder = ctx.glyph_run(&font_data).font_size(run.run().font_size());
                    match pass {
                        TextPass::Fill(_) => builder.fill_glyphs(glyphs),
                        TextPass::Stroke(..) => builder.stroke_glyphs(glyphs),
                    }
                }
            }
        })
    }
}

#[derive(Clone, Copy)]
enum TextPass {
    Fill(Color),
    Stroke(Color, f64),
}

impl Surface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, color: Color) {
        let px = color.premultiplied().to_array();
        for dst in self.pixels.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    fn draw_frame(&mut self, frame: &FrameRGBA, dest: Rect) -> DubframeResult<()> {
        if frame.width == 0 || frame.height == 0 {
            return Err(DubframeError::validation("cannot draw an empty video frame"));
        }
        let pixmap = premul_bytes_to_pixmap(frame)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let (fw, fh) = (f64::from(frame.width), f64::from(frame.height));
        let sx = dest.width() / fw;
        let sy = dest.height() / fh;

        self.paint_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::new([
                sx, 0.0, 0.0, sy, dest.x0, dest.y0,
            ]));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, fw, fh));
        })
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
    }

    fn set_text_align(&mut self, align: TextAlign, baseline: TextBaseline) {
        self.align = align;
        self.baseline = baseline;
    }

    fn measure_text(&mut self, text: &str) -> DubframeResult<f64> {
        let font = self.font.clone();
        let layout = self.text_engine()?.layout_line(text, &font)?;
        Ok(line_metrics(&layout).width)
    }

    fn set_shadow(&mut self, shadow: Option<ShadowSpec>) {
        self.shadow = shadow;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> DubframeResult<()> {
        self.paint_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(to_cpu_color(color));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                rect.x0, rect.y0, rect.x1, rect.y1,
            ));
        })
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) -> DubframeResult<()> {
        use vello_cpu::kurbo::Shape as _;

        let rr = vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, radius);
        let mut path = vello_cpu::kurbo::BezPath::new();
        for el in rr.path_elements(0.1) {
            path.push(el);
        }
        self.paint_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(to_cpu_color(color));
            ctx.fill_path(&path);
        })
    }

    fn stroke_text(
        &mut self,
        text: &str,
        at: Point,
        line_width: f64,
        color: Color,
    ) -> DubframeResult<()> {
        self.draw_text(text, at, TextPass::Stroke(color, line_width))
    }

    fn fill_text(&mut self, text: &str, at: Point, color: Color) -> DubframeResult<()> {
        self.draw_text(text, at, TextPass::Fill(color))
    }

    fn snapshot(&self) -> DubframeResult<FrameRGBA> {
        FrameRGBA::from_premul_bytes(self.canvas.width, self.canvas.height, self.pixels.clone())
    }
}

/// [`SurfaceFactory`] producing [`CpuSurface`]s that share one caption font.
#[derive(Clone, Debug, Default)]
pub struct CpuSurfaceFactory {
    font_bytes: Option<Arc<[u8]>>,
}

impl CpuSurfaceFactory {
    /// Factory whose surfaces render text with `font_bytes`.
    pub fn new(font_bytes: Option<Vec<u8>>) -> Self {
        Self {
            font_bytes: font_bytes.map(Arc::from),
        }
    }
}

impl SurfaceFactory for CpuSurfaceFactory {
    fn create_surface(&mut self, canvas: Canvas) -> DubframeResult<Box<dyn Surface>> {
        let surface = CpuSurface::new(canvas, self.font_bytes.as_deref())?;
        Ok(Box::new(surface))
    }
}

fn to_cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn premul_bytes_to_pixmap(frame: &FrameRGBA) -> DubframeResult<vello_cpu::Pixmap> {
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| DubframeError::validation("frame width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| DubframeError::validation("frame height exceeds u16"))?;
    if frame.data.len() != frame.width as usize * frame.height as usize * 4 {
        return Err(DubframeError::validation("frame byte length mismatch"));
    }

    let bytes: std::borrow::Cow<'_, [u8]> = if frame.premultiplied {
        std::borrow::Cow::Borrowed(&frame.data)
    } else {
        let mut data = frame.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = mul_div255_u8(u16::from(*c), a);
            }
        }
        std::borrow::Cow::Owned(data)
    };

    let mut may_have_opacities = false;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Composite one draw call's layer onto the canvas, shadow first.
fn composite_layer(
    dst: &mut [u8],
    layer: &[u8],
    canvas: Canvas,
    shadow: Option<ShadowSpec>,
) -> DubframeResult<()> {
    if let Some(shadow) = shadow.filter(ShadowSpec::is_visible)
        && let Some(bounds) = opaque_bounds(layer, canvas)
    {
        draw_shadow(dst, layer, canvas, bounds, shadow)?;
    }
    premul_over_in_place(dst, layer);
    Ok(())
}

/// Inclusive-exclusive pixel box `(x0, y0, x1, y1)`.
type PixelBox = (u32, u32, u32, u32);

fn opaque_bounds(layer: &[u8], canvas: Canvas) -> Option<PixelBox> {
    let w = canvas.width as usize;
    let mut bounds: Option<PixelBox> = None;
    for (i, px) in layer.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let (x, y) = ((i % w) as u32, (i / w) as u32);
        bounds = Some(match bounds {
            None => (x, y, x + 1, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
        });
    }
    bounds
}

fn draw_shadow(
    dst: &mut [u8],
    layer: &[u8],
    canvas: Canvas,
    bounds: PixelBox,
    shadow: ShadowSpec,
) -> DubframeResult<()> {
    let (radius, sigma) = shadow_kernel_params(shadow.blur);
    let (x0, y0, x1, y1) = bounds;
    let bx0 = x0.saturating_sub(radius);
    let by0 = y0.saturating_sub(radius);
    let bx1 = (x1 + radius).min(canvas.width);
    let by1 = (y1 + radius).min(canvas.height);
    let (bw, bh) = (bx1 - bx0, by1 - by0);

    let tint = shadow.color.premultiplied();
    let cw = canvas.width as usize;
    let mut tinted = vec![0u8; bw as usize * bh as usize * 4];
    for row in 0..bh as usize {
        for col in 0..bw as usize {
            let src = ((by0 as usize + row) * cw + bx0 as usize + col) * 4;
            let a = u16::from(layer[src + 3]);
            if a == 0 {
                continue;
            }
            let out = (row * bw as usize + col) * 4;
            tinted[out] = mul_div255_u8(u16::from(tint.r), a);
            tinted[out + 1] = mul_div255_u8(u16::from(tint.g), a);
            tinted[out + 2] = mul_div255_u8(u16::from(tint.b), a);
            tinted[out + 3] = mul_div255_u8(u16::from(tint.a), a);
        }
    }
    let blurred = blur_rgba8_premul(&tinted, bw, bh, radius, sigma)?;

    let dx = shadow.offset_x.round() as i64;
    let dy = shadow.offset_y.round() as i64;
    for row in 0..i64::from(bh) {
        let ty = i64::from(by0) + row + dy;
        if ty < 0 || ty >= i64::from(canvas.height) {
            continue;
        }
        for col in 0..i64::from(bw) {
            let tx = i64::from(bx0) + col + dx;
            if tx < 0 || tx >= i64::from(canvas.width) {
                continue;
            }
            let s = ((row * i64::from(bw) + col) * 4) as usize;
            let d = ((ty * i64::from(canvas.width) + tx) * 4) as usize;
            premul_over_in_place(&mut dst[d..d + 4], &blurred[s..s + 4]);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
