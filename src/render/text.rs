use crate::foundation::error::{DubframeError, DubframeResult};
use crate::render::backend::FontSpec;

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Parley contexts plus the caption font registered into them.
///
/// Only the registered face is available; the family named in a [`FontSpec`] is ignored and
/// weight and style are matched against that face.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font_data: vello_cpu::peniko::FontData,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and keep its family for all later layouts.
    pub(crate) fn new(font_bytes: &[u8]) -> DubframeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            DubframeError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| DubframeError::validation("registered font family has no name"))?
            .to_string();
        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );

        tracing::debug!(family = %family_name, "registered caption font");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_data,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.font_data
    }

    /// Shape `text` on a single line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &FontSpec,
    ) -> DubframeResult<parley::Layout<TextBrushRgba8>> {
        let size_px = font.size_px as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(DubframeError::validation(
                "font size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(font.weight)),
        ));
        if font.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(
            TextBrushRgba8::default(),
        ));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

/// Advance width and vertical metrics of a single-line layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LineMetrics {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) baseline: f64,
}

pub(crate) fn line_metrics(layout: &parley::Layout<TextBrushRgba8>) -> LineMetrics {
    let height = f64::from(layout.height());
    let baseline = layout
        .lines()
        .next()
        .map(|line| f64::from(line.metrics().baseline))
        .unwrap_or(height);
    LineMetrics {
        width: f64::from(layout.width()),
        height,
        baseline,
    }
}
