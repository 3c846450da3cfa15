use super::*;
use crate::captions::style::CaptionPreset;
use crate::foundation::core::{Canvas, Color};
use crate::render::recording::{DrawCommand, RecordingSurface};

fn surface() -> RecordingSurface {
    RecordingSurface::new(Canvas::new(1280, 720).unwrap())
}

fn draw(preset: CaptionPreset, text: &str) -> Vec<DrawCommand> {
    let mut s = surface();
    render_caption(&mut s, &preset.style(), text, Point::new(640.0, 648.0), 36.0).unwrap();
    s.commands()
}

#[test]
fn font_and_center_bottom_anchor_come_first() {
    let cmds = draw(CaptionPreset::Cinematic, "Hello");
    let DrawCommand::SetFont(font) = &cmds[0] else {
        panic!("expected font first, got {:?}", cmds[0]);
    };
    assert_eq!(font.css(), "italic 400 36px Georgia");
    assert_eq!(
        cmds[1],
        DrawCommand::SetTextAlign(TextAlign::Center, TextBaseline::Bottom)
    );
}

#[test]
fn stroke_is_drawn_before_fill_and_shadow_is_reset() {
    let cmds = draw(CaptionPreset::Classic, "Hi");
    let stroke_at = cmds
        .iter()
        .position(|c| matches!(c, DrawCommand::StrokeText { .. }))
        .unwrap();
    let fill_at = cmds
        .iter()
        .position(|c| matches!(c, DrawCommand::FillText { .. }))
        .unwrap();
    assert!(stroke_at < fill_at);
    assert_eq!(cmds.last(), Some(&DrawCommand::SetShadow(None)));

    let DrawCommand::StrokeText {
        line_width,
        color,
        shadow,
        ..
    } = &cmds[stroke_at]
    else {
        unreachable!();
    };
    assert!((line_width - 3.6).abs() < 1e-9);
    assert_eq!(*color, Color::BLACK);
    assert_eq!(shadow.map(|s| (s.blur, s.offset_y)), Some((4.0, 2.0)));
}

#[test]
fn square_background_box_sits_around_baseline() {
    let cmds = draw(CaptionPreset::BlackBox, "Hello");
    let rect = cmds
        .iter()
        .find_map(|c| match c {
            DrawCommand::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .unwrap();
    // five chars at 18px each, padding 0.3 * 36
    let text_width = 90.0;
    let pad = 10.8;
    assert!((rect.x0 - (640.0 - text_width / 2.0 - pad)).abs() < 1e-9);
    assert!((rect.y0 - (648.0 - 36.0 - pad + 7.2)).abs() < 1e-9);
    assert!((rect.width() - (text_width + 2.0 * pad)).abs() < 1e-9);
    assert!((rect.height() - (36.0 + 2.0 * pad)).abs() < 1e-9);
}

#[test]
fn rounded_box_used_when_radius_positive() {
    let cmds = draw(CaptionPreset::Vlog, "Hey");
    let radius = cmds.iter().find_map(|c| match c {
        DrawCommand::FillRoundedRect { radius, .. } => Some(*radius),
        _ => None,
    });
    assert_eq!(radius, Some(18.0));
    assert!(!cmds.iter().any(|c| matches!(c, DrawCommand::FillRect { .. })));
}

#[test]
fn style_without_shadow_draws_fill_unshadowed() {
    let cmds = draw(CaptionPreset::BlueBox, "x");
    let shadow = cmds.iter().find_map(|c| match c {
        DrawCommand::FillText { shadow, .. } => Some(*shadow),
        _ => None,
    });
    assert_eq!(shadow, Some(None));
    assert!(!cmds.iter().any(|c| matches!(c, DrawCommand::StrokeText { .. })));
}

#[test]
fn neon_adds_wider_glow_pass_in_stroke_color() {
    let cmds = draw(CaptionPreset::NeonPink, "glow");
    let strokes: Vec<_> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokeText { shadow, color, .. } => Some((*shadow, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(strokes.len(), 2);
    let glow = strokes[0].0.unwrap();
    let normal = strokes[1].0.unwrap();
    assert_eq!(glow.color, Color::hex(0xFF00FF));
    assert_eq!(strokes[0].1, Color::hex(0xFF00FF));
    assert!(glow.blur > normal.blur);
}

#[test]
fn rendering_twice_records_identical_calls() {
    for preset in CaptionPreset::ALL {
        assert_eq!(draw(preset, "Same text"), draw(preset, "Same text"));
    }
}

#[test]
fn style_is_not_mutated() {
    let style = CaptionPreset::Comic.style();
    let before = style.clone();
    let mut s = surface();
    render_caption(&mut s, &style, "Pow", Point::new(10.0, 10.0), 20.0).unwrap();
    assert_eq!(style, before);
}
