use super::*;
use crate::captions::style::CaptionPreset;
use crate::render::recording::{DrawCommand, RecordingSurface};

#[test]
fn landscape_into_portrait_crops_horizontally() {
    let canvas = Canvas::new(1080, 1920).unwrap();
    let fit = cover_fit(1920, 1080, canvas);
    assert!((fit.ratio - 1920.0 / 1080.0).abs() < 1e-12);
    assert!(fit.shift_x < 0.0);
    assert!(fit.shift_y.abs() < 1e-9);
    assert!(fit.dest.x0 <= 0.0 && fit.dest.x1 >= 1080.0);
    assert!((fit.dest.height() - 1920.0).abs() < 1e-9);
}

#[test]
fn same_aspect_fills_exactly() {
    let fit = cover_fit(640, 360, Canvas::new(1280, 720).unwrap());
    assert_eq!(fit.ratio, 2.0);
    assert_eq!(fit.dest, Rect::new(0.0, 0.0, 1280.0, 720.0));
}

#[test]
fn font_size_has_twenty_pixel_floor() {
    assert_eq!(caption_font_size(240), 20.0);
    assert!((caption_font_size(1080) - 54.0).abs() < 1e-9);
}

#[test]
fn anchor_is_bottom_center() {
    let p = caption_anchor(Canvas::new(1280, 720).unwrap());
    assert_eq!(p.x, 640.0);
    assert!((p.y - 648.0).abs() < 1e-9);
}

#[test]
fn frame_with_active_caption_draws_video_then_text() {
    let canvas = Canvas::new(1280, 720).unwrap();
    let mut s = RecordingSurface::new(canvas);
    let timeline = Timeline::parse("[00:01] Hello\n[00:07] World");
    let frame = FrameRGBA::solid(640, 360, Color::WHITE);

    let drawn = compose_frame(&mut s, &frame, &timeline, &CaptionPreset::Classic.style(), 2.0)
        .unwrap();
    assert_eq!(drawn, Some("Hello"));

    let cmds = s.commands();
    assert_eq!(cmds[0], DrawCommand::Clear(Color::BLACK));
    assert!(matches!(cmds[1], DrawCommand::DrawFrame { src_width: 640, .. }));
    assert!(cmds.iter().any(|c| matches!(
        c,
        DrawCommand::FillText { text, at, .. } if text == "Hello" && (at.y - 648.0).abs() < 1e-9
    )));
}

#[test]
fn frame_outside_windows_draws_only_video() {
    let mut s = RecordingSurface::new(Canvas::new(320, 240).unwrap());
    let timeline = Timeline::parse("[00:01] Hello");
    let frame = FrameRGBA::solid(4, 3, Color::WHITE);
    let drawn =
        compose_frame(&mut s, &frame, &timeline, &CaptionPreset::Classic.style(), 9.0).unwrap();
    assert_eq!(drawn, None);
    assert_eq!(s.commands().len(), 2);
}

#[test]
fn png_output_has_signature() {
    let png = frame_to_png(&FrameRGBA::solid(3, 2, Color::rgb(1, 2, 3))).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}
