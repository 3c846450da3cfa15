use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn system_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

#[test]
fn clear_fills_every_pixel() {
    let mut s = CpuSurface::new(canvas(3, 2), None).unwrap();
    s.clear(Color::rgb(10, 20, 30));
    let snap = s.snapshot().unwrap();
    assert!(snap.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}

#[test]
fn fill_rect_paints_only_inside() {
    let mut s = CpuSurface::new(canvas(8, 8), None).unwrap();
    s.clear(Color::BLACK);
    s.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Color::WHITE)
        .unwrap();
    let snap = s.snapshot().unwrap();
    assert_eq!(snap.pixel(4, 4), Some([255, 255, 255, 255]));
    assert_eq!(snap.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(snap.pixel(7, 7), Some([0, 0, 0, 255]));
}

#[test]
fn shadow_is_offset_from_shape() {
    let mut s = CpuSurface::new(canvas(16, 16), None).unwrap();
    s.set_shadow(Some(ShadowSpec {
        color: Color::rgb(255, 0, 0),
        blur: 0.0,
        offset_x: 4.0,
        offset_y: 0.0,
    }));
    s.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Color::WHITE)
        .unwrap();
    let snap = s.snapshot().unwrap();
    assert_eq!(snap.pixel(3, 3), Some([255, 255, 255, 255]));
    assert_eq!(snap.pixel(8, 3), Some([255, 0, 0, 255]));
    assert_eq!(snap.pixel(12, 3), Some([0, 0, 0, 0]));
}

#[test]
fn cleared_shadow_no_longer_applies() {
    let mut s = CpuSurface::new(canvas(16, 16), None).unwrap();
    s.set_shadow(Some(ShadowSpec {
        color: Color::rgb(255, 0, 0),
        blur: 0.0,
        offset_x: 4.0,
        offset_y: 0.0,
    }));
    s.set_shadow(None);
    s.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Color::WHITE)
        .unwrap();
    assert_eq!(s.snapshot().unwrap().pixel(8, 3), Some([0, 0, 0, 0]));
}

#[test]
fn draw_frame_scales_into_destination() {
    let mut s = CpuSurface::new(canvas(8, 4), None).unwrap();
    let frame = FrameRGBA::solid(2, 1, Color::rgb(0, 255, 0));
    s.draw_frame(&frame, Rect::new(0.0, 0.0, 8.0, 4.0)).unwrap();
    let snap = s.snapshot().unwrap();
    assert_eq!(snap.pixel(0, 0), Some([0, 255, 0, 255]));
    assert_eq!(snap.pixel(7, 3), Some([0, 255, 0, 255]));
}

#[test]
fn text_without_font_is_a_resource_error() {
    let mut s = CpuSurface::new(canvas(8, 8), None).unwrap();
    let err = s.measure_text("hi").unwrap_err();
    assert!(err.to_string().starts_with("resource error:"));
}

#[test]
fn oversized_canvas_is_unavailable() {
    let err = CpuSurface::new(canvas(70_000, 10), None).err().unwrap();
    assert!(matches!(err, DubframeError::SurfaceUnavailable(_)));
}

#[test]
fn text_measures_and_paints_with_system_font() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut s = CpuSurface::new(canvas(200, 60), Some(&font)).unwrap();
    s.set_font(&FontSpec {
        family: "Arial".to_owned(),
        weight: 700,
        italic: false,
        size_px: 24.0,
    });
    let short = s.measure_text("Hi").unwrap();
    let long = s.measure_text("Hi there").unwrap();
    assert!(short > 0.0);
    assert!(long > short);

    s.set_text_align(TextAlign::Center, TextBaseline::Bottom);
    s.fill_text("Hi", Point::new(100.0, 50.0), Color::WHITE)
        .unwrap();
    let snap = s.snapshot().unwrap();
    assert!(snap.data.chunks_exact(4).any(|px| px[3] > 0));
    assert_eq!(snap.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn factory_creates_surface_of_requested_size() {
    let mut factory = CpuSurfaceFactory::new(None);
    let surface = factory.create_surface(canvas(12, 7)).unwrap();
    assert_eq!(surface.canvas(), canvas(12, 7));
}

#[test]
fn caption_renders_identical_pixels_twice() {
    use crate::captions::style::CaptionPreset;
    use crate::render::caption::render_caption;

    let Some(font) = system_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let draw = || {
        let mut s = CpuSurface::new(canvas(240, 80), Some(&font)).unwrap();
        s.clear(Color::BLACK);
        render_caption(
            &mut s,
            &CaptionPreset::NeonBlue.style(),
            "Same text",
            Point::new(120.0, 70.0),
            28.0,
        )
        .unwrap();
        s.snapshot().unwrap()
    };
    let first = draw();
    let second = draw();
    assert!(first.data.chunks_exact(4).any(|px| px[..3] != [0, 0, 0]));
    assert_eq!(first.data, second.data);
}
