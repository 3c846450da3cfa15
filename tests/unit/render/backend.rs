use super::*;

#[test]
fn solid_frame_is_premultiplied() {
    let f = FrameRGBA::solid(2, 1, Color::rgba(255, 0, 0, 128));
    assert_eq!(f.data.len(), 8);
    assert_eq!(f.pixel(1, 0), Some([128, 0, 0, 128]));
    assert_eq!(f.pixel(2, 0), None);
}

#[test]
fn straight_conversion_undoes_premultiplication() {
    let f = FrameRGBA::solid(1, 1, Color::rgba(200, 100, 0, 128));
    let straight = f.to_straight_rgba();
    assert_eq!(straight[3], 128);
    assert!((i32::from(straight[0]) - 200).abs() <= 1);
    assert!((i32::from(straight[1]) - 100).abs() <= 1);
}

#[test]
fn from_premul_bytes_checks_length() {
    assert!(FrameRGBA::from_premul_bytes(2, 2, vec![0; 16]).is_ok());
    assert!(FrameRGBA::from_premul_bytes(2, 2, vec![0; 15]).is_err());
}

#[test]
fn font_css_includes_style_weight_and_size() {
    let font = FontSpec {
        family: "Georgia".to_owned(),
        weight: 400,
        italic: true,
        size_px: 54.0,
    };
    assert_eq!(font.css(), "italic 400 54px Georgia");

    let bold = FontSpec {
        family: "Arial".to_owned(),
        weight: 700,
        italic: false,
        size_px: 20.5,
    };
    assert_eq!(bold.css(), "700 20.5px Arial");
}

#[test]
fn transparent_shadow_is_invisible() {
    let s = ShadowSpec {
        color: Color::TRANSPARENT,
        blur: 4.0,
        offset_x: 0.0,
        offset_y: 2.0,
    };
    assert!(!s.is_visible());
}
