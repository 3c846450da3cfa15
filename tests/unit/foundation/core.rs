use super::*;

#[test]
fn fps_validation_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_secs() - (1.0 / 30.0)).abs() < 1e-12);
    assert!((fps.frames_to_secs(90) - 3.0).abs() < 1e-12);
}

#[test]
fn canvas_rejects_empty_dimensions() {
    assert!(Canvas::new(0, 1080).is_err());
    assert!(Canvas::new(1920, 0).is_err());
    let c = Canvas::new(1920, 1080).unwrap();
    assert!((c.aspect() - 16.0 / 9.0).abs() < 1e-9);
}

#[test]
fn color_hex_and_alpha_constructors() {
    assert_eq!(Color::hex(0xFACC15), Color::rgb(0xFA, 0xCC, 0x15));
    assert_eq!(Color::with_alpha(0, 0, 0, 0.5).a, 128);
    assert_eq!(Color::with_alpha(0, 0, 0, 2.0).a, 255);
    assert_eq!(Color::hex(0x1D4ED8).to_string(), "#1D4ED8");
    assert_eq!(
        Color::with_alpha(255, 255, 255, 0.9).to_string(),
        "rgba(255,255,255,0.90)"
    );
}

#[test]
fn premul_conversion_rounds() {
    let p = Color::rgba(255, 128, 0, 128).premultiplied();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(p.g, 64);
    assert_eq!(p.b, 0);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
