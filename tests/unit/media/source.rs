use super::*;

#[test]
fn solid_source_reports_info_and_frames() {
    let mut src = SolidVideoSource::new(4, 2, 3.0, Color::WHITE);
    let info = src.probe().unwrap();
    assert_eq!((info.width, info.height), (4, 2));
    let frame = src.frame_at(1.0).unwrap();
    assert_eq!(frame.pixel(3, 1), Some([255, 255, 255, 255]));
    assert_eq!(src.decoded_frames(), 1);
}

#[test]
fn failing_source_errors_past_limit() {
    let mut src = SolidVideoSource::new(4, 2, 3.0, Color::WHITE).failing_after(1.0);
    assert!(src.frame_at(0.5).is_ok());
    let err = src.frame_at(1.0).unwrap_err();
    assert!(err.to_string().starts_with("input error:"));
}

#[test]
fn validate_rejects_empty_or_endless_video() {
    let ok = VideoInfo {
        width: 2,
        height: 2,
        duration_secs: 1.0,
    };
    assert!(ok.validate().is_ok());
    assert!(VideoInfo { width: 0, ..ok }.validate().is_err());
    assert!(
        VideoInfo {
            duration_secs: f64::INFINITY,
            ..ok
        }
        .validate()
        .is_err()
    );
}
