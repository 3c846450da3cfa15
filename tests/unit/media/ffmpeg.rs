use super::*;

#[test]
fn missing_file_fails_on_probe() {
    let mut src = FfmpegVideoSource::new("/definitely/not/here.mp4");
    assert_eq!(src.path(), Path::new("/definitely/not/here.mp4"));
    assert!(src.probe().is_err());
    assert!(src.frame_at(0.0).is_err());
}

#[cfg(feature = "media-ffmpeg")]
#[test]
fn frame_rate_ratio_parses() {
    assert_eq!(parse_ff_ratio("30000/1001"), Some((30000, 1001)));
    assert_eq!(parse_ff_ratio("25/1"), Some((25, 1)));
    assert_eq!(parse_ff_ratio("0/0"), None);
    assert_eq!(parse_ff_ratio("abc"), None);
}
