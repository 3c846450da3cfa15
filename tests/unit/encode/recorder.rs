use super::*;
use crate::foundation::core::Color;

fn cfg(format: RecordingFormat) -> RecorderConfig {
    RecorderConfig {
        width: 4,
        height: 2,
        fps: Fps::default(),
        audio: AudioTrackInfo {
            sample_rate: 48_000,
            channels: 2,
        },
        format,
    }
}

#[test]
fn format_names_and_parsing() {
    assert_eq!(RecordingFormat::default(), RecordingFormat::WebmVp9Opus);
    assert_eq!(RecordingFormat::WebmVp9Opus.mime(), "video/webm; codecs=vp9,opus");
    assert_eq!(RecordingFormat::Mp4H264Aac.extension(), "mp4");
    assert_eq!(RecordingFormat::WebmVp9Opus.video_encoder(), "libvpx-vp9");
    assert_eq!(RecordingFormat::Mp4H264Aac.audio_encoder(), "aac");
    assert_eq!("WebM".parse::<RecordingFormat>().unwrap(), RecordingFormat::WebmVp9Opus);
    assert!("avi".parse::<RecordingFormat>().is_err());
    assert_eq!(
        serde_json::to_string(&RecordingFormat::Mp4H264Aac).unwrap(),
        "\"mp4\""
    );
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(cfg(RecordingFormat::WebmVp9Opus).validate().is_ok());
    let mut c = cfg(RecordingFormat::WebmVp9Opus);
    c.width = 0;
    assert!(c.validate().is_err());
    let mut c = cfg(RecordingFormat::WebmVp9Opus);
    c.audio.channels = 0;
    assert!(c.validate().is_err());
    assert_eq!(cfg(RecordingFormat::WebmVp9Opus).frame_len(), 32);
}

#[test]
fn in_memory_lifecycle() {
    let mut rec = InMemoryRecorder::new();
    let probe = rec.clone();
    assert_eq!(rec.state(), RecorderState::Inactive);
    assert!(rec.push_video_frame(&FrameRGBA::solid(4, 2, Color::BLACK)).is_err());

    rec.start(cfg(RecordingFormat::WebmVp9Opus)).unwrap();
    assert!(rec.start(cfg(RecordingFormat::WebmVp9Opus)).is_err());
    rec.push_video_frame(&FrameRGBA::solid(4, 2, Color::WHITE))
        .unwrap();
    rec.push_audio(&[0.1, 0.2, 0.3, 0.4]).unwrap();
    assert!(rec.push_audio(&[0.1]).is_err());
    assert!(rec.push_video_frame(&FrameRGBA::solid(2, 2, Color::WHITE)).is_err());

    let chunks = rec.stop().unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].starts_with(b"video/webm"));
    let log = probe.log();
    assert_eq!(log.state, RecorderState::Stopped);
    assert_eq!(log.frames.len(), 1);
    assert_eq!(log.audio.len(), 4);
}

#[test]
fn abort_discards_and_counts() {
    let mut rec = InMemoryRecorder::new();
    rec.start(cfg(RecordingFormat::Mp4H264Aac)).unwrap();
    rec.push_audio(&[0.0, 0.0]).unwrap();
    rec.abort();
    let log = rec.log();
    assert_eq!(log.aborts, 1);
    assert!(log.audio.is_empty());
    assert_eq!(rec.state(), RecorderState::Inactive);
    assert!(rec.stop().is_err());
}

#[test]
fn failure_injection() {
    let mut rec = InMemoryRecorder::new().without_format(RecordingFormat::Mp4H264Aac);
    assert!(!rec.is_format_supported(RecordingFormat::Mp4H264Aac));
    assert!(rec.is_format_supported(RecordingFormat::WebmVp9Opus));
    assert!(matches!(
        rec.start(cfg(RecordingFormat::Mp4H264Aac)),
        Err(DubframeError::UnsupportedRecordingFormat(_))
    ));

    let mut rec = InMemoryRecorder::new().failing_start();
    assert!(matches!(
        rec.start(cfg(RecordingFormat::WebmVp9Opus)),
        Err(DubframeError::Resource(_))
    ));

    let mut rec = InMemoryRecorder::new().failing_after_frames(1);
    rec.start(cfg(RecordingFormat::WebmVp9Opus)).unwrap();
    let f = FrameRGBA::solid(4, 2, Color::BLACK);
    rec.push_video_frame(&f).unwrap();
    assert!(rec.push_video_frame(&f).is_err());
}
