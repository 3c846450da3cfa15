use super::*;
use crate::audio::pcm::{AudioSamples, WavContainer};
use crate::foundation::core::Color;
use crate::media::blob::BlobStore;
use crate::media::source::SolidVideoSource;

fn voice(store: &BlobStore, secs: f64) -> AudioElement {
    let samples = AudioSamples::new(vec![0i16; (secs * 100.0) as usize], 1, 100).unwrap();
    AudioElement::from_wav(store, &WavContainer::from_samples(&samples).unwrap()).unwrap()
}

fn player(store: &BlobStore) -> PreviewPlayer {
    let video = VideoElement::new(Box::new(SolidVideoSource::new(4, 4, 10.0, Color::BLACK)));
    PreviewPlayer::new(video, voice(store, 10.0)).unwrap()
}

#[test]
fn play_and_pause_are_mirrored() {
    let store = BlobStore::new();
    let mut p = player(&store);
    assert_eq!(p.play().unwrap(), vec![SyncAction::Played]);
    assert!(p.voice().is_playing());
    assert_eq!(p.pause(), vec![SyncAction::Paused]);
    assert!(!p.voice().is_playing());
}

#[test]
fn small_seek_is_tolerated() {
    let store = BlobStore::new();
    let mut p = player(&store);
    assert_eq!(p.seek(0.5), vec![SyncAction::None]);
    assert_eq!(p.voice().current_time(), 0.0);
    assert_eq!(p.sync().snap_count(), 0);
}

#[test]
fn large_seek_snaps_voice() {
    let store = BlobStore::new();
    let mut p = player(&store);
    assert_eq!(
        p.seek(3.0),
        vec![SyncAction::Snapped { from: 0.0, to: 3.0 }]
    );
    assert_eq!(p.voice().current_time(), 3.0);
    assert_eq!(p.sync().snap_count(), 1);
}

#[test]
fn forward_drift_is_not_corrected_without_seek() {
    let store = BlobStore::new();
    let mut p = player(&store);
    p.play().unwrap();
    for _ in 0..10 {
        assert!(p.advance(0.1).is_empty());
    }
    assert_eq!(p.sync().snap_count(), 0);
}

#[test]
fn ended_event_needs_no_action() {
    let store = BlobStore::new();
    let mut v = voice(&store, 1.0);
    let mut sync = PlaybackSync::new();
    assert_eq!(sync.handle(PlaybackEvent::Ended, 9.0, &mut v), SyncAction::None);
    assert_eq!(v.current_time(), 0.0);
}

#[test]
fn threshold_is_exclusive() {
    let store = BlobStore::new();
    let mut v = voice(&store, 5.0);
    let mut sync = PlaybackSync::new();
    assert_eq!(sync.handle(PlaybackEvent::Seeking, 0.5, &mut v), SyncAction::None);
    assert!(matches!(
        sync.handle(PlaybackEvent::Seeking, 0.51, &mut v),
        SyncAction::Snapped { .. }
    ));
}
