use super::*;
use crate::audio::pcm::WavContainer;
use crate::media::blob::BlobStore;

fn voice_element(store: &BlobStore, samples: Vec<i16>, rate: u32) -> AudioElement {
    let samples = AudioSamples::new(samples, 1, rate).unwrap();
    let wav = WavContainer::from_samples(&samples).unwrap();
    AudioElement::from_wav(store, &wav).unwrap()
}

#[test]
fn frame_to_sample_uses_rational_fps() {
    let fps = Fps::new(30000, 1001).unwrap();
    let samples = frame_to_sample(300, fps, 48_000);
    assert!(samples > 470_000 && samples < 490_000);
}

#[test]
fn per_frame_chunks_do_not_drift() {
    let fps = Fps::new(30000, 1001).unwrap();
    let total: usize = (0..3000).map(|i| samples_for_frame(i, fps, 48_000)).sum();
    assert_eq!(total as u64, frame_to_sample(3000, fps, 48_000));
    assert_eq!(samples_for_frame(0, Fps::default(), 48_000), 1600);
}

#[test]
fn mono_voice_is_upmixed_and_resampled() {
    let store = BlobStore::new();
    let voice = voice_element(&store, vec![16384; 24], 24);
    let mut graph = PcmAudioGraph::new(48, 2);
    let track = graph.connect_voice(&voice).unwrap();
    assert_eq!(track, AudioTrackInfo { sample_rate: 48, channels: 2 });

    let out = graph.render(0.0, 4).unwrap();
    assert_eq!(out.len(), 8);
    assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
}

#[test]
fn interpolates_between_source_samples() {
    let store = BlobStore::new();
    let voice = voice_element(&store, vec![0, 16384], 1);
    let mut graph = PcmAudioGraph::new(2, 1);
    graph.connect_voice(&voice).unwrap();
    let out = graph.render(0.0, 2).unwrap();
    assert_eq!(out[0], 0.0);
    assert!((out[1] - 0.25).abs() < 1e-6);
}

#[test]
fn past_the_end_renders_silence() {
    let store = BlobStore::new();
    let voice = voice_element(&store, vec![16384; 10], 10);
    let mut graph = PcmAudioGraph::new(10, 2);
    graph.connect_voice(&voice).unwrap();
    let out = graph.render(5.0, 3).unwrap();
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn closed_graph_rejects_calls() {
    let store = BlobStore::new();
    let voice = voice_element(&store, vec![1; 10], 10);
    let mut graph = PcmAudioGraph::default();
    graph.connect_voice(&voice).unwrap();
    graph.close().unwrap();
    assert!(graph.is_closed());
    assert!(graph.render(0.0, 1).is_err());
    assert!(graph.connect_voice(&voice).is_err());
}

#[test]
fn render_without_voice_is_an_error() {
    let mut graph = PcmAudioGraph::default();
    assert!(graph.render(0.0, 16).is_err());
}
