use super::*;
use base64::Engine as _;

fn u16_at(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

#[test]
fn header_fields_match_canonical_layout() {
    for sample_count in [0usize, 1, 7, 24_000] {
        let samples = vec![0i16; sample_count];
        let wav = encode_wav(&samples, 1, 24_000, 16).unwrap();
        let data_size = (sample_count * 2) as u32;

        assert_eq!(wav.len(), 44 + sample_count * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + data_size);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 48_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), data_size);
    }
}

#[test]
fn samples_are_written_little_endian() {
    let wav = encode_wav(&[0x0102, -2], 1, 24_000, 16).unwrap();
    assert_eq!(&wav[44..48], &[0x02, 0x01, 0xFE, 0xFF]);
}

#[test]
fn non_16_bit_depth_is_rejected() {
    assert!(encode_wav(&[1, 2], 1, 24_000, 8).is_err());
    assert!(encode_wav(&[1, 2], 0, 24_000, 16).is_err());
}

#[test]
fn base64_decode_yields_exact_length() {
    let bytes = decode_base64("AAECAwQ=").unwrap();
    assert_eq!(bytes, vec![0, 1, 2, 3, 4]);
}

#[test]
fn malformed_base64_is_an_input_error() {
    let err = decode_base64("not*base64!").unwrap_err();
    assert!(matches!(err, DubframeError::Input(_)));
}

#[test]
fn data_chunk_reads_back_original_samples() {
    let original = vec![0i16, 1, -1, i16::MAX, i16::MIN, 1234, -4321];
    let samples = AudioSamples::new(original.clone(), 1, 24_000).unwrap();
    let wav = WavContainer::from_samples(&samples).unwrap();
    assert_eq!(wav.data().len(), original.len() * 2);
    assert_eq!(wav.decode_samples().unwrap().samples(), original.as_slice());
}

#[test]
fn speech_payload_becomes_playable_container() {
    // 4 samples: 0, 1, -1, 256
    let payload = general_purpose::STANDARD.encode([0u8, 0, 1, 0, 0xFF, 0xFF, 0, 1]);
    let wav = WavContainer::from_speech_base64(&payload).unwrap();
    let header = wav.header();
    assert_eq!(header.channels, SPEECH_CHANNELS);
    assert_eq!(header.sample_rate, SPEECH_SAMPLE_RATE);
    assert_eq!(header.data_size, 8);
    assert_eq!(
        wav.decode_samples().unwrap().samples(),
        &[0i16, 1, -1, 256][..]
    );
    assert!((wav.duration_secs() - 4.0 / 24_000.0).abs() < 1e-12);
}

#[test]
fn odd_pcm_length_is_rejected() {
    let payload = general_purpose::STANDARD.encode([0u8, 1, 2]);
    assert!(matches!(
        AudioSamples::from_speech_base64(&payload),
        Err(DubframeError::Input(_))
    ));
}

#[test]
fn parse_rejects_truncated_or_foreign_data() {
    assert!(WavContainer::parse(vec![0u8; 10]).is_err());
    let mut wav = encode_wav(&[1, 2, 3], 1, 24_000, 16).unwrap();
    wav[0] = b'X';
    assert!(WavContainer::parse(wav).is_err());

    let mut wav = encode_wav(&[1, 2, 3], 1, 24_000, 16).unwrap();
    wav.truncate(46);
    assert!(WavContainer::parse(wav).is_err());
}

#[test]
fn to_f32_scales_into_unit_range() {
    let s = AudioSamples::new(vec![i16::MIN, 0, 16_384], 1, 24_000).unwrap();
    let f = s.to_f32();
    assert_eq!(f[0], -1.0);
    assert_eq!(f[1], 0.0);
    assert!((f[2] - 0.5).abs() < 1e-6);
}
