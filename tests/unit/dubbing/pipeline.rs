use base64::Engine as _;

use super::*;

#[derive(Default)]
struct FakeTranscriber {
    calls: u32,
}

impl Transcriber for FakeTranscriber {
    fn transcribe(&mut self, media: &MediaPayload) -> DubframeResult<String> {
        self.calls += 1;
        assert_eq!(media.mime_type, "video/mp4");
        Ok("[00:01] Hello there\n[00:04] Bye".to_owned())
    }
}

#[derive(Default)]
struct FakeTranslator {
    prompts: Vec<(String, String, String)>,
    fail: bool,
}

impl Translator for FakeTranslator {
    fn translate(&mut self, prompt: &str, source: &str, target: &str) -> DubframeResult<String> {
        self.prompts
            .push((prompt.to_owned(), source.to_owned(), target.to_owned()));
        if self.fail {
            return Err(DubframeError::resource("quota exceeded"));
        }
        Ok("[00:01] Hola\n(sin marca de tiempo)\n[00:04] Adiós".to_owned())
    }
}

#[derive(Default)]
struct FakeSynth {
    requests: Vec<SpeechRequest>,
}

impl VoiceSynthesizer for FakeSynth {
    fn synthesize(&mut self, request: &SpeechRequest) -> DubframeResult<String> {
        self.requests.push(request.clone());
        let pcm: Vec<u8> = [100i16, -100, 200, -200]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        Ok(base64::engine::general_purpose::STANDARD.encode(pcm))
    }
}

fn request(generate_voice: bool) -> DubbingRequest {
    DubbingRequest {
        media: MediaPayload {
            base64: "AAAA".to_owned(),
            mime_type: "video/mp4".to_owned(),
        },
        language: "Spanish".to_owned(),
        voice: VoicePreset::Male2,
        generate_voice,
    }
}

#[test]
fn prompt_demands_timestamped_lines() {
    let p = translation_prompt("French", "[00:01] hi");
    assert!(p.starts_with("Translate the following video captions into French."));
    assert!(p.contains("CRITICAL OUTPUT FORMAT:\n[MM:SS] Translated Text\nOriginal Text:\n"));
    assert!(p.ends_with("[00:01] hi"));
}

#[test]
fn speech_request_strips_time_tokens() {
    let r = speech_request("[00:01] Hola\n[00:04] Adiós", "Spanish", VoicePreset::Female2);
    assert!(!r.text.contains("00:0"));
    assert!(r.text.contains("Hola. "));
    assert_eq!(r.voice, "Zephyr");
    assert_eq!(r.style_hint.as_deref(), Some("Speak in a soft tone"));
}

#[test]
fn full_run_parses_captions_and_voices_them() {
    let mut t = FakeTranscriber::default();
    let mut tr = FakeTranslator::default();
    let mut s = FakeSynth::default();
    let out = run_dubbing(
        Collaborators {
            transcriber: &mut t,
            translator: &mut tr,
            synthesizer: &mut s,
        },
        &request(true),
    )
    .unwrap();

    assert_eq!(t.calls, 1);
    let (prompt, source, target) = &tr.prompts[0];
    assert!(prompt.contains("[00:01] Hello there"));
    assert_eq!(source, DETECTED_LANGUAGE);
    assert_eq!(target, "Spanish");

    let texts: Vec<_> = out.timeline.entries().iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Hola", "Adiós"]);

    assert_eq!(s.requests.len(), 1);
    assert_eq!(s.requests[0].voice, "Fenrir");
    let wav = out.voice.unwrap();
    assert_eq!(wav.header().sample_rate, 24_000);
    assert_eq!(wav.decode_samples().unwrap().samples(), &[100i16, -100, 200, -200]);
}

#[test]
fn voice_is_optional() {
    let mut s = FakeSynth::default();
    let out = run_dubbing(
        Collaborators {
            transcriber: &mut FakeTranscriber::default(),
            translator: &mut FakeTranslator::default(),
            synthesizer: &mut s,
        },
        &request(false),
    )
    .unwrap();
    assert!(out.voice.is_none());
    assert!(s.requests.is_empty());
}

#[test]
fn translator_failure_stops_the_run() {
    let mut s = FakeSynth::default();
    let err = run_dubbing(
        Collaborators {
            transcriber: &mut FakeTranscriber::default(),
            translator: &mut FakeTranslator {
                fail: true,
                ..FakeTranslator::default()
            },
            synthesizer: &mut s,
        },
        &request(true),
    )
    .unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
    assert!(s.requests.is_empty());
}

#[test]
fn empty_media_is_an_input_error() {
    let mut req = request(false);
    req.media.base64.clear();
    let err = run_dubbing(
        Collaborators {
            transcriber: &mut FakeTranscriber::default(),
            translator: &mut FakeTranslator::default(),
            synthesizer: &mut FakeSynth::default(),
        },
        &req,
    )
    .unwrap_err();
    assert!(matches!(err, DubframeError::Input(_)));
}

#[test]
fn malformed_speech_payload_is_an_input_error() {
    struct BadSynth;
    impl VoiceSynthesizer for BadSynth {
        fn synthesize(&mut self, _: &SpeechRequest) -> DubframeResult<String> {
            Ok("%%% not base64".to_owned())
        }
    }
    let err = synthesize_voice(&mut BadSynth, "[00:01] hi", "English", VoicePreset::Male1)
        .unwrap_err();
    assert!(matches!(err, DubframeError::Input(_)));
}
