use crate::audio::pcm::WavContainer;
use crate::captions::timeline::{Timeline, strip_timestamps_for_speech};
use crate::dubbing::voice::VoicePreset;
use crate::foundation::error::{DubframeError, DubframeResult};

/// Source language passed to the translator; the model detects it.
pub const DETECTED_LANGUAGE: &str = "Detected Language";

/// Media handed to the transcriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaPayload {
    /// Base64-encoded file contents.
    pub base64: String,
    /// MIME type of the file.
    pub mime_type: String,
}

/// Turns the spoken audio of a video into text.
pub trait Transcriber {
    /// Transcribe `media`.
    fn transcribe(&mut self, media: &MediaPayload) -> DubframeResult<String>;
}

/// Translates text with the instruction embedded in `prompt`.
pub trait Translator {
    /// Translate `prompt` from `source_language` into `target_language`.
    fn translate(
        &mut self,
        prompt: &str,
        source_language: &str,
        target_language: &str,
    ) -> DubframeResult<String>;
}

/// One text-to-speech call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechRequest {
    /// Text to speak, free of time tokens.
    pub text: String,
    /// Language the text is in.
    pub language: String,
    /// Prebuilt voice name.
    pub voice: String,
    /// Optional delivery instruction.
    pub style_hint: Option<String>,
}

/// Produces speech as base64 16-bit mono PCM at 24 kHz.
pub trait VoiceSynthesizer {
    /// Synthesize `request`.
    fn synthesize(&mut self, request: &SpeechRequest) -> DubframeResult<String>;
}

/// Prompt asking for timestamped caption lines in `language`.
pub fn translation_prompt(language: &str, transcription: &str) -> String {
    format!(
        "Translate the following video captions into {language}.\n\
         CRITICAL OUTPUT FORMAT:\n\
         [MM:SS] Translated Text\n\
         Original Text:\n\
         {transcription}"
    )
}

/// Speech request for a translated caption text.
pub fn speech_request(translation: &str, language: &str, voice: VoicePreset) -> SpeechRequest {
    SpeechRequest {
        text: strip_timestamps_for_speech(translation),
        language: language.to_owned(),
        voice: voice.voice_name().to_owned(),
        style_hint: voice.style_hint(),
    }
}

/// Synthesize the voiceover for `translation` and wrap it as WAV.
#[tracing::instrument(level = "debug", skip(synth, translation))]
pub fn synthesize_voice(
    synth: &mut dyn VoiceSynthesizer,
    translation: &str,
    language: &str,
    voice: VoicePreset,
) -> DubframeResult<WavContainer> {
    let request = speech_request(translation, language, voice);
    if request.text.trim().is_empty() {
        return Err(DubframeError::input("no text to speak"));
    }
    let payload = synth.synthesize(&request)?;
    let wav = WavContainer::from_speech_base64(&payload)?;
    tracing::debug!(duration_secs = wav.duration_secs(), "voiceover synthesized");
    Ok(wav)
}

/// What to dub.
#[derive(Clone, Debug)]
pub struct DubbingRequest {
    /// Source video.
    pub media: MediaPayload,
    /// Target language value, e.g. `"Spanish"`.
    pub language: String,
    /// Narration voice.
    pub voice: VoicePreset,
    /// Synthesize the voiceover right after translating.
    pub generate_voice: bool,
}

/// Output of [`run_dubbing`].
#[derive(Clone, Debug)]
pub struct DubbingResult {
    /// Raw transcription.
    pub transcription: String,
    /// Translator output, timestamped lines.
    pub translation: String,
    /// Captions parsed from the translation.
    pub timeline: Timeline,
    /// Voiceover, when requested.
    pub voice: Option<WavContainer>,
}

/// Collaborators of a dubbing run.
pub struct Collaborators<'a> {
    /// Speech-to-text.
    pub transcriber: &'a mut dyn Transcriber,
    /// Translation.
    pub translator: &'a mut dyn Translator,
    /// Text-to-speech.
    pub synthesizer: &'a mut dyn VoiceSynthesizer,
}

/// Transcribe, translate, parse the captions and optionally voice them.
///
/// The first collaborator failure ends the run and is returned unchanged.
#[tracing::instrument(level = "debug", skip_all, fields(language = %request.language, voice = %request.voice))]
pub fn run_dubbing(
    mut collaborators: Collaborators<'_>,
    request: &DubbingRequest,
) -> DubframeResult<DubbingResult> {
    if request.media.base64.is_empty() {
        return Err(DubframeError::input("no video provided"));
    }

    tracing::info!("transcribing video audio");
    let transcription = collaborators.transcriber.transcribe(&request.media)?;

    tracing::info!(language = %request.language, "translating captions");
    let prompt = translation_prompt(&request.language, &transcription);
    let translation =
        collaborators
            .translator
            .translate(&prompt, DETECTED_LANGUAGE, &request.language)?;

    let timeline = Timeline::parse(&translation);
    tracing::debug!(captions = timeline.len(), "captions parsed");

    let voice = if request.generate_voice {
        tracing::info!("generating voiceover");
        Some(synthesize_voice(
            collaborators.synthesizer,
            &translation,
            &request.language,
            request.voice,
        )?)
    } else {
        None
    };

    Ok(DubbingResult {
        transcription,
        translation,
        timeline,
        voice,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/dubbing/pipeline.rs"]
mod tests;
