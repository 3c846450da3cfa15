//! Producing what an export consumes: a caption timeline from a translated transcription and a
//! synthesized voiceover. Speech and translation services are reached through traits.

/// Collaborator traits and the dubbing run.
pub mod pipeline;
/// Voice presets and translation targets.
pub mod voice;
