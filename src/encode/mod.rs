//! Recording the composed canvas and voice into a container, and delivering the result.

/// Download targets and file naming.
pub mod download;
/// `ffmpeg` backed recorder.
pub mod ffmpeg;
/// Recorder trait, formats and an in-memory recorder.
pub mod recorder;
