//! Playable media: video sources, media elements with a playhead, and the object-URL registry
//! that owns in-memory blobs while something plays them.

/// Object-URL style registry for in-memory blobs.
pub mod blob;
/// Video/voice elements with play, pause, seek and playhead state.
pub mod element;
/// `ffmpeg`/`ffprobe` backed video source.
pub mod ffmpeg;
/// Video source trait and an in-memory source.
pub mod source;
