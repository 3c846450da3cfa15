//! Audio: the speech PCM/WAV codec, the voice audio graph and preview/export playback sync.

/// Audio graph routing the voice into the recorded stream.
pub mod mix;
/// Raw speech PCM and the WAV container.
pub mod pcm;
/// Voice-follows-video playback synchronization.
pub mod sync;
