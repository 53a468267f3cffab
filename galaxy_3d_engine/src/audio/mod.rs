//! Stereo PCM ring-buffer mixer.
//!
//! `AudioMixer` owns the voice list and produces interleaved signed-16 PCM
//! into whatever ring buffer an [`AudioDevice`] exposes; it never touches a
//! concrete audio API itself, so a platform layer only has to implement the
//! four-method `AudioDevice` trait (mirroring how [`crate::graphics_device::GraphicsDevice`]
//! decouples the renderer frontend from a concrete GPU API).

mod device;
mod clip;
mod mixer;

pub use device::{AudioDevice, AudioRegion, MockAudioDevice};
pub use clip::{AudioChunk, AudioClip};
pub use mixer::{AudioKind, AudioMixer, VoiceHandle};
