//! Per-frame ring-buffer fill: resolve volume/pan per voice, resample,
//! sum into a float scratch buffer, then convert to interleaved int16 PCM.
//!
//! Grounded on `Audio::Update`/`Audio::OutputSound`/`Audio::FillBuffer`: the
//! same byteToLock/bytesToWrite/safetyBytes cursor math, the same 4-sample
//! resample step, the same falloff curve. SIMD lanes there are a plain
//! per-sample loop here — correctness first, the mixer is not a hot path in
//! the Rust core the way it was when it ran without a scheduler thread.

use slotmap::SlotMap;

use crate::math::Vector2;
use crate::error::Result;

use super::clip::AudioClip;
use super::device::{AudioDevice, AudioRegion};

const SAMPLES_PER_SECOND: u32 = 48_000;
const FALLOFF_SCALE: f32 = 0.2;
const RESAMPLE_STEP: f32 = 4.0;

slotmap::new_key_type! {
    /// Stable handle to a live voice, returned by [`AudioMixer::play`]/[`AudioMixer::play_spatial`].
    pub struct VoiceHandle;
}

/// Which channel-volume bus a voice mixes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioKind {
    Music,
    Sfx,
}

struct Voice {
    clip: std::sync::Arc<AudioClip>,
    chunk_index: usize,
    samples_played: f32,
    volume: f32,
    pitch: f32,
    loop_enabled: bool,
    global: bool,
    position: Vector2,
    kind: AudioKind,
}

/// Owns the live voice list and mixes it into a device's ring buffer once
/// per frame. Backend-agnostic: it only ever talks to the [`AudioDevice`]
/// passed into [`AudioMixer::update`].
pub struct AudioMixer {
    voices: SlotMap<VoiceHandle, Voice>,
    listener: Option<Vector2>,
    channel_count: u32,
    bytes_per_sample: u32,
    buffer_size: u32,
    safety_bytes: u32,
    running_sample_index: u32,
    sound_is_valid: bool,

    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl AudioMixer {
    /// `target_frametime` is the engine's target seconds-per-frame (used to
    /// size the safety margin the same way the original per-frame fill did).
    pub fn new(channel_count: u32, target_frametime: f32) -> Self {
        let channel_count = channel_count.max(1);
        let bytes_per_sample = std::mem::size_of::<i16>() as u32 * channel_count;
        let buffer_size = SAMPLES_PER_SECOND * bytes_per_sample;
        let safety_bytes = ((buffer_size as f32) * target_frametime / 2.0) as u32;

        Self {
            voices: SlotMap::with_key(),
            listener: None,
            channel_count,
            bytes_per_sample,
            buffer_size,
            safety_bytes,
            running_sample_index: 0,
            sound_is_valid: false,
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
        }
    }

    pub fn set_listener(&mut self, position: Option<Vector2>) {
        self.listener = position;
    }

    /// Start a non-positional voice; always mixes at equal balance.
    pub fn play(&mut self, clip: std::sync::Arc<AudioClip>, kind: AudioKind, volume: f32, pitch: f32, loop_enabled: bool) -> VoiceHandle {
        self.voices.insert(Voice {
            clip,
            chunk_index: 0,
            samples_played: 0.0,
            volume,
            pitch,
            loop_enabled,
            global: true,
            position: Vector2::ZERO,
            kind,
        })
    }

    /// Start a voice panned/attenuated relative to the current listener.
    pub fn play_spatial(&mut self, clip: std::sync::Arc<AudioClip>, kind: AudioKind, position: Vector2, volume: f32, pitch: f32, loop_enabled: bool) -> VoiceHandle {
        self.voices.insert(Voice {
            clip,
            chunk_index: 0,
            samples_played: 0.0,
            volume,
            pitch,
            loop_enabled,
            global: false,
            position,
            kind,
        })
    }

    pub fn stop(&mut self, handle: VoiceHandle) -> bool {
        self.voices.remove(handle).is_some()
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn is_sound_valid(&self) -> bool {
        self.sound_is_valid
    }

    /// Query cursors, compute the byte range to fill, mix every live voice
    /// into it, and commit. Marks the device lost (and skips mixing) if the
    /// cursor query fails, per spec §7's "Audio device lost" handling.
    pub fn update(&mut self, device: &mut dyn AudioDevice, dt: f32, time_since_last_frame: f32) -> Result<()> {
        let Ok((play_cursor, write_cursor)) = device.cursors() else {
            self.sound_is_valid = false;
            return Ok(());
        };

        if !self.sound_is_valid {
            self.sound_is_valid = true;
            self.running_sample_index = write_cursor / self.bytes_per_sample;
        }

        let byte_to_lock = (self.running_sample_index * self.bytes_per_sample) % self.buffer_size;
        let expected_bytes_per_frame = (SAMPLES_PER_SECOND as f32 * self.bytes_per_sample as f32 * dt) as u32;
        let seconds_left_until_flip = (dt - time_since_last_frame).max(0.0);
        let expected_bytes_until_flip = if dt > 0.0 {
            ((seconds_left_until_flip / dt) * expected_bytes_per_frame as f32) as u32
        } else {
            0
        };
        let expected_frame_boundary_bytes = play_cursor + expected_bytes_until_flip;
        let safe_write_cursor = write_cursor
            + if write_cursor < play_cursor { self.buffer_size } else { 0 }
            + self.safety_bytes;

        let target_cursor = if safe_write_cursor < expected_frame_boundary_bytes {
            expected_frame_boundary_bytes + expected_bytes_per_frame
        } else {
            write_cursor + expected_bytes_per_frame + self.safety_bytes
        } % self.buffer_size;

        let bytes_to_write = (target_cursor + if byte_to_lock > target_cursor { self.buffer_size } else { 0 }) - byte_to_lock;

        let mut sample_count = bytes_to_write / self.bytes_per_sample;
        sample_count -= sample_count % 8;
        let bytes_to_write = sample_count * self.bytes_per_sample;

        let pcm = self.mix(sample_count);

        let (mut region0, region1) = device.lock(byte_to_lock, bytes_to_write)?;
        let region0_len = region0.data.len();
        region0.data.copy_from_slice(&pcm[..region0_len]);

        let region1 = match region1 {
            Some(mut region1) => {
                let region1_len = region1.data.len();
                region1.data.copy_from_slice(&pcm[region0_len..region0_len + region1_len]);
                Some(region1)
            }
            None => None,
        };

        self.running_sample_index += sample_count;
        device.unlock(region0, region1)?;

        Ok(())
    }

    /// Sum every live voice into `sample_count` frames of interleaved int16
    /// PCM, removing voices that finish and are not looping.
    fn mix(&mut self, sample_count: u32) -> Vec<u8> {
        let channel_count = self.channel_count as usize;
        let mut scratch = vec![0.0f32; sample_count as usize * channel_count];

        let mut finished = Vec::new();

        for (handle, voice) in self.voices.iter_mut() {
            let base_volume = match voice.kind {
                AudioKind::Music => self.music_volume,
                AudioKind::Sfx => self.sfx_volume,
            };

            let (mixed_volume, balance) = if voice.global || self.listener.is_none() {
                (self.master_volume * base_volume, vec![voice.volume; channel_count])
            } else {
                let offset = voice.position - self.listener.unwrap();
                let mut balance = vec![voice.volume; channel_count];
                if channel_count >= 2 {
                    balance[0] = 1.0 - if offset.x > 1.0 { 0.5 } else { 0.0 };
                    balance[1] = 1.0 - if offset.x < -1.0 { 0.5 } else { 0.0 };
                }
                let falloff = (offset.length_squared() * FALLOFF_SCALE).max(1.0);
                (self.master_volume * base_volume / falloff, balance)
            };

            let mut remaining = sample_count;
            let mut out_offset = 0usize;

            while remaining > 0 {
                let Some(chunk) = voice.clip.chunks.get(voice.chunk_index) else {
                    break;
                };

                let samples_remaining_in_chunk = (chunk.sample_count as f32 - voice.samples_played).max(0.0);
                let blocks_remaining = (samples_remaining_in_chunk / RESAMPLE_STEP).round() as u32;
                let blocks_to_mix = remaining.min(blocks_remaining);

                if blocks_to_mix == 0 {
                    if voice.chunk_index + 1 < voice.clip.chunks.len() {
                        voice.chunk_index += 1;
                        voice.samples_played = 0.0;
                        continue;
                    } else {
                        finished.push(handle);
                        break;
                    }
                }

                for block in 0..blocks_to_mix {
                    let base_position = voice.samples_played + block as f32 * voice.pitch * RESAMPLE_STEP;
                    for lane in 0..4usize {
                        let sample_position = base_position + lane as f32 * voice.pitch;
                        let index = sample_position.trunc() as usize;
                        let frac = sample_position.fract();

                        for c in 0..channel_count {
                            let source_channel = chunk.channels.get(c.min(chunk.channels.len().saturating_sub(1)));
                            let Some(source_channel) = source_channel else { continue };
                            let floor_sample = source_channel.get(index).copied().unwrap_or(0.0);
                            let ceil_sample = source_channel.get(index + 1).copied().unwrap_or(floor_sample);
                            let sample_value = floor_sample * (1.0 - frac) + ceil_sample * frac;

                            let frame = out_offset + block as usize * 4 + lane;
                            if frame < sample_count as usize {
                                scratch[frame * channel_count + c] += mixed_volume * balance[c] * sample_value;
                            }
                        }
                    }
                }

                voice.samples_played += blocks_to_mix as f32 * voice.pitch * RESAMPLE_STEP;
                out_offset += blocks_to_mix as usize * 4;
                remaining -= blocks_to_mix;

                if blocks_to_mix == blocks_remaining {
                    if voice.chunk_index + 1 < voice.clip.chunks.len() {
                        voice.samples_played -= chunk.sample_count as f32;
                        voice.chunk_index += 1;
                        if voice.samples_played < 0.0 {
                            voice.samples_played = 0.0;
                        }
                    } else {
                        finished.push(handle);
                        break;
                    }
                }
            }
        }

        for handle in finished {
            let Some(voice) = self.voices.get_mut(handle) else { continue };
            if voice.loop_enabled {
                voice.chunk_index = 0;
                voice.samples_played = 0.0;
            } else {
                self.voices.remove(handle);
            }
        }

        let mut pcm = vec![0u8; sample_count as usize * self.bytes_per_sample as usize];
        for (i, sample) in scratch.iter().enumerate() {
            let clamped = sample.clamp(-1.0, 1.0);
            let int_sample = (clamped * i16::MAX as f32) as i16;
            let bytes = int_sample.to_le_bytes();
            pcm[i * 2] = bytes[0];
            pcm[i * 2 + 1] = bytes[1];
        }

        pcm
    }
}

#[cfg(test)]
#[path = "mixer_tests.rs"]
mod tests;
