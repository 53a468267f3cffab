use super::*;
use std::sync::Arc;
use crate::audio::MockAudioDevice;

fn constant_clip(value: i16, frame_count: usize) -> Arc<AudioClip> {
    let mut interleaved = Vec::with_capacity(frame_count * 2);
    for _ in 0..frame_count {
        interleaved.push(value);
        interleaved.push(value);
    }
    Arc::new(AudioClip::from_interleaved_i16(48_000, 2, &interleaved))
}

#[test]
fn test_play_adds_voice() {
    let mut mixer = AudioMixer::new(2, 1.0 / 60.0);
    let clip = constant_clip(i16::MAX, 256);
    let handle = mixer.play(clip, AudioKind::Sfx, 1.0, 1.0, false);

    assert_eq!(mixer.voice_count(), 1);
    assert!(mixer.stop(handle));
    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn test_update_marks_device_lost_on_cursor_failure() {
    struct FailingDevice;
    impl AudioDevice for FailingDevice {
        fn open(&mut self, _: u32, _: u32, _: u32) -> Result<()> { Ok(()) }
        fn buffer_size_bytes(&self) -> u32 { 0 }
        fn cursors(&self) -> Result<(u32, u32)> {
            Err(crate::error::Error::DeviceError("lost".to_string()))
        }
        fn lock(&mut self, _: u32, _: u32) -> Result<(AudioRegion, Option<AudioRegion>)> {
            unreachable!()
        }
        fn unlock(&mut self, _: AudioRegion, _: Option<AudioRegion>) -> Result<()> {
            unreachable!()
        }
    }

    let mut mixer = AudioMixer::new(2, 1.0 / 60.0);
    let mut device = FailingDevice;
    mixer.update(&mut device, 1.0 / 60.0, 0.0).unwrap();
    assert!(!mixer.is_sound_valid());
}

#[test]
fn test_update_writes_nonzero_pcm_for_loud_voice() {
    let mut mixer = AudioMixer::new(2, 1.0 / 60.0);
    let clip = constant_clip(i16::MAX, 4096);
    mixer.play(clip, AudioKind::Sfx, 1.0, 1.0, false);

    let mut device = MockAudioDevice::new(SAMPLES_PER_SECOND * 4);
    mixer.update(&mut device, 1.0 / 60.0, 0.0).unwrap();

    assert!(device.buffer().iter().any(|&b| b != 0));
}

#[test]
fn test_non_looping_voice_is_removed_once_exhausted() {
    let mut mixer = AudioMixer::new(2, 1.0 / 60.0);
    let clip = constant_clip(100, 16); // very short clip
    mixer.play(clip, AudioKind::Sfx, 1.0, 1.0, false);

    let mut device = MockAudioDevice::new(SAMPLES_PER_SECOND * 4);
    for _ in 0..10 {
        mixer.update(&mut device, 1.0 / 60.0, 0.0).unwrap();
    }

    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn test_looping_voice_survives_exhaustion() {
    let mut mixer = AudioMixer::new(2, 1.0 / 60.0);
    let clip = constant_clip(100, 16);
    mixer.play(clip, AudioKind::Sfx, 1.0, 1.0, true);

    let mut device = MockAudioDevice::new(SAMPLES_PER_SECOND * 4);
    for _ in 0..10 {
        mixer.update(&mut device, 1.0 / 60.0, 0.0).unwrap();
    }

    assert_eq!(mixer.voice_count(), 1);
}

#[test]
fn test_spatial_voice_attenuates_with_distance() {
    let mut mixer = AudioMixer::new(2, 1.0 / 60.0);
    mixer.set_listener(Some(Vector2::new(0.0, 0.0)));

    let clip = constant_clip(i16::MAX, 4096);
    mixer.play_spatial(clip, AudioKind::Sfx, Vector2::new(100.0, 0.0), 1.0, 1.0, false);

    let mut device = MockAudioDevice::new(SAMPLES_PER_SECOND * 4);
    mixer.update(&mut device, 1.0 / 60.0, 0.0).unwrap();

    // Far enough away that the falloff should crush the signal near silence.
    let max_abs = device.buffer().chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]).abs())
        .max()
        .unwrap_or(0);
    assert!(max_abs < 1000);
}
