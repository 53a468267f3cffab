//! Platform audio device SPI.
//!
//! Models the lock/unlock ring-buffer contract shared by DirectSound and
//! XAudio2 style APIs: the mixer asks for a byte range, gets back up to two
//! regions (the range wraps at the end of the ring buffer), writes PCM into
//! them, then unlocks to commit.

use crate::error::Result;

/// A writable slice of the device's ring buffer, already sized by `lock`.
/// The mixer fills `data` in place; `unlock` copies it back into the device.
pub struct AudioRegion {
    pub offset: u32,
    pub data: Vec<u8>,
}

/// Platform audio output, consumed by [`crate::audio::AudioMixer`].
///
/// Implemented once per platform (DirectSound, XAudio2, ALSA, ...). The core
/// mixer never assumes a concrete backend; see spec's Design Notes Open
/// Question on DirectSound vs. XAudio2 — this trait is the resolution.
pub trait AudioDevice: Send + Sync {
    /// Open the device for the given format. Idempotent: calling twice with
    /// the same format is a no-op.
    fn open(&mut self, sample_rate: u32, channels: u32, bits_per_sample: u32) -> Result<()>;

    /// Total ring buffer size in bytes.
    fn buffer_size_bytes(&self) -> u32;

    /// Current (play_cursor, write_cursor) byte offsets into the ring buffer.
    fn cursors(&self) -> Result<(u32, u32)>;

    /// Lock `bytes_to_write` bytes starting at `byte_to_lock`, wrapping at
    /// the buffer end. Returns one region, or two if the lock wraps.
    fn lock(&mut self, byte_to_lock: u32, bytes_to_write: u32) -> Result<(AudioRegion, Option<AudioRegion>)>;

    /// Commit previously locked regions back into the device's ring buffer.
    fn unlock(&mut self, region0: AudioRegion, region1: Option<AudioRegion>) -> Result<()>;
}

/// In-memory `AudioDevice` used by tests and headless runs. Cursors advance
/// by exactly the bytes written each `unlock`, so a test can drive several
/// mixer updates and inspect the resulting PCM deterministically.
pub struct MockAudioDevice {
    buffer: Vec<u8>,
    write_cursor: u32,
    play_cursor: u32,
}

impl MockAudioDevice {
    pub fn new(buffer_size_bytes: u32) -> Self {
        Self {
            buffer: vec![0u8; buffer_size_bytes as usize],
            write_cursor: 0,
            play_cursor: 0,
        }
    }

    /// Snapshot of the ring buffer's current contents, for test assertions.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Advance the play cursor, simulating playback consuming bytes already written.
    pub fn advance_play_cursor(&mut self, bytes: u32) {
        self.play_cursor = (self.play_cursor + bytes) % self.buffer.len() as u32;
    }
}

impl AudioDevice for MockAudioDevice {
    fn open(&mut self, _sample_rate: u32, _channels: u32, _bits_per_sample: u32) -> Result<()> {
        Ok(())
    }

    fn buffer_size_bytes(&self) -> u32 {
        self.buffer.len() as u32
    }

    fn cursors(&self) -> Result<(u32, u32)> {
        Ok((self.play_cursor, self.write_cursor))
    }

    fn lock(&mut self, byte_to_lock: u32, bytes_to_write: u32) -> Result<(AudioRegion, Option<AudioRegion>)> {
        let size = self.buffer.len() as u32;
        let region0_len = bytes_to_write.min(size - byte_to_lock);
        let region0 = AudioRegion { offset: byte_to_lock, data: vec![0u8; region0_len as usize] };

        let remaining = bytes_to_write - region0_len;
        let region1 = if remaining > 0 {
            Some(AudioRegion { offset: 0, data: vec![0u8; remaining as usize] })
        } else {
            None
        };

        Ok((region0, region1))
    }

    fn unlock(&mut self, region0: AudioRegion, region1: Option<AudioRegion>) -> Result<()> {
        let size = self.buffer.len();
        let start0 = region0.offset as usize;
        self.buffer[start0..start0 + region0.data.len()].copy_from_slice(&region0.data);
        let mut written = region0.data.len();

        if let Some(region1) = region1 {
            let start1 = region1.offset as usize;
            self.buffer[start1..start1 + region1.data.len()].copy_from_slice(&region1.data);
            written += region1.data.len();
        }

        self.write_cursor = ((self.write_cursor as usize + written) % size) as u32;
        Ok(())
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
