//! Decoded audio data fed into an [`crate::audio::AudioMixer`] voice.

/// One contiguous run of per-channel float samples. A clip with more than
/// one chunk represents a streamed/segmented sound; a voice's cursor walks
/// to `chunks[i + 1]` on exhausting `chunks[i]`.
pub struct AudioChunk {
    pub sample_count: u32,
    /// `channels[c]` holds `sample_count` samples for channel `c`, in `[-1.0, 1.0]`.
    pub channels: Vec<Vec<f32>>,
}

/// A loaded sound resource: sample rate, channel count, and its chunks.
pub struct AudioClip {
    pub sample_rate: u32,
    pub channel_count: u32,
    pub chunks: Vec<AudioChunk>,
}

impl AudioClip {
    /// Build a single-chunk clip from interleaved signed-16 PCM, the format
    /// produced by decoding a WAV/OGG asset ahead of time.
    pub fn from_interleaved_i16(sample_rate: u32, channel_count: u32, interleaved: &[i16]) -> Self {
        let channel_count = channel_count.max(1);
        let sample_count = (interleaved.len() as u32) / channel_count;
        let mut channels = vec![Vec::with_capacity(sample_count as usize); channel_count as usize];

        for frame in interleaved.chunks_exact(channel_count as usize) {
            for (c, sample) in frame.iter().enumerate() {
                channels[c].push(*sample as f32 / i16::MAX as f32);
            }
        }

        Self {
            sample_rate,
            channel_count,
            chunks: vec![AudioChunk { sample_count, channels }],
        }
    }

    pub fn total_sample_count(&self) -> u32 {
        self.chunks.iter().map(|c| c.sample_count).sum()
    }
}

#[cfg(test)]
#[path = "clip_tests.rs"]
mod tests;
