//! Raw 16-bit PCM to normalized float conversion

use std::time::Duration;

use super::decode::DecodeError;
use super::AudioProfile;

const I16_SCALE: f32 = 32768.0;

/// Per-channel normalized samples ready for an output device.
///
/// Every channel holds the same number of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudioBuffer {
    profile: AudioProfile,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudioBuffer {
    pub fn sample_rate(&self) -> u32 {
        self.profile.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.profile.channels
    }

    pub fn profile(&self) -> AudioProfile {
        self.profile
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.profile.sample_rate as f64)
    }

    /// Frame-major samples, the layout most device callbacks expect
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

/// Reinterpret `bytes` as interleaved signed 16-bit little-endian samples and
/// split them into normalized per-channel sequences.
///
/// A dangling odd byte and any trailing partial frame are dropped.
pub fn normalize_pcm(bytes: &[u8], profile: AudioProfile) -> Result<DecodedAudioBuffer, DecodeError> {
    if profile.channels == 0 || profile.sample_rate == 0 {
        return Err(DecodeError::InvalidProfile {
            sample_rate: profile.sample_rate,
            channels: profile.channels,
        });
    }

    let channel_count = profile.channels as usize;
    let frame_count = bytes.len() / 2 / channel_count;

    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for frame in bytes.chunks_exact(profile.bytes_per_frame()) {
        for (channel, sample) in channels.iter_mut().zip(frame.chunks_exact(2)) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            channel.push(value as f32 / I16_SCALE);
        }
    }

    Ok(DecodedAudioBuffer { profile, channels })
}
