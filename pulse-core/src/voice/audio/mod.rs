//! Decoding and playback of synthesized speech

pub mod decode;
pub mod output;
pub mod pcm;
#[cfg(feature = "playback")]
pub mod playback;

pub use decode::{decode_base64, DecodeError};
pub use output::{AudioOutput, PlaybackEnd, PlaybackHandle, RecordingOutput};
pub use pcm::{normalize_pcm, DecodedAudioBuffer};

/// Audio format profile specifying sample rate and channel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioProfile {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioProfile {
    /// 16-bit mono PCM at 24 kHz, the layout the speech models return
    pub const SPEECH: Self = Self {
        sample_rate: 24_000,
        channels: 1,
    };

    pub const fn bytes_per_frame(self) -> usize {
        self.channels as usize * 2
    }
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self::SPEECH
    }
}
