use serde::{Deserialize, Serialize};

use crate::voice::audio::AudioProfile;

/// Base64-encoded raw PCM returned from a synthesis request.
///
/// An empty `base64` string means the service produced no audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechPayload {
    pub base64: String,
    pub profile: AudioProfile,
}

impl SpeechPayload {
    pub fn empty(profile: AudioProfile) -> Self {
        Self {
            base64: String::new(),
            profile,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base64.trim().is_empty()
    }
}

/// Voice configuration for TTS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
}

impl Voice {
    pub fn prebuilt(name: &str) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
        }
    }
}
