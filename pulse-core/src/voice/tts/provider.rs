use async_trait::async_trait;

use super::types::{SpeechPayload, Voice};
use crate::ai::AiError;
use crate::voice::audio::AudioProfile;

/// Trait for text-to-speech providers
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Get the default voice for this provider
    fn default_voice(&self) -> Voice;

    /// Sample layout of the payloads this provider returns
    fn profile(&self) -> AudioProfile;

    /// Synthesize text to raw PCM, base64-encoded. An empty payload is a
    /// valid answer and means there is nothing to play.
    async fn synthesize(&self, text: &str, voice: Option<&Voice>) -> Result<SpeechPayload, AiError>;
}
