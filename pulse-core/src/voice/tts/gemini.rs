//! Gemini text-to-speech implementation

use async_trait::async_trait;

use super::provider::TextToSpeech;
use super::types::{SpeechPayload, Voice};
use crate::ai::{AiError, AiProvider, GenerationRequest, Model, OutputKind};
use crate::voice::audio::AudioProfile;

#[derive(Debug, Clone)]
pub struct GeminiSpeechConfig {
    pub model: Model,
    pub voice: String,
    /// Prefix that steers delivery; the text to speak is appended.
    pub style_prompt: String,
}

impl Default for GeminiSpeechConfig {
    fn default() -> Self {
        Self {
            model: Model::Gemini25FlashPreviewTts,
            voice: "Kore".to_string(),
            style_prompt: "Say in a professional brand voice:".to_string(),
        }
    }
}

pub struct GeminiSpeech<P> {
    provider: P,
    config: GeminiSpeechConfig,
}

impl<P: AiProvider> GeminiSpeech<P> {
    pub fn new(provider: P, config: GeminiSpeechConfig) -> Self {
        Self { provider, config }
    }

    fn prompt(&self, text: &str) -> String {
        format!("{} {}", self.config.style_prompt, text)
    }
}

#[async_trait]
impl<P: AiProvider> TextToSpeech for GeminiSpeech<P> {
    fn default_voice(&self) -> Voice {
        Voice::prebuilt(&self.config.voice)
    }

    fn profile(&self) -> AudioProfile {
        AudioProfile::SPEECH
    }

    async fn synthesize(&self, text: &str, voice: Option<&Voice>) -> Result<SpeechPayload, AiError> {
        let default_voice = self.default_voice();
        let voice = voice.unwrap_or(&default_voice);

        let request = GenerationRequest::new(
            self.config.model,
            self.prompt(text),
            OutputKind::Audio {
                voice: voice.id.clone(),
            },
        );

        let response = self.provider.generate(request).await?;

        match response.first_inline_data() {
            Some((mime_type, data)) => {
                tracing::debug!(mime_type, encoded_len = data.len(), "speech payload received");
                Ok(SpeechPayload {
                    base64: data.to_string(),
                    profile: self.profile(),
                })
            }
            None => {
                tracing::warn!("speech response carried no audio");
                Ok(SpeechPayload::empty(self.profile()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::{MockBehavior, MockProvider};

    #[tokio::test]
    async fn test_returns_inline_audio() {
        let provider = MockProvider::new(MockBehavior::InlineData {
            mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
            data: "AAE=".to_string(),
        });
        let tts = GeminiSpeech::new(provider.clone(), GeminiSpeechConfig::default());

        let payload = tts.synthesize("Hello", None).await.unwrap();
        assert_eq!(payload.base64, "AAE=");
        assert_eq!(payload.profile, AudioProfile::SPEECH);

        let request = provider.get_last_captured_request().unwrap();
        assert_eq!(request.model, Model::Gemini25FlashPreviewTts);
        assert_eq!(request.prompt, "Say in a professional brand voice: Hello");
        assert_eq!(
            request.output,
            OutputKind::Audio {
                voice: "Kore".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_audio_is_empty_payload() {
        let provider = MockProvider::new(MockBehavior::Empty);
        let tts = GeminiSpeech::new(provider, GeminiSpeechConfig::default());

        let payload = tts.synthesize("Hello", None).await.unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_voice_overrides_default() {
        let provider = MockProvider::new(MockBehavior::Empty);
        let tts = GeminiSpeech::new(provider.clone(), GeminiSpeechConfig::default());

        tts.synthesize("Hi", Some(&Voice::prebuilt("Puck")))
            .await
            .unwrap();
        let request = provider.get_last_captured_request().unwrap();
        assert_eq!(
            request.output,
            OutputKind::Audio {
                voice: "Puck".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_quota_error_propagates() {
        let provider = MockProvider::new(MockBehavior::QuotaExhausted);
        let tts = GeminiSpeech::new(provider, GeminiSpeechConfig::default());

        let err = tts.synthesize("Hello", None).await.unwrap_err();
        assert!(err.is_quota_exhausted());
    }
}
