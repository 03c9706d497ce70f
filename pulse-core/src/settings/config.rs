use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::ai::gemini::DEFAULT_BASE_URL;
use crate::ai::mock::MockBehavior;
use crate::ai::model::{Capability, Model};
use crate::brand::StudioConfig;
use crate::voice::tts::gemini::GeminiSpeechConfig;

/// Environment variables consulted, in order, when a Gemini provider has no
/// key in the settings file.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "gemini")]
    Gemini {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default = "default_base_url")]
        base_url: String,
    },
    #[serde(rename = "mock")]
    Mock {
        #[serde(default)]
        behavior: MockBehavior,
    },
}

impl ProviderConfig {
    /// The configured Gemini key, or the first non-empty key found in the
    /// environment.
    pub fn gemini_api_key(&self) -> Option<String> {
        match self {
            ProviderConfig::Gemini { api_key, .. } => api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .or_else(api_key_from_env),
            ProviderConfig::Mock { .. } => None,
        }
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_reasoning_model")]
    pub reasoning: Model,
    #[serde(default = "default_image_model")]
    pub image: Model,
    #[serde(default = "default_speech_model")]
    pub speech: Model,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            reasoning: default_reasoning_model(),
            image: default_image_model(),
            speech: default_speech_model(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Prebuilt voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default = "default_style_prompt")]
    pub style_prompt: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            style_prompt: default_style_prompt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_image_size")]
    pub size: String,
    /// Used when the image model returns no picture
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: default_aspect_ratio(),
            size: default_image_size(),
            fallback_url: default_fallback_url(),
        }
    }
}

/// Core application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// The name of the currently active provider
    #[serde(default)]
    pub active_provider: Option<String>,

    /// Map of provider name to configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub models: ModelSettings,

    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub image: ImageSettings,

    /// HTTP timeout for a single generation request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_reasoning_model() -> Model {
    Model::default_for(Capability::Reasoning)
}

fn default_image_model() -> Model {
    Model::default_for(Capability::Image)
}

fn default_speech_model() -> Model {
    Model::default_for(Capability::Speech)
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_style_prompt() -> String {
    "Say in a professional brand voice:".to_string()
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_image_size() -> String {
    "1K".to_string()
}

fn default_fallback_url() -> String {
    "https://picsum.photos/800/800".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_provider: None,
            providers: HashMap::new(),
            models: ModelSettings::default(),
            voice: VoiceSettings::default(),
            image: ImageSettings::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Get the active provider configuration
    pub fn active_provider(&self) -> Option<&ProviderConfig> {
        let provider = self.active_provider.as_ref()?;
        self.providers.get(provider)
    }

    /// Set the active provider (returns error if provider doesn't exist)
    pub fn set_active_provider(&mut self, name: &str) -> Result<(), String> {
        if self.providers.contains_key(name) {
            self.active_provider = Some(name.to_string());
            Ok(())
        } else {
            Err(format!("Provider '{name}' not found"))
        }
    }

    /// Add or update a provider configuration
    pub fn add_provider(&mut self, name: String, config: ProviderConfig) {
        self.providers.insert(name, config);
    }

    /// Remove a provider configuration
    pub fn remove_provider(&mut self, name: &str) -> Result<(), String> {
        if Some(name) == self.active_provider.as_deref() {
            return Err("Cannot remove the active provider".to_string());
        }

        if self.providers.remove(name).is_some() {
            Ok(())
        } else {
            Err(format!("Provider '{name}' not found"))
        }
    }

    /// List all provider names
    pub fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn studio_config(&self) -> StudioConfig {
        StudioConfig {
            reasoning_model: self.models.reasoning,
            image_model: self.models.image,
            image_aspect_ratio: self.image.aspect_ratio.clone(),
            image_size: self.image.size.clone(),
            image_fallback_url: self.image.fallback_url.clone(),
        }
    }

    pub fn speech_config(&self) -> GeminiSpeechConfig {
        GeminiSpeechConfig {
            model: self.models.speech,
            voice: self.voice.voice.clone(),
            style_prompt: self.voice.style_prompt.clone(),
        }
    }
}

/// Provider name used when a key is stored without naming a provider
pub const DEFAULT_GEMINI_PROVIDER: &str = "gemini";

impl Settings {
    /// Store `api_key` on the default Gemini provider, creating it if needed,
    /// and make that provider active.
    pub fn set_gemini_api_key(&mut self, api_key: String) {
        let entry = self
            .providers
            .entry(DEFAULT_GEMINI_PROVIDER.to_string())
            .or_insert_with(|| ProviderConfig::Gemini {
                api_key: None,
                base_url: default_base_url(),
            });

        match entry {
            ProviderConfig::Gemini { api_key: key, .. } => *key = Some(api_key),
            other => {
                *other = ProviderConfig::Gemini {
                    api_key: Some(api_key),
                    base_url: default_base_url(),
                }
            }
        }
        self.active_provider = Some(DEFAULT_GEMINI_PROVIDER.to_string());
    }
}
