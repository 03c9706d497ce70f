use serde::{Deserialize, Serialize};
use strum::VariantArray;

/// What a model is used for. Each capability has exactly one default model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Reasoning,
    Image,
    Speech,
}

/// The supported models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::VariantArray)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    Gemini3ProPreview,
    Gemini25Pro,
    Gemini25Flash,

    Gemini3ProImagePreview,

    Gemini25FlashPreviewTts,
    Gemini25ProPreviewTts,

    /// Matches nothing real; used by the mock provider.
    None,
}

impl Model {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gemini3ProPreview => "gemini-3-pro-preview",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini3ProImagePreview => "gemini-3-pro-image-preview",
            Self::Gemini25FlashPreviewTts => "gemini-2.5-flash-preview-tts",
            Self::Gemini25ProPreviewTts => "gemini-2.5-pro-preview-tts",
            Self::None => "none",
        }
    }

    pub const fn capability(self) -> Capability {
        match self {
            Self::Gemini3ProPreview | Self::Gemini25Pro | Self::Gemini25Flash | Self::None => {
                Capability::Reasoning
            }
            Self::Gemini3ProImagePreview => Capability::Image,
            Self::Gemini25FlashPreviewTts | Self::Gemini25ProPreviewTts => Capability::Speech,
        }
    }

    pub const fn default_for(capability: Capability) -> Self {
        match capability {
            Capability::Reasoning => Self::Gemini3ProPreview,
            Capability::Image => Self::Gemini3ProImagePreview,
            Capability::Speech => Self::Gemini25FlashPreviewTts,
        }
    }

    pub fn all_for(capability: Capability) -> Vec<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .filter(|m| *m != Self::None && m.capability() == capability)
            .collect()
    }
}

impl TryFrom<&str> for Model {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();
        Self::VARIANTS
            .iter()
            .copied()
            .find(|m| *m != Self::None && m.name() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::VARIANTS
                    .iter()
                    .filter(|m| **m != Self::None)
                    .map(|m| m.name())
                    .collect();
                format!(
                    "Invalid model: {}. Valid options: {}",
                    value,
                    valid.join(", ")
                )
            })
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_capability() {
        for capability in [Capability::Reasoning, Capability::Image, Capability::Speech] {
            assert_eq!(Model::default_for(capability).capability(), capability);
        }
    }

    #[test]
    fn test_parse_by_name() {
        assert_eq!(
            Model::try_from("gemini-2.5-flash-preview-tts"),
            Ok(Model::Gemini25FlashPreviewTts)
        );
        assert_eq!(
            Model::try_from("GEMINI-3-PRO-PREVIEW"),
            Ok(Model::Gemini3ProPreview)
        );
        assert!(Model::try_from("none").is_err());
        assert!(Model::try_from("gpt-5").is_err());
    }

    #[test]
    fn test_speech_models_listed() {
        let speech = Model::all_for(Capability::Speech);
        assert_eq!(speech.len(), 2);
        assert!(speech.contains(&Model::Gemini25FlashPreviewTts));
    }
}
