use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::ai::gemini::{GeminiConfig, GeminiProvider};
use crate::ai::mock::MockProvider;
use crate::ai::provider::AiProvider;
use crate::settings::config::{ProviderConfig, API_KEY_ENV_VARS};
use crate::settings::Settings;

/// Build the active provider. Without an active provider, a Gemini provider
/// is created from the environment key when one is present.
pub fn create_provider(settings: &Settings) -> Result<Arc<dyn AiProvider>> {
    let fallback = ProviderConfig::Gemini {
        api_key: None,
        base_url: crate::ai::gemini::DEFAULT_BASE_URL.to_string(),
    };

    let config = match &settings.active_provider {
        Some(name) => settings
            .providers
            .get(name)
            .with_context(|| format!("Active provider '{name}' is not configured"))?,
        None => &fallback,
    };

    match config {
        ProviderConfig::Gemini { base_url, .. } => {
            let Some(api_key) = config.gemini_api_key() else {
                bail!(
                    "No Gemini API key configured; run `pulse settings set-key` or set {}",
                    API_KEY_ENV_VARS.join(" / ")
                )
            };
            let provider = GeminiProvider::new(GeminiConfig {
                api_key,
                base_url: base_url.clone(),
                timeout: settings.request_timeout(),
            })?;
            info!(base_url = %base_url, "Using Gemini provider");
            Ok(Arc::new(provider))
        }
        ProviderConfig::Mock { behavior } => {
            info!(?behavior, "Using mock provider");
            Ok(Arc::new(MockProvider::new(behavior.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockBehavior;

    #[test]
    fn test_mock_provider_from_settings() {
        let mut settings = Settings::default();
        settings.add_provider(
            "mock".to_string(),
            ProviderConfig::Mock {
                behavior: MockBehavior::Empty,
            },
        );
        settings.set_active_provider("mock").unwrap();

        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_configured_gemini_key() {
        let mut settings = Settings::default();
        settings.set_gemini_api_key("test-key".to_string());

        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.name(), "Gemini");
    }

    #[test]
    fn test_unknown_active_provider_is_error() {
        let settings = Settings {
            active_provider: Some("missing".to_string()),
            ..Settings::default()
        };

        let err = create_provider(&settings).err().unwrap();
        assert!(err.to_string().contains("missing"));
    }
}
