use tracing::{debug, info};

use super::types::*;
use super::validate::parse_response;
use super::{prompts, schemas};
use crate::ai::{AiError, AiProvider, GenerationRequest, Model, OutputKind};

const GROUNDING_FALLBACK_URL: &str = "#";

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub reasoning_model: Model,
    pub image_model: Model,
    pub image_aspect_ratio: String,
    pub image_size: String,
    /// Shown in place of an image when the service returns none
    pub image_fallback_url: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            reasoning_model: Model::Gemini3ProPreview,
            image_model: Model::Gemini3ProImagePreview,
            image_aspect_ratio: "1:1".to_string(),
            image_size: "1K".to_string(),
            image_fallback_url: "https://picsum.photos/800/800".to_string(),
        }
    }
}

/// Brand audits, creatives and simulations produced by a generative provider.
///
/// Every operation is a single request; failures are returned as-is and
/// never retried.
pub struct BrandStudio<P> {
    provider: P,
    config: StudioConfig,
}

impl<P: AiProvider> BrandStudio<P> {
    pub fn new(provider: P, config: StudioConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn perform_deep_audit(&self, url: &str) -> Result<AuditResult, AiError> {
        info!(url, "performing deep audit");
        let request = GenerationRequest::json(
            self.config.reasoning_model,
            prompts::deep_audit(url),
            schemas::audit_result(),
        );
        let response = self.provider.generate(request).await?;
        parse_response(&response)
    }

    pub async fn generate_more_ads(
        &self,
        health: &BrandHealth,
        strategy: &Strategy,
    ) -> Result<Vec<AdConcept>, AiError> {
        let request = GenerationRequest::json(
            self.config.reasoning_model,
            prompts::more_ads(health, strategy)?,
            schemas::ad_concepts(),
        );
        let response = self.provider.generate(request).await?;
        let ads: Vec<AdConcept> = parse_response(&response)?;
        debug!(count = ads.len(), "generated ad concepts");
        Ok(ads)
    }

    pub async fn run_ad_simulation(
        &self,
        ad: &AdConcept,
        strategy: &Strategy,
    ) -> Result<SimulationResult, AiError> {
        info!(ad_id = %ad.id, "running ad simulation");
        let request = GenerationRequest::json(
            self.config.reasoning_model,
            prompts::ad_simulation(ad, strategy)?,
            schemas::simulation_result(),
        );
        let response = self.provider.generate(request).await?;
        parse_response(&response)
    }

    pub async fn generate_omni_channel_campaign(
        &self,
        ad: &AdConcept,
        strategy: &Strategy,
    ) -> Result<OmniChannelCampaign, AiError> {
        info!(ad_id = %ad.id, "forging omni-channel campaign");
        let request = GenerationRequest::json(
            self.config.reasoning_model,
            prompts::omni_channel(ad, strategy)?,
            schemas::omni_channel_campaign(),
        );
        let response = self.provider.generate(request).await?;
        parse_response(&response)
    }

    /// Search-grounded scan of recent market news. Signal URLs come from the
    /// grounding sources by position, falling back to the first source and
    /// then to `#`.
    pub async fn fetch_market_intelligence(
        &self,
        brand: &str,
        niche: &str,
    ) -> Result<WarRoomIntelligence, AiError> {
        info!(brand, niche, "fetching market intelligence");
        let request = GenerationRequest::json(
            self.config.reasoning_model,
            prompts::market_intelligence(brand, niche),
            schemas::war_room_intelligence(),
        )
        .with_grounding();
        let response = self.provider.generate(request).await?;
        let mut intelligence: WarRoomIntelligence = parse_response(&response)?;

        for (idx, signal) in intelligence.signals.iter_mut().enumerate() {
            signal.url = response
                .grounding
                .get(idx)
                .or_else(|| response.grounding.first())
                .map(|source| source.uri.clone())
                .unwrap_or_else(|| GROUNDING_FALLBACK_URL.to_string());
        }

        Ok(intelligence)
    }

    pub async fn generate_tactical_pivot(
        &self,
        ad: &AdConcept,
        theme: &str,
    ) -> Result<AdConcept, AiError> {
        info!(ad_id = %ad.id, theme, "generating tactical pivot");
        let request = GenerationRequest::json(
            self.config.reasoning_model,
            prompts::tactical_pivot(ad, theme)?,
            schemas::ad_concept(),
        );
        let response = self.provider.generate(request).await?;
        let mut pivot: AdConcept = parse_response(&response)?;
        if pivot.id == ad.id {
            pivot.id = format!("{}-pivot", ad.id);
        }
        Ok(pivot)
    }

    pub async fn generate_ad_image(&self, visual_prompt: &str) -> Result<AdImage, AiError> {
        let request = GenerationRequest::new(
            self.config.image_model,
            prompts::ad_image(visual_prompt),
            OutputKind::Image {
                aspect_ratio: self.config.image_aspect_ratio.clone(),
                image_size: self.config.image_size.clone(),
            },
        );
        let response = self.provider.generate(request).await?;

        match response.first_inline_data() {
            Some((mime_type, data)) => Ok(AdImage::Inline {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
            None => {
                debug!("image response carried no inline data, using placeholder");
                Ok(AdImage::Placeholder {
                    url: self.config.image_fallback_url.clone(),
                })
            }
        }
    }
}
