use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandHealth {
    pub seo_score: f64,
    pub brand_voice: String,
    pub voice_description: String,
    pub gaps: Vec<String>,
    pub color_palette: Vec<String>,
    pub typography: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    pub description: String,
    pub demographics: String,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPlan {
    pub platform: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub target_persona: Persona,
    pub value_proposition: String,
    pub channels: Vec<ChannelPlan>,
    pub roadmap: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdCopy {
    pub headline: String,
    pub caption: String,
    pub cta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdConcept {
    pub id: String,
    pub title: String,
    pub concept_type: String,
    pub copy: AdCopy,
    pub visual_prompt: String,
    /// Filled locally once an image has been generated for the concept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub health: BrandHealth,
    pub strategy: Strategy,
    pub ads: Vec<AdConcept>,
}

/// Most ads an audit keeps once new concepts are merged in
pub const MAX_AUDIT_ADS: usize = 6;

impl AuditResult {
    pub fn find_ad(&self, id: &str) -> Option<&AdConcept> {
        self.ads.iter().find(|ad| ad.id == id)
    }

    /// Put `ads` ahead of the existing concepts, keeping the newest
    /// `MAX_AUDIT_ADS`.
    pub fn prepend_ads(&mut self, ads: Vec<AdConcept>) {
        let previous = std::mem::replace(&mut self.ads, ads);
        self.ads.extend(previous);
        self.ads.truncate(MAX_AUDIT_ADS);
    }

    /// Add `ads` after the existing concepts
    pub fn append_ads(&mut self, ads: Vec<AdConcept>) {
        self.ads.extend(ads);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentHeatmap {
    pub trust: f64,
    pub excitement: f64,
    pub confusion: f64,
    pub urgency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaReaction {
    pub persona_name: String,
    pub persona_trait: String,
    pub reaction_text: String,
    pub buy_probability: f64,
    pub critique: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub average_conversion_lift: f64,
    pub sentiment_heatmap: SentimentHeatmap,
    pub reactions: Vec<PersonaReaction>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
pub enum Platform {
    Instagram,
    LinkedIn,
    TikTok,
    Email,
    Search,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAsset {
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub copy: String,
    pub visual_direction: String,
    pub behavioral_logic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmniChannelCampaign {
    pub id: String,
    pub assets: Vec<PlatformAsset>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
pub enum SignalCategory {
    Competitor,
    Trend,
    Opportunity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceSignal {
    pub title: String,
    pub description: String,
    /// Source link; filled from the grounding sources after parsing
    #[serde(default)]
    pub url: String,
    pub source: String,
    pub relevance: f64,
    pub category: SignalCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedPivot {
    pub theme: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarRoomIntelligence {
    pub signals: Vec<IntelligenceSignal>,
    pub strategic_assessment: String,
    pub recommended_pivot: RecommendedPivot,
}

/// A generated ad visual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AdImage {
    /// Inline image returned by the service
    Inline { mime_type: String, data: String },
    /// The service produced no image; a placeholder URL stands in
    Placeholder { url: String },
}

impl AdImage {
    /// URL suitable for an `<img src>`: a data URL for inline images
    pub fn url(&self) -> String {
        match self {
            Self::Inline { mime_type, data } => format!("data:{mime_type};base64,{data}"),
            Self::Placeholder { url } => url.clone(),
        }
    }
}
