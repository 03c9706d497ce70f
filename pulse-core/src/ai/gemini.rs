use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::model::Model;
use crate::ai::{error::AiError, provider::AiProvider, types::*};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: Model) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model.name())
    }
}

#[async_trait::async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn supports(&self, model: Model) -> bool {
        model != Model::None
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiError> {
        if !self.supports(request.model) {
            return Err(AiError::Terminal(anyhow::anyhow!(
                "Model {} is not supported by Gemini",
                request.model.name()
            )));
        }

        let body = build_request_body(&request);
        debug!(model = %request.model, grounding = request.grounding, "Using Gemini API");

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "Gemini API call failed");
                AiError::Retryable(anyhow::anyhow!("Network error: {}", e))
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::Retryable(anyhow::anyhow!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!(?status, ?response_text, "Gemini API returned error");
            return Err(classify_error(status, &response_text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            AiError::Terminal(anyhow::anyhow!(
                "Failed to parse Gemini response: {} - Response: {}",
                e,
                response_text
            ))
        })?;

        let response = into_generation_response(parsed)?;
        info!(
            model = %request.model,
            parts = response.parts.len(),
            grounding_sources = response.grounding.len(),
            "Gemini response received"
        );
        Ok(response)
    }
}

/// Map a non-success HTTP answer onto the error taxonomy.
///
/// 429 and the `RESOURCE_EXHAUSTED` status both mean the key's quota is
/// spent; 5xx is the service's own failure; anything else is the caller's.
pub fn classify_error(status: StatusCode, body: &str) -> AiError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let service_status = envelope
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .unwrap_or_default();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.as_str())
        .unwrap_or(body);

    if status == StatusCode::TOO_MANY_REQUESTS || service_status == "RESOURCE_EXHAUSTED" {
        return AiError::QuotaExhausted(anyhow::anyhow!(
            "Gemini API error {}: {}",
            status,
            message
        ));
    }

    if status.is_server_error() {
        return AiError::Retryable(anyhow::anyhow!(
            "Gemini API error {}: {}",
            status,
            message
        ));
    }

    AiError::Terminal(anyhow::anyhow!("Gemini API error {}: {}", status, message))
}

fn build_request_body(request: &GenerationRequest) -> GeminiRequest {
    let generation_config = match &request.output {
        OutputKind::Text => None,
        OutputKind::Json(schema) => Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.clone()),
            ..Default::default()
        }),
        OutputKind::Audio { voice } => Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice.clone(),
                    },
                },
            }),
            ..Default::default()
        }),
        OutputKind::Image {
            aspect_ratio,
            image_size,
        } => Some(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: aspect_ratio.clone(),
                image_size: image_size.clone(),
            }),
            ..Default::default()
        }),
    };

    let tools = if request.grounding {
        Some(vec![Tool {
            google_search: serde_json::json!({}),
        }])
    } else {
        None
    };

    GeminiRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![RequestPart {
                text: request.prompt.clone(),
            }],
        }],
        generation_config,
        tools,
    }
}

fn into_generation_response(parsed: GeminiResponse) -> Result<GenerationResponse, AiError> {
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AiError::Terminal(anyhow::anyhow!(
            "Prompt blocked by Gemini: {reason}"
        )));
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Ok(GenerationResponse::default());
    };

    let parts = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought.unwrap_or(false))
        .filter_map(|p| {
            if let Some(inline) = p.inline_data {
                Some(ResponsePart::InlineData {
                    mime_type: inline.mime_type,
                    data: inline.data,
                })
            } else {
                p.text.map(ResponsePart::Text)
            }
        })
        .collect();

    let grounding = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .map(|web| GroundingSource {
            uri: web.uri,
            title: web.title,
        })
        .collect();

    Ok(GenerationResponse { parts, grounding })
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
    image_size: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePartWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePartWire {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}
