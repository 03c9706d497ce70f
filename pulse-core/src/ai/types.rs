use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::model::Model;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: Model,
    pub prompt: String,
    pub output: OutputKind,
    /// Let the service ground its answer on live web search results.
    pub grounding: bool,
}

impl GenerationRequest {
    pub fn new(model: Model, prompt: impl Into<String>, output: OutputKind) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            output,
            grounding: false,
        }
    }

    pub fn json(model: Model, prompt: impl Into<String>, schema: Value) -> Self {
        Self::new(model, prompt, OutputKind::Json(schema))
    }

    pub fn with_grounding(mut self) -> Self {
        self.grounding = true;
        self
    }
}

/// The shape of output requested from the service.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputKind {
    Text,
    /// JSON constrained by a response schema (see `ai::schema`)
    Json(Value),
    Audio {
        voice: String,
    },
    Image {
        aspect_ratio: String,
        image_size: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponsePart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

/// A web source the service cites for a grounded answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    pub parts: Vec<ResponsePart>,
    pub grounding: Vec<GroundingSource>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ResponsePart::Text(text.into())],
            grounding: Vec::new(),
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            parts: vec![ResponsePart::InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }],
            grounding: Vec::new(),
        }
    }

    /// Concatenation of all text parts, `None` when there are none
    pub fn joined_text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                ResponsePart::Text(t) => Some(t.as_str()),
                ResponsePart::InlineData { .. } => None,
            })
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// First inline payload as `(mime_type, base64 data)`
    pub fn first_inline_data(&self) -> Option<(&str, &str)> {
        self.parts.iter().find_map(|p| match p {
            ResponsePart::InlineData { mime_type, data } => {
                Some((mime_type.as_str(), data.as_str()))
            }
            ResponsePart::Text(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
