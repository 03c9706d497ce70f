use crate::ai::{error::AiError, model::Model, provider::AiProvider, types::*};
use std::sync::{Arc, Mutex};

/// Mock behavior for the mock provider
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MockBehavior {
    /// Return a short text response
    #[default]
    Success,
    /// Return the given text, optionally citing grounding sources
    Text {
        text: String,
        #[serde(default)]
        grounding: Vec<String>,
    },
    /// Return a single inline data part (audio or image payload)
    InlineData { mime_type: String, data: String },
    /// Return a response without any candidates
    Empty,
    /// Always fail with a quota exhaustion error
    QuotaExhausted,
    /// Always return a retryable error
    AlwaysRetryableError,
    /// Always return a non-retryable error
    AlwaysNonRetryableError,
    /// Play the queued behaviors in order, then fall back to `Success`
    BehaviorQueue { behaviors: Vec<MockBehavior> },
}

impl MockBehavior {
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self::Text {
            text: serde_json::to_string(value).unwrap_or_default(),
            grounding: Vec::new(),
        }
    }
}

/// Mock AI provider for testing
#[derive(Clone)]
pub struct MockProvider {
    behavior: Arc<Mutex<MockBehavior>>,
    call_count: Arc<Mutex<usize>>,
    captured_requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            call_count: Arc::new(Mutex::new(0)),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn pop_behavior_from_queue(behavior: &mut MockBehavior) -> MockBehavior {
        if let MockBehavior::BehaviorQueue { behaviors } = behavior {
            if behaviors.is_empty() {
                return MockBehavior::Success;
            }
            return behaviors.remove(0);
        }
        behavior.clone()
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_captured_requests(&self) -> Vec<GenerationRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    pub fn get_last_captured_request(&self) -> Option<GenerationRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supports(&self, _model: Model) -> bool {
        true
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiError> {
        self.captured_requests.lock().unwrap().push(request);
        *self.call_count.lock().unwrap() += 1;

        let effective = {
            let mut behavior = self.behavior.lock().unwrap();
            Self::pop_behavior_from_queue(&mut behavior)
        };

        match effective {
            MockBehavior::Success => Ok(GenerationResponse::text("Mock response")),
            MockBehavior::Text { text, grounding } => Ok(GenerationResponse {
                parts: vec![ResponsePart::Text(text)],
                grounding: grounding
                    .into_iter()
                    .map(|uri| GroundingSource { uri, title: None })
                    .collect(),
            }),
            MockBehavior::InlineData { mime_type, data } => {
                Ok(GenerationResponse::inline_data(mime_type, data))
            }
            MockBehavior::Empty => Ok(GenerationResponse::default()),
            MockBehavior::QuotaExhausted => Err(AiError::QuotaExhausted(anyhow::anyhow!(
                "Mock quota exhausted (429 RESOURCE_EXHAUSTED)"
            ))),
            MockBehavior::AlwaysRetryableError => Err(AiError::Retryable(anyhow::anyhow!(
                "Mock retryable error (always fails)"
            ))),
            MockBehavior::AlwaysNonRetryableError => Err(AiError::Terminal(anyhow::anyhow!(
                "Mock non-retryable error"
            ))),
            MockBehavior::BehaviorQueue { .. } => {
                panic!("Bug: nested BehaviorQueue detected. Test setup error - BehaviorQueues cannot contain other BehaviorQueues")
            }
        }
    }
}
