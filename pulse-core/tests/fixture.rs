#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use pulse_core::ai::mock::{MockBehavior, MockProvider};
use pulse_core::ai::AiError;
use pulse_core::brand::AuditResult;
use pulse_core::voice::audio::{
    AudioOutput, AudioProfile, DecodedAudioBuffer, PlaybackHandle, RecordingOutput,
};
use pulse_core::voice::tts::gemini::{GeminiSpeech, GeminiSpeechConfig};
use pulse_core::voice::tts::{SpeechPayload, TextToSpeech, Voice};
use pulse_core::voice::Narrator;

pub type MockNarrator = Narrator<GeminiSpeech<MockProvider>, RecordingOutput>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Little-endian 16-bit PCM, base64 encoded
pub fn pcm_base64(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn audio_behavior(samples: &[i16]) -> MockBehavior {
    MockBehavior::InlineData {
        mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
        data: pcm_base64(samples),
    }
}

pub struct NarrationFixture {
    pub narrator: Arc<MockNarrator>,
    pub provider: MockProvider,
    pub output: RecordingOutput,
}

impl NarrationFixture {
    pub fn new(behavior: MockBehavior) -> Self {
        Self::with_output(behavior, RecordingOutput::new())
    }

    pub fn with_output(behavior: MockBehavior, output: RecordingOutput) -> Self {
        init_tracing();
        let provider = MockProvider::new(behavior);
        let tts = GeminiSpeech::new(provider.clone(), GeminiSpeechConfig::default());
        Self {
            narrator: Arc::new(Narrator::new(tts, output.clone())),
            provider,
            output,
        }
    }
}

/// Speech source whose answers are released by the test, one per text.
#[derive(Clone, Default)]
pub struct GatedSpeech {
    gates: Arc<Mutex<HashMap<String, oneshot::Receiver<SpeechPayload>>>>,
}

impl GatedSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text`; sending on the returned channel answers its request.
    pub fn gate(&self, text: &str) -> oneshot::Sender<SpeechPayload> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }
}

#[async_trait]
impl TextToSpeech for GatedSpeech {
    fn default_voice(&self) -> Voice {
        Voice::prebuilt("Kore")
    }

    fn profile(&self) -> AudioProfile {
        AudioProfile::SPEECH
    }

    async fn synthesize(&self, text: &str, _voice: Option<&Voice>) -> Result<SpeechPayload, AiError> {
        let gate = self.gates.lock().unwrap().remove(text);
        let Some(gate) = gate else {
            return Err(AiError::Terminal(anyhow::anyhow!("no gate for {text:?}")));
        };
        gate.await
            .map_err(|_| AiError::Terminal(anyhow::anyhow!("gate for {text:?} was dropped")))
    }
}

/// Output that takes `delay` to open the device before handing the buffer to
/// a manual `RecordingOutput`, like a real device starting its stream.
#[derive(Clone)]
pub struct SlowOutput {
    pub inner: RecordingOutput,
    delay: Duration,
}

impl SlowOutput {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: RecordingOutput::manual(),
            delay,
        }
    }
}

impl AudioOutput for SlowOutput {
    fn play(&self, buffer: DecodedAudioBuffer) -> anyhow::Result<PlaybackHandle> {
        std::thread::sleep(self.delay);
        self.inner.play(buffer)
    }
}

pub fn speech_payload(samples: &[i16]) -> SpeechPayload {
    SpeechPayload {
        base64: pcm_base64(samples),
        profile: AudioProfile::SPEECH,
    }
}

pub fn ad_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Launch Day",
        "conceptType": "Social Proof",
        "copy": {
            "headline": "Join 10,000 founders",
            "caption": "The brand toolkit teams actually finish setting up.",
            "cta": "Start free"
        },
        "visualPrompt": "A crowded rooftop launch party at dusk"
    })
}

pub fn audit_json() -> Value {
    json!({
        "health": {
            "seoScore": 68,
            "brandVoice": "Playful expert",
            "voiceDescription": "Knowledgeable without being stiff",
            "gaps": ["No case studies", "Weak mobile CTA"],
            "colorPalette": ["#0F172A", "#F97316"],
            "typography": "Inter / Space Grotesk"
        },
        "strategy": {
            "targetPersona": {
                "name": "Scaling Sam",
                "description": "Series A founder running marketing alone",
                "demographics": "30-40, urban, B2B SaaS",
                "painPoints": ["No time", "Inconsistent brand"]
            },
            "valueProposition": "A brand team in a box",
            "channels": [
                {"platform": "LinkedIn", "rationale": "Where founders research tools"}
            ],
            "roadmap": ["Week 1: audit", "Week 2: launch"]
        },
        "ads": [ad_json("ad-1"), ad_json("ad-2")]
    })
}

pub fn sample_audit() -> AuditResult {
    serde_json::from_value(audit_json()).unwrap()
}

pub fn intelligence_json(signal_count: usize) -> Value {
    let signals: Vec<Value> = (0..signal_count)
        .map(|i| {
            json!({
                "title": format!("Signal {i}"),
                "description": "Competitor cut prices",
                "source": "News",
                "relevance": 80,
                "category": "Competitor"
            })
        })
        .collect();

    json!({
        "signals": signals,
        "strategicAssessment": "Lean into quality over price",
        "recommendedPivot": {
            "theme": "Premium craftsmanship",
            "rationale": "Price war is unwinnable"
        }
    })
}
