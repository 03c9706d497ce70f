pub mod gemini;
pub mod provider;
pub mod types;

pub use gemini::GeminiSpeech;
pub use provider::TextToSpeech;
pub use types::{SpeechPayload, Voice};
