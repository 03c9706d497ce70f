pub mod ai;
pub mod brand;
pub mod settings;
pub mod voice;

// Public library API
pub use ai::{create_provider, AiError, AiProvider};
pub use brand::{BrandStudio, StudioConfig};
pub use settings::{Settings, SettingsManager};
pub use voice::audio::{decode_base64, normalize_pcm, AudioOutput, DecodedAudioBuffer};
pub use voice::{NarrationOutcome, NarrationState, Narrator};
