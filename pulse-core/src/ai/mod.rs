pub mod error;
pub mod factory;
pub mod gemini;
pub mod mock;
pub mod model;
pub mod provider;
pub mod schema;
pub mod types;

pub use error::AiError;
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use model::Model;
pub use provider::AiProvider;
pub use types::*;
