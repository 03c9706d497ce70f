pub mod prompts;
pub mod schemas;
pub mod studio;
pub mod types;
pub mod validate;

pub use studio::{BrandStudio, StudioConfig};
pub use types::*;
pub use validate::{parse_json, parse_response, Validate};
