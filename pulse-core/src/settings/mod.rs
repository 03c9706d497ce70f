pub mod config;
pub mod manager;


pub use config::{ImageSettings, ModelSettings, ProviderConfig, Settings, VoiceSettings};
pub use manager::SettingsManager;
