//! Speech synthesis, audio decoding and playback

pub mod audio;
pub mod narrator;
pub mod tts;

pub use narrator::{NarrationError, NarrationOutcome, NarrationState, Narrator};
