use base64::Engine;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64 audio payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("invalid audio profile: {sample_rate} Hz, {channels} channel(s)")]
    InvalidProfile { sample_rate: u32, channels: u16 },
}

/// Decode a standard-alphabet, padded base64 string into raw bytes.
///
/// Surrounding ASCII whitespace is ignored; anything else outside the
/// alphabet is an error.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = encoded.trim_matches(|c: char| c.is_ascii_whitespace());
    Ok(base64::engine::general_purpose::STANDARD.decode(trimmed)?)
}
