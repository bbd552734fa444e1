use base64::{engine::general_purpose, Engine};

/// Base64 text the AI endpoint expects for inline image data.
pub fn encode_image(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(encoded)
}
