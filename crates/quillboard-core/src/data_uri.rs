//! Data-URI helpers for image content.
//!
//! Placed images carry their pixels inline as `data:<mime>;base64,<payload>`
//! strings so the scene stays self-contained when the project is saved.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Encode raw bytes as a base64 data URI.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode a base64 data URI into its MIME type and payload.
///
/// Returns `None` for plain URLs and malformed URIs; callers treat those as
/// externally hosted images they cannot inspect.
pub fn decode(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// Guess a MIME type from magic bytes (PNG, JPEG, WebP).
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let bytes = vec![1u8, 2, 3, 250];
        let uri = encode("image/png", &bytes);
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, back) = decode(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(back, bytes);
    }

    #[test]
    fn test_decode_rejects_plain_urls() {
        assert!(decode("https://example.com/cat.png").is_none());
        assert!(decode("data:image/png,notbase64marker").is_none());
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&[0x89, 0x50, 0x4E, 0x47, 0, 0]), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"GIF89a"), None);
    }
}
