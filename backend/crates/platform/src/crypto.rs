//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use uuid::Uuid;

/// Generate an unpredictable session token
///
/// UUID v4 carries 122 random bits from the OS generator.
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Encode bytes as standard base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Decode standard base64 into a UTF-8 string
///
/// Returns `None` for invalid base64 as well as for non-UTF-8 payloads.
pub fn decode_base64_utf8(s: &str) -> Option<String> {
    let bytes = from_base64(s).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tokens_are_unique_uuids() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_base64_roundtrip() {
        let data = b"hello world";
        let encoded = to_base64(data);
        let decoded = from_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_base64_utf8() {
        assert_eq!(
            decode_base64_utf8("Ym9iQGhidG4uaW86SDBsYmVydG9uU2Nob29sOTg="),
            Some("bob@hbtn.io:H0lbertonSchool98".to_string())
        );
        assert_eq!(decode_base64_utf8("Holberton"), None);
        // valid base64, invalid UTF-8
        assert_eq!(decode_base64_utf8("/w=="), None);
    }
}
