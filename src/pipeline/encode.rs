//! Base64 transport encoding for request and response payloads.
//!
//! JSON cannot carry raw bytes, so the workbook arrives and the PDF leaves as
//! standard-alphabet, padded base64. Clients that wrap long payloads at 76
//! columns (MIME style) are accepted: ASCII whitespace is stripped before
//! decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode bytes as standard, padded base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), b64.len());
    b64
}

/// Decode standard base64, ignoring embedded ASCII whitespace.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if input.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact)
    } else {
        STANDARD.decode(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_payload() {
        let decoded = decode_base64("SGVs\nbG8s\r\nIHdv cmxk").unwrap();
        assert_eq!(decoded, b"Hello, world");
    }

    #[test]
    fn rejects_invalid_alphabet() {
        assert!(decode_base64("not*base64!").is_err());
    }

    #[test]
    fn rejects_missing_padding() {
        assert!(decode_base64("SGVsbG8").is_err());
    }

    #[test]
    fn empty_input_is_empty_bytes() {
        assert_eq!(decode_base64("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encodes_pdf_signature() {
        let encoded = encode_base64(b"%PDF");
        assert_eq!(decode_base64(&encoded).unwrap(), b"%PDF");
    }
}
