//! Base64URL (no padding) encoding as used throughout Sidetree
//! ([`DATA_ENCODING_SCHEME`](https://identity.foundation/sidetree/spec/v1.0.0/#data-encoding-scheme)).

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};

use crate::{ErrorCode, IonError, Result};

pub fn encode(content: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(content)
}

/// Decode a Base64URL string.
///
/// `context` names the input in the error message, e.g. `didSuffix`.
pub fn decode_as_bytes(encoded: &str, context: &str) -> Result<Vec<u8>> {
    let not_base64url = || {
        IonError::new(
            ErrorCode::EncodedStringIncorrectEncoding,
            format!("Given {context} must be base64url string."),
        )
    };

    if !is_base64url_string(encoded) {
        return Err(not_base64url());
    }

    BASE64_URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| not_base64url())
}

pub fn decode_as_string(encoded: &str, context: &str) -> Result<String> {
    let bytes = decode_as_bytes(encoded, context)?;
    String::from_utf8(bytes).map_err(|_| {
        IonError::new(
            ErrorCode::EncodedStringIncorrectEncoding,
            format!("Given {context} is not UTF-8 once decoded."),
        )
    })
}

/// Whether `input` is a non-empty string over `[A-Za-z0-9_-]`.
///
/// Length is not checked to be a multiple of four, since padding is omitted.
pub fn is_base64url_string(input: &str) -> bool {
    !input.is_empty()
        && input
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
