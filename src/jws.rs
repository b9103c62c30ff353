//! Compact JWS ([RFC 7515]) signing and verification for ES256K and EdDSA.
//!
//! The signing input is `b64url(header) "." b64url(payload)` where the header
//! is the JSON text of [`Header`] (`{"alg":"ES256K"}` or `{"alg":"EdDSA"}`).
//!
//! [RFC 7515]: https://www.rfc-editor.org/rfc/rfc7515

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{encoder, ErrorCode, IonError, Jwk, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Algorithm {
    /// ECDSA over secp256k1 with SHA-256.
    ES256K,
    /// Ed25519 ([RFC 8037](https://www.rfc-editor.org/rfc/rfc8037)).
    EdDSA,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ES256K => "ES256K",
            Self::EdDSA => "EdDSA",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JOSE header. Sidetree operations only carry `alg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: Algorithm,
}

impl Header {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    /// Header for signing with `key`.
    pub fn for_key(key: &Jwk) -> Self {
        Self::new(key.algorithm())
    }
}

fn base64_encode_json<T: Serialize>(object: &T) -> Result<String> {
    let json = serde_json::to_vec(object)?;
    Ok(encoder::encode(json))
}

fn malformed(message: impl Into<String>) -> IonError {
    IonError::new(ErrorCode::JwsMalformed, message)
}

fn check_algorithm(algorithm: Algorithm, key: &Jwk) -> Result<()> {
    if key.algorithm() != algorithm {
        return Err(IonError::new(
            ErrorCode::JwsAlgorithmMismatch,
            format!(
                "Algorithm {algorithm} cannot be used with a key meant for {}.",
                key.algorithm()
            ),
        ));
    }
    Ok(())
}

pub fn sign_bytes(algorithm: Algorithm, data: &[u8], key: &Jwk) -> Result<Vec<u8>> {
    check_algorithm(algorithm, key)?;
    let signature = match algorithm {
        Algorithm::ES256K => {
            use k256::ecdsa::signature::Signer;
            let signing_key = k256::ecdsa::SigningKey::from(key.secp256k1_secret_key()?);
            let sig: k256::ecdsa::Signature = signing_key
                .try_sign(data)
                .map_err(|e| IonError::new(ErrorCode::SigningFailed, e.to_string()))?;
            sig.to_bytes().to_vec()
        }
        Algorithm::EdDSA => {
            use ed25519_dalek::Signer;
            let signing_key = key.ed25519_signing_key()?;
            signing_key.sign(data).to_bytes().to_vec()
        }
    };
    Ok(signature)
}

pub fn sign_bytes_b64(algorithm: Algorithm, data: &[u8], key: &Jwk) -> Result<String> {
    let signature = sign_bytes(algorithm, data, key)?;
    Ok(encoder::encode(signature))
}

/// Check `signature` over `data`. `Ok(false)` means the signature does not
/// match; errors are reserved for unusable keys and malformed signatures.
///
/// ES256K signatures with a high `s` are accepted.
pub fn verify_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &Jwk,
    signature: &[u8],
) -> Result<bool> {
    check_algorithm(algorithm, key)?;
    let verified = match algorithm {
        Algorithm::ES256K => {
            use k256::ecdsa::signature::Verifier;
            let verifying_key = k256::ecdsa::VerifyingKey::from(key.secp256k1_public_key()?);
            let sig = k256::ecdsa::Signature::try_from(signature)
                .map_err(|_| malformed("Invalid ES256K signature encoding."))?;
            let sig = sig.normalize_s().unwrap_or(sig);
            verifying_key.verify(data, &sig).is_ok()
        }
        Algorithm::EdDSA => {
            use ed25519_dalek::Verifier;
            let verifying_key = key.ed25519_verifying_key()?;
            let sig = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|_| malformed("Invalid EdDSA signature encoding."))?;
            verifying_key.verify(data, &sig).is_ok()
        }
    };
    Ok(verified)
}

fn ensure_verified(verified: bool) -> Result<()> {
    if !verified {
        return Err(IonError::new(
            ErrorCode::SignatureVerificationFailed,
            "Signature verification failed.",
        ));
    }
    Ok(())
}

/// Sign `payload` with `key` and return a compact JWS.
pub fn sign(header: &Header, payload: &[u8], key: &Jwk) -> Result<String> {
    let signing_input = base64_encode_json(header)? + "." + &encoder::encode(payload);
    let sig_b64 = sign_bytes_b64(header.algorithm, signing_input.as_bytes(), key)?;
    Ok([signing_input, sig_b64].join("."))
}

/// Sign `payload` and return a compact JWS with the payload part left empty
/// ([RFC 7515 Appendix F](https://www.rfc-editor.org/rfc/rfc7515#appendix-F)).
pub fn sign_detached(header: &Header, payload: &[u8], key: &Jwk) -> Result<String> {
    let header_b64 = base64_encode_json(header)?;
    let signing_input = header_b64.clone() + "." + &encoder::encode(payload);
    let sig_b64 = sign_bytes_b64(header.algorithm, signing_input.as_bytes(), key)?;
    Ok(header_b64 + ".." + &sig_b64)
}

pub fn split_jws(jws: &str) -> Result<(&str, &str, &str)> {
    let mut parts = jws.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(c), None) => Ok((a, b, c)),
        _ => Err(malformed("Compact JWS must have exactly three parts.")),
    }
}

pub fn split_detached_jws(jws: &str) -> Result<(&str, &str)> {
    let (header_b64, omitted_payload, signature_b64) = split_jws(jws)?;
    if !omitted_payload.is_empty() {
        return Err(malformed("Detached JWS must have an empty payload part."));
    }
    Ok((header_b64, signature_b64))
}

pub struct DecodedJws {
    pub header: Header,
    pub signing_input: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Decode the Base64URL parts of a compact JWS.
pub fn decode_jws_parts(
    header_b64: &str,
    payload_b64: &str,
    signature_b64: &str,
) -> Result<DecodedJws> {
    let header_json = encoder::decode_as_bytes(header_b64, "JWS header")?;
    let header: Header = serde_json::from_slice(&header_json)
        .map_err(|e| malformed(format!("Invalid JWS header: {e}")))?;
    let payload = if payload_b64.is_empty() {
        Vec::new()
    } else {
        encoder::decode_as_bytes(payload_b64, "JWS payload")?
    };
    let signature = encoder::decode_as_bytes(signature_b64, "JWS signature")?;
    let signing_input = [header_b64.as_bytes(), b".", payload_b64.as_bytes()].concat();
    Ok(DecodedJws {
        header,
        signing_input,
        payload,
        signature,
    })
}

/// Verify a compact JWS. Returns the header and the decoded payload.
pub fn decode_verify(jws: &str, key: &Jwk) -> Result<(Header, Vec<u8>)> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJws {
        header,
        signing_input,
        payload,
        signature,
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    ensure_verified(verify_bytes(header.algorithm, &signing_input, key, &signature)?)?;
    Ok((header, payload))
}

/// Check a compact JWS against `key`.
pub fn verify(jws: &str, key: &Jwk) -> Result<bool> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJws {
        header,
        signing_input,
        signature,
        ..
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    verify_bytes(header.algorithm, &signing_input, key, &signature)
}

/// Check a JWS produced by [`sign_detached`] against `payload`.
pub fn verify_detached(jws: &str, key: &Jwk, payload: &[u8]) -> Result<bool> {
    let (header_b64, signature_b64) = split_detached_jws(jws)?;
    let payload_b64 = encoder::encode(payload);
    let DecodedJws {
        header,
        signing_input,
        signature,
        ..
    } = decode_jws_parts(header_b64, &payload_b64, signature_b64)?;
    verify_bytes(header.algorithm, &signing_input, key, &signature)
}

pub fn decode_unverified(jws: &str) -> Result<(Header, Vec<u8>)> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJws {
        header, payload, ..
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    Ok((header, payload))
}

/// Decode the payload of a compact JWS as JSON, without verifying it.
pub fn decode_payload<T: DeserializeOwned>(jws: &str) -> Result<(Header, T)> {
    let (header, payload) = decode_unverified(jws)?;
    let claims = serde_json::from_slice(&payload)
        .map_err(|e| malformed(format!("Invalid JWS payload: {e}")))?;
    Ok((header, claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::{generate_ed25519_operation_key_pair, generate_es256k_operation_key_pair};

    #[test]
    fn header_json() {
        assert_eq!(
            serde_json::to_string(&Header::new(Algorithm::ES256K)).unwrap(),
            r#"{"alg":"ES256K"}"#
        );
        assert_eq!(
            base64_encode_json(&Header::new(Algorithm::ES256K)).unwrap(),
            "eyJhbGciOiJFUzI1NksifQ"
        );
        assert_eq!(
            serde_json::to_string(&Header::new(Algorithm::EdDSA)).unwrap(),
            r#"{"alg":"EdDSA"}"#
        );
    }

    #[test]
    fn es256k_sign_verify() {
        let (public, private) = generate_es256k_operation_key_pair();
        let header = Header::for_key(&private);
        let jws = sign(&header, b"{\"a\":1}", &private).unwrap();
        assert!(jws.starts_with("eyJhbGciOiJFUzI1NksifQ."));

        let (_, payload) = decode_verify(&jws, &public).unwrap();
        assert_eq!(payload, b"{\"a\":1}");

        // deterministic (RFC 6979)
        assert_eq!(jws, sign(&header, b"{\"a\":1}", &private).unwrap());

        let (other, _) = generate_es256k_operation_key_pair();
        assert!(verify(&jws, &public).unwrap());
        assert!(!verify(&jws, &other).unwrap());
        let err = decode_verify(&jws, &other).unwrap_err();
        assert_eq!(err.code, ErrorCode::SignatureVerificationFailed);
    }

    #[test]
    fn ed25519_sign_verify() {
        let (public, private) = generate_ed25519_operation_key_pair();
        let header = Header::for_key(&private);
        let jws = sign(&header, b"hello", &private).unwrap();
        decode_verify(&jws, &public).unwrap();

        let (header, payload_b64, _) = split_jws(&jws).unwrap();
        let forged = format!("{header}.{payload_b64}.{}", encoder::encode([0u8; 64]));
        assert!(!verify(&forged, &public).unwrap());
        assert!(decode_verify(&forged, &public).is_err());
    }

    #[test]
    fn algorithm_must_match_key() {
        let (_, private) = generate_ed25519_operation_key_pair();
        let err = sign(&Header::new(Algorithm::ES256K), b"x", &private).unwrap_err();
        assert_eq!(err.code, ErrorCode::JwsAlgorithmMismatch);
    }

    #[test]
    fn public_key_cannot_sign() {
        let (public, _) = generate_es256k_operation_key_pair();
        let err = sign_bytes(Algorithm::ES256K, b"x", &public).unwrap_err();
        assert_eq!(err.code, ErrorCode::SigningFailed);
    }

    #[test]
    fn detached() {
        let (public, private) = generate_es256k_operation_key_pair();
        let jws = sign_detached(&Header::for_key(&private), b"payload", &private).unwrap();
        assert!(jws.contains(".."));
        assert!(verify_detached(&jws, &public, b"payload").unwrap());
        assert!(!verify_detached(&jws, &public, b"other").unwrap());
    }

    #[test]
    fn malformed_jws() {
        assert_eq!(split_jws("a.b").unwrap_err().code, ErrorCode::JwsMalformed);
        assert_eq!(split_jws("a.b.c.d").unwrap_err().code, ErrorCode::JwsMalformed);
        assert!(split_detached_jws("a.b.c").is_err());
    }

    #[test]
    fn payload_json() {
        let (_, private) = generate_es256k_operation_key_pair();
        let jws = sign(&Header::for_key(&private), br#"{"deltaHash":"x"}"#, &private).unwrap();
        let (header, claims): (_, serde_json::Value) = decode_payload(&jws).unwrap();
        assert_eq!(header.algorithm, Algorithm::ES256K);
        assert_eq!(claims["deltaHash"], "x");
    }
}
