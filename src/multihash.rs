//! Multihash framing of [`HASH_PROTOCOL`][hp] values.
//!
//! A multihash is `<varint code><varint digest length><digest>`. Only SHA-256
//! (code `0x12`) is supported.
//!
//! [hp]: https://identity.foundation/sidetree/spec/v1.0.0/#hash-protocol

use ::multihash::Multihash;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{canonicalizer, encoder, ErrorCode, IonError, Result};

/// Multihash code of SHA-256.
pub const SHA2_256: u64 = 0x12;

type Multihash64 = Multihash<64>;

/// [`HASH_ALGORITHM`](https://identity.foundation/sidetree/spec/v1.0.0/#hash-algorithm):
/// the bare digest, without multihash prefix.
pub fn hash_as_non_multihash(content: &[u8], hash_algorithm_code: u64) -> Result<Vec<u8>> {
    match hash_algorithm_code {
        SHA2_256 => Ok(Sha256::digest(content).to_vec()),
        code => Err(IonError::new(
            ErrorCode::MultihashUnsupportedHashAlgorithm,
            format!("Hash algorithm defined in multihash code {code} is not supported."),
        )),
    }
}

/// Hash `content` and return the multihash bytes.
pub fn hash(content: &[u8], hash_algorithm_code: u64) -> Result<Vec<u8>> {
    let digest = hash_as_non_multihash(content, hash_algorithm_code)?;
    let multihash = Multihash64::wrap(hash_algorithm_code, &digest).map_err(|e| {
        IonError::new(ErrorCode::MultihashStringNotAMultihash, e.to_string())
    })?;
    Ok(multihash.to_bytes())
}

pub fn hash_then_encode(content: &[u8], hash_algorithm_code: u64) -> Result<String> {
    let multihash = hash(content, hash_algorithm_code)?;
    Ok(encoder::encode(multihash))
}

/// Canonicalize, hash once, encode. Used for reveal values, delta hashes and
/// DID suffixes.
pub fn canonicalize_then_hash_then_encode<T: Serialize + ?Sized>(
    value: &T,
    hash_algorithm_code: u64,
) -> Result<String> {
    let canonicalized = canonicalizer::canonicalize(value)?;
    hash_then_encode(&canonicalized, hash_algorithm_code)
}

/// Canonicalize, take the bare digest, then multihash that digest and encode.
/// Used for commitments.
///
/// The result is exactly one hash application away from
/// [`canonicalize_then_hash_then_encode`] of the same value.
pub fn canonicalize_then_double_hash_then_encode<T: Serialize + ?Sized>(
    value: &T,
    hash_algorithm_code: u64,
) -> Result<String> {
    let canonicalized = canonicalizer::canonicalize(value)?;
    let intermediate = hash_as_non_multihash(&canonicalized, hash_algorithm_code)?;
    hash_then_encode(&intermediate, hash_algorithm_code)
}

/// Check that `encoded` is a Base64URL multihash computed with
/// `hash_algorithm_code`.
///
/// `context` names the input in error messages, e.g. `didSuffix`.
pub fn validate_encoded_multihash(
    encoded: &str,
    hash_algorithm_code: u64,
    context: &str,
) -> Result<()> {
    let bytes = encoder::decode_as_bytes(encoded, context)?;
    let multihash = Multihash64::from_bytes(&bytes).map_err(|_| {
        IonError::new(
            ErrorCode::MultihashStringNotAMultihash,
            format!("Given {context} string '{encoded}' is not a multihash after decoding."),
        )
    })?;

    if multihash.code() != hash_algorithm_code {
        return Err(IonError::new(
            ErrorCode::MultihashUnsupportedHashAlgorithm,
            format!(
                "Given {context} uses unsupported multihash algorithm with code {}, should use {hash_algorithm_code} or change IonConfig to desired hashing algorithm.",
                multihash.code()
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    lazy_static::lazy_static! {
        static ref KEY_1: serde_json::Value = json!({
            "kty": "EC",
            "crv": "secp256k1",
            "x": "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "y": "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k"
        });
    }

    #[test]
    fn unsupported_algorithm() {
        let err = hash_as_non_multihash(b"anyThing", 999).unwrap_err();
        assert_eq!(err.code, ErrorCode::MultihashUnsupportedHashAlgorithm);
        assert!(hash(b"anyThing", 17).is_err());
    }

    #[test]
    fn framing() {
        let multihash = hash(b"Hello, world!", SHA2_256).unwrap();
        assert_eq!(multihash.len(), 34);
        assert_eq!(&multihash[..2], &[0x12, 0x20]);
        assert_eq!(&multihash[2..], Sha256::digest(b"Hello, world!").as_slice());
    }

    #[test]
    fn reveal_value_and_commitment() {
        let reveal = canonicalize_then_hash_then_encode(&*KEY_1, SHA2_256).unwrap();
        let commitment = canonicalize_then_double_hash_then_encode(&*KEY_1, SHA2_256).unwrap();
        assert_eq!(reveal, "EiAJ-97Is59is6FKAProwDo870nmwCeP8n5nRRFwPpUZVQ");
        assert_eq!(commitment, "EiBfOZdMtU6OBw8Pk879QtZ-2J-9FbbjSZyoaA_bqD4zhA");
        assert_ne!(reveal, commitment);

        // The commitment is the multihash of the digest inside the reveal value.
        let reveal_bytes = encoder::decode_as_bytes(&reveal, "reveal").unwrap();
        assert_eq!(hash_then_encode(&reveal_bytes[2..], SHA2_256).unwrap(), commitment);
    }

    #[test]
    fn validate_encoded() {
        validate_encoded_multihash(
            "EiDyOQbbZAa3aiRzeCkV7LOx3SERjjH93EXoIM3UoN4oWg",
            SHA2_256,
            "didSuffix",
        )
        .unwrap();

        let err = validate_encoded_multihash("aaaaaaaa", SHA2_256, "didSuffix").unwrap_err();
        assert_eq!(
            err.to_string(),
            "MultihashStringNotAMultihash: Given didSuffix string 'aaaaaaaa' is not a multihash after decoding."
        );

        // SHA-1 (code 17)
        let err =
            validate_encoded_multihash("ERSIwvEfss45KstbKYbmQCEcRpAHPg", SHA2_256, "didSuffix")
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "MultihashUnsupportedHashAlgorithm: Given didSuffix uses unsupported multihash algorithm with code 17, should use 18 or change IonConfig to desired hashing algorithm."
        );

        let err = validate_encoded_multihash(
            "123456789012345678901234567890123456789012345/",
            SHA2_256,
            "didSuffix",
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodedStringIncorrectEncoding);
    }
}
