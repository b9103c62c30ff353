//! Input validation shared by the request builders and [`Jwk`](crate::Jwk).
//!
//! Checks run in a fixed order and the first failure is returned, so callers
//! always see the same error for the same bad input.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    canonicalizer,
    encoder,
    jwk::{OperationKeyType, CRV_ED25519, CRV_SECP256K1, KTY_EC, KTY_OKP},
    multihash,
    sidetree::{DocumentState, PublicKeyEntry, PublicKeyPurpose, ServiceEndpointEntry},
    ErrorCode, IonConfig, IonError, Result,
};

/// Maximum length of a key or service `id`.
pub const MAX_ID_LENGTH: usize = 50;

/// Maximum length of a service `type`.
pub const MAX_SERVICE_TYPE_LENGTH: usize = 30;

/// Length of a Base64URL-encoded 256-bit value.
const ENCODED_256_BIT_LENGTH: usize = 43;

pub(crate) fn is_es256k(jwk: &Value) -> bool {
    member(jwk, "crv") == Some(CRV_SECP256K1) && member(jwk, "kty") == Some(KTY_EC)
}

pub(crate) fn is_ed25519(jwk: &Value) -> bool {
    member(jwk, "crv") == Some(CRV_ED25519) && member(jwk, "kty") == Some(KTY_OKP)
}

fn member<'a>(jwk: &'a Value, name: &str) -> Option<&'a str> {
    jwk.get(name).and_then(Value::as_str)
}

/// Render a JWK member for an error message; absent members read `undefined`.
fn describe(jwk: &Value, name: &str) -> String {
    match jwk.get(name) {
        None => "undefined".to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn has_length(jwk: &Value, name: &str, length: usize) -> bool {
    member(jwk, name).map(str::len) == Some(length)
}

fn check_unexpected_properties(
    jwk: &Value,
    allowed: &[&str],
    code: ErrorCode,
    label: &str,
) -> Result<()> {
    if let Some(map) = jwk.as_object() {
        if let Some(property) = map.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(IonError::new(
                code,
                format!("{label} JWK key has unexpected property '{property}'."),
            ));
        }
    }
    Ok(())
}

/// Validate the schema of an ES256K or Ed25519 operation key.
pub fn validate_operation_key(jwk: &Value, key_type: OperationKeyType) -> Result<()> {
    if is_es256k(jwk) {
        validate_es256k_operation_key(jwk, key_type)
    } else if is_ed25519(jwk) {
        validate_ed25519_operation_key(jwk, key_type)
    } else {
        Err(IonError::new(
            ErrorCode::UnsupportedKeyType,
            "JWK key should be secp256k1 or Ed25519.",
        ))
    }
}

pub fn validate_es256k_operation_key(jwk: &Value, key_type: OperationKeyType) -> Result<()> {
    let allowed: &[&str] = match key_type {
        OperationKeyType::Public => &["kty", "crv", "x", "y"],
        OperationKeyType::Private => &["kty", "crv", "x", "y", "d"],
    };
    check_unexpected_properties(
        jwk,
        allowed,
        ErrorCode::PublicKeyJwkEs256kHasUnexpectedProperty,
        "SECP256K1",
    )?;

    if member(jwk, "crv") != Some(CRV_SECP256K1) {
        return Err(IonError::new(
            ErrorCode::JwkEs256kMissingOrInvalidCrv,
            format!(
                "SECP256K1 JWK 'crv' property must be 'secp256k1' but got '{}.'",
                describe(jwk, "crv")
            ),
        ));
    }

    if member(jwk, "kty") != Some(KTY_EC) {
        return Err(IonError::new(
            ErrorCode::JwkEs256kMissingOrInvalidKty,
            format!(
                "SECP256K1 JWK 'kty' property must be 'EC' but got '{}.'",
                describe(jwk, "kty")
            ),
        ));
    }

    if !has_length(jwk, "x", ENCODED_256_BIT_LENGTH) {
        return Err(IonError::new(
            ErrorCode::JwkEs256kHasIncorrectLengthOfX,
            "SECP256K1 JWK 'x' property must be 43 bytes.",
        ));
    }

    if !has_length(jwk, "y", ENCODED_256_BIT_LENGTH) {
        return Err(IonError::new(
            ErrorCode::JwkEs256kHasIncorrectLengthOfY,
            "SECP256K1 JWK 'y' property must be 43 bytes.",
        ));
    }

    if key_type == OperationKeyType::Private && !has_length(jwk, "d", ENCODED_256_BIT_LENGTH) {
        return Err(IonError::new(
            ErrorCode::JwkEs256kHasIncorrectLengthOfD,
            "SECP256K1 JWK 'd' property must be 43 bytes.",
        ));
    }

    Ok(())
}

pub fn validate_ed25519_operation_key(jwk: &Value, key_type: OperationKeyType) -> Result<()> {
    let allowed: &[&str] = match key_type {
        OperationKeyType::Public => &["kty", "crv", "x"],
        OperationKeyType::Private => &["kty", "crv", "x", "d"],
    };
    check_unexpected_properties(
        jwk,
        allowed,
        ErrorCode::PublicKeyJwkEd25519HasUnexpectedProperty,
        "Ed25519",
    )?;

    if member(jwk, "crv") != Some(CRV_ED25519) {
        return Err(IonError::new(
            ErrorCode::JwkEd25519MissingOrInvalidCrv,
            format!(
                "Ed25519 JWK 'crv' property must be 'Ed25519' but got '{}.'",
                describe(jwk, "crv")
            ),
        ));
    }

    if member(jwk, "kty") != Some(KTY_OKP) {
        return Err(IonError::new(
            ErrorCode::JwkEd25519MissingOrInvalidKty,
            format!(
                "Ed25519 JWK 'kty' property must be 'OKP' but got '{}.'",
                describe(jwk, "kty")
            ),
        ));
    }

    if !has_length(jwk, "x", ENCODED_256_BIT_LENGTH) {
        return Err(IonError::new(
            ErrorCode::JwkEd25519HasIncorrectLengthOfX,
            "Ed25519 JWK 'x' property must be 43 bytes.",
        ));
    }

    if key_type == OperationKeyType::Private && !has_length(jwk, "d", ENCODED_256_BIT_LENGTH) {
        return Err(IonError::new(
            ErrorCode::JwkEd25519HasIncorrectLengthOfD,
            "Ed25519 JWK 'd' property must be 43 bytes.",
        ));
    }

    Ok(())
}

/// Validate the `id` of a DID Document key or service.
///
/// Lengths are counted in UTF-16 code units, as ION nodes count them.
pub fn validate_id(id: &str) -> Result<()> {
    let length = id.encode_utf16().count();
    if length > MAX_ID_LENGTH {
        return Err(IonError::new(
            ErrorCode::IdTooLong,
            format!("Key ID length {length} exceed max allowed length of {MAX_ID_LENGTH}."),
        ));
    }

    if !encoder::is_base64url_string(id) {
        return Err(IonError::new(
            ErrorCode::IdNotUsingBase64UrlCharacterSet,
            format!("Key ID '{id}' is not a Base64URL string."),
        ));
    }

    Ok(())
}

/// Purposes must be unique. An empty list is accepted.
pub fn validate_public_key_purposes(purposes: &[PublicKeyPurpose]) -> Result<()> {
    let mut seen = HashSet::new();
    for purpose in purposes {
        if !seen.insert(purpose) {
            return Err(IonError::new(
                ErrorCode::PublicKeyPurposeDuplicated,
                format!("Public key purpose '{purpose}' already specified."),
            ));
        }
    }
    Ok(())
}

pub fn validate_did_document_keys(public_keys: &[PublicKeyEntry]) -> Result<()> {
    let mut ids = HashSet::new();
    for public_key in public_keys {
        if !public_key.public_key_jwk.is_object() {
            return Err(IonError::new(
                ErrorCode::DidDocumentPublicKeyMissingOrIncorrectType,
                "DID Document key 'publicKeyJwk' property is not a non-array object.",
            ));
        }

        validate_id(&public_key.id)?;

        if !ids.insert(public_key.id.as_str()) {
            return Err(IonError::new(
                ErrorCode::DidDocumentPublicKeyIdDuplicated,
                format!("DID Document key with ID '{}' already exists.", public_key.id),
            ));
        }

        validate_public_key_purposes(&public_key.purposes)?;
    }
    Ok(())
}

pub fn validate_services(services: &[ServiceEndpointEntry]) -> Result<()> {
    let mut ids = HashSet::new();
    for service in services {
        validate_service(service)?;
        if !ids.insert(service.id.as_str()) {
            return Err(IonError::new(
                ErrorCode::DidDocumentServiceIdDuplicated,
                "Service id has to be unique",
            ));
        }
    }
    Ok(())
}

pub fn validate_service(service: &ServiceEndpointEntry) -> Result<()> {
    validate_id(&service.id)?;

    let type_length = service.r#type.encode_utf16().count();
    if type_length > MAX_SERVICE_TYPE_LENGTH {
        return Err(IonError::new(
            ErrorCode::ServiceTypeTooLong,
            format!(
                "Service endpoint type length {type_length} exceeds max allowed length of {}.",
                MAX_SERVICE_TYPE_LENGTH
            ),
        ));
    }

    match &service.service_endpoint {
        Value::Array(_) => Err(IonError::new(
            ErrorCode::ServiceEndpointCannotBeAnArray,
            "Service endpoint value cannot be an array.",
        )),
        Value::String(uri) => match url::Url::parse(uri) {
            Ok(_) => Ok(()),
            Err(_) => Err(IonError::new(
                ErrorCode::ServiceEndpointStringNotValidUri,
                format!("Service endpoint string '{uri}' is not a URI."),
            )),
        },
        Value::Object(_) => Ok(()),
        _ => Err(IonError::new(
            ErrorCode::ServiceEndpointMissingOrIncorrectType,
            "Service endpoint value must be a URI string or an object.",
        )),
    }
}

/// Document keys first, then services.
pub fn validate_document(document: &DocumentState) -> Result<()> {
    if let Some(public_keys) = &document.public_keys {
        validate_did_document_keys(public_keys)?;
    }
    if let Some(services) = &document.services {
        validate_services(services)?;
    }
    Ok(())
}

/// Reject a delta whose canonical form is larger than the configured maximum.
///
/// Returns the canonicalized size.
pub fn validate_delta_size<T: Serialize + ?Sized>(delta: &T, config: &IonConfig) -> Result<usize> {
    let size = canonicalizer::canonicalize(delta)?.len();
    let max = config.max_canonicalized_delta_size_in_bytes;
    if size > max {
        return Err(IonError::new(
            ErrorCode::DeltaExceedsMaximumSize,
            format!("Delta of {size} bytes exceeded limit of {max} bytes."),
        ));
    }
    log::trace!("canonicalized delta is {size} of {max} bytes");
    Ok(size)
}

/// A DID suffix must be the encoded multihash of suffix data.
pub fn validate_did_suffix(did_suffix: &str, config: &IonConfig) -> Result<()> {
    multihash::validate_encoded_multihash(did_suffix, config.hash_algorithm_code, "didSuffix")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    lazy_static::lazy_static! {
        static ref ES256K_PUBLIC: Value = json!({
            "kty": "EC",
            "crv": "secp256k1",
            "x": "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "y": "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k"
        });
    }

    fn with(base: &Value, name: &str, value: Value) -> Value {
        let mut jwk = base.clone();
        jwk[name] = value;
        jwk
    }

    fn without(base: &Value, name: &str) -> Value {
        let mut jwk = base.clone();
        jwk.as_object_mut().unwrap().remove(name);
        jwk
    }

    fn service(id: &str, r#type: &str, endpoint: Value) -> ServiceEndpointEntry {
        ServiceEndpointEntry {
            id: id.to_owned(),
            r#type: r#type.to_owned(),
            service_endpoint: endpoint,
        }
    }

    #[test]
    fn operation_key_dispatch() {
        validate_operation_key(&ES256K_PUBLIC, OperationKeyType::Public).unwrap();

        let err = validate_operation_key(
            &with(&ES256K_PUBLIC, "crv", json!("P-256")),
            OperationKeyType::Public,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedKeyType);
        assert_eq!(err.message, "JWK key should be secp256k1 or Ed25519.");

        let err =
            validate_operation_key(&json!("not a key"), OperationKeyType::Public).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedKeyType);
    }

    #[test]
    fn es256k_key_checks() {
        let err = validate_es256k_operation_key(
            &with(&ES256K_PUBLIC, "d", json!("a".repeat(43))),
            OperationKeyType::Public,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PublicKeyJwkEs256kHasUnexpectedProperty);
        assert_eq!(err.message, "SECP256K1 JWK key has unexpected property 'd'.");

        let err =
            validate_es256k_operation_key(&without(&ES256K_PUBLIC, "crv"), OperationKeyType::Public)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEs256kMissingOrInvalidCrv);
        assert_eq!(
            err.message,
            "SECP256K1 JWK 'crv' property must be 'secp256k1' but got 'undefined.'"
        );

        let err = validate_es256k_operation_key(
            &with(&ES256K_PUBLIC, "kty", json!("OKP")),
            OperationKeyType::Public,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEs256kMissingOrInvalidKty);

        for x in ["a".repeat(42), "a".repeat(44)] {
            let err = validate_es256k_operation_key(
                &with(&ES256K_PUBLIC, "x", json!(x)),
                OperationKeyType::Public,
            )
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::JwkEs256kHasIncorrectLengthOfX);
        }

        let err =
            validate_es256k_operation_key(&without(&ES256K_PUBLIC, "y"), OperationKeyType::Public)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEs256kHasIncorrectLengthOfY);

        let err =
            validate_es256k_operation_key(&ES256K_PUBLIC, OperationKeyType::Private).unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEs256kHasIncorrectLengthOfD);

        validate_es256k_operation_key(
            &with(&ES256K_PUBLIC, "d", json!("a".repeat(43))),
            OperationKeyType::Private,
        )
        .unwrap();
    }

    #[test]
    fn ed25519_key_checks() {
        let key = json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "a".repeat(43)
        });
        validate_operation_key(&key, OperationKeyType::Public).unwrap();

        let err =
            validate_ed25519_operation_key(&with(&key, "y", json!("b")), OperationKeyType::Public)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::PublicKeyJwkEd25519HasUnexpectedProperty);
        assert_eq!(err.message, "Ed25519 JWK key has unexpected property 'y'.");

        let err = validate_ed25519_operation_key(
            &with(&key, "crv", json!("X25519")),
            OperationKeyType::Public,
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "Ed25519 JWK 'crv' property must be 'Ed25519' but got 'X25519.'"
        );

        let err = validate_ed25519_operation_key(
            &with(&key, "x", json!("short")),
            OperationKeyType::Public,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEd25519HasIncorrectLengthOfX);

        let err = validate_ed25519_operation_key(
            &with(&key, "d", json!("short")),
            OperationKeyType::Private,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEd25519HasIncorrectLengthOfD);
    }

    #[test]
    fn ids() {
        validate_id(&"a".repeat(50)).unwrap();

        let err = validate_id(&"a".repeat(51)).unwrap_err();
        assert_eq!(err.code, ErrorCode::IdTooLong);
        assert_eq!(err.message, "Key ID length 51 exceed max allowed length of 50.");

        let err = validate_id("notAValidBase64URLString!").unwrap_err();
        assert_eq!(err.code, ErrorCode::IdNotUsingBase64UrlCharacterSet);
        assert_eq!(
            err.message,
            "Key ID 'notAValidBase64URLString!' is not a Base64URL string."
        );
    }

    #[test]
    fn ids_count_utf16_code_units() {
        // Each U+1F600 is a surrogate pair.
        let err = validate_id(&"\u{1F600}".repeat(26)).unwrap_err();
        assert_eq!(err.code, ErrorCode::IdTooLong);
        assert_eq!(err.message, "Key ID length 52 exceed max allowed length of 50.");

        let err = validate_id(&"\u{1F600}".repeat(25)).unwrap_err();
        assert_eq!(err.code, ErrorCode::IdNotUsingBase64UrlCharacterSet);
    }

    #[test]
    fn service_type_counts_utf16_code_units() {
        let endpoint = json!("https://example.com");
        validate_service(&service("s", &"\u{1F600}".repeat(15), endpoint.clone())).unwrap();

        let err = validate_service(&service("s", &"\u{1F600}".repeat(16), endpoint)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceTypeTooLong);
        assert_eq!(
            err.message,
            "Service endpoint type length 32 exceeds max allowed length of 30."
        );
    }

    #[test]
    fn purposes() {
        validate_public_key_purposes(&[]).unwrap();
        validate_public_key_purposes(&[
            PublicKeyPurpose::Authentication,
            PublicKeyPurpose::KeyAgreement,
        ])
        .unwrap();

        let err = validate_public_key_purposes(&[
            PublicKeyPurpose::Authentication,
            PublicKeyPurpose::Authentication,
        ])
        .unwrap_err();
        assert_eq!(
            err.message,
            "Public key purpose 'authentication' already specified."
        );
    }

    #[test]
    fn document_keys() {
        let key = |id: &str, jwk: Value| PublicKeyEntry {
            id: id.to_owned(),
            r#type: "EcdsaSecp256k1VerificationKey2019".to_owned(),
            public_key_jwk: jwk,
            purposes: vec![],
        };

        validate_did_document_keys(&[key("key1", ES256K_PUBLIC.clone())]).unwrap();

        let err =
            validate_did_document_keys(&[key("key1", json!(["not", "an", "object"]))]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DidDocumentPublicKeyMissingOrIncorrectType);

        let err = validate_did_document_keys(&[
            key("key1", ES256K_PUBLIC.clone()),
            key("key1", ES256K_PUBLIC.clone()),
        ])
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::DidDocumentPublicKeyIdDuplicated);
        assert_eq!(err.message, "DID Document key with ID 'key1' already exists.");
    }

    #[test]
    fn services() {
        validate_service(&service(
            "service1Id",
            "service1Type",
            json!("http://www.service1.com"),
        ))
        .unwrap();
        validate_service(&service("s", "t", json!({ "origins": ["https://example.com/"] })))
            .unwrap();

        let err =
            validate_service(&service("s", &"x".repeat(31), json!("https://a.b"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceTypeTooLong);
        assert_eq!(
            err.message,
            "Service endpoint type length 31 exceeds max allowed length of 30."
        );

        let err = validate_service(&service("s", "t", json!(["https://a.b"]))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceEndpointCannotBeAnArray);

        let err = validate_service(&service("s", "t", json!("http://"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceEndpointStringNotValidUri);
        assert_eq!(err.message, "Service endpoint string 'http://' is not a URI.");

        // Relative references are not accepted, only absolute URIs.
        let err = validate_service(&service("s", "t", json!("www.example.com/path"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceEndpointStringNotValidUri);
        assert_eq!(
            err.message,
            "Service endpoint string 'www.example.com/path' is not a URI."
        );
        validate_service(&service("s", "t", json!("did:example:123#agent"))).unwrap();

        let err = validate_service(&service("s", "t", json!(42))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceEndpointMissingOrIncorrectType);

        let err = validate_services(&[
            service("dup", "t", json!("https://a.b")),
            service("dup", "t", json!("https://c.d")),
        ])
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::DidDocumentServiceIdDuplicated);
        assert_eq!(err.message, "Service id has to be unique");
    }

    #[test]
    fn delta_size_limit() {
        let delta = json!({ "data": "a".repeat(100) });
        let size = canonicalizer::canonicalize(&delta).unwrap().len();

        let config = IonConfig::default().with_max_delta_size(size);
        assert_eq!(validate_delta_size(&delta, &config).unwrap(), size);

        let config = IonConfig::default().with_max_delta_size(size - 1);
        let err = validate_delta_size(&delta, &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::DeltaExceedsMaximumSize);
        assert_eq!(
            err.message,
            format!("Delta of {size} bytes exceeded limit of {} bytes.", size - 1)
        );
    }
}
