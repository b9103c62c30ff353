//! Operation keys: the JWK shapes accepted by ION for update and recovery
//! keys, and key pair generation.
//!
//! Two key types are supported:
//! - ES256K: `{"kty":"EC","crv":"secp256k1","x":…,"y":…,"d"?:…}`
//! - Ed25519: `{"kty":"OKP","crv":"Ed25519","x":…,"d"?:…}`
//!
//! `d` is present if and only if the key is private.

use ed25519_dalek::{SigningKey as Ed25519SigningKey, VerifyingKey as Ed25519VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{rngs::OsRng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{
    encoder,
    jws::Algorithm,
    sidetree::{PublicKeyEntry, PublicKeyPurpose},
    validator, ErrorCode, IonError,
};

pub const KTY_EC: &str = "EC";
pub const CRV_SECP256K1: &str = "secp256k1";
pub const KTY_OKP: &str = "OKP";
pub const CRV_ED25519: &str = "Ed25519";

/// Verification method type of generated secp256k1 DID Document keys.
pub const ES256K_DID_DOCUMENT_KEY_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";

/// Verification method type of generated Ed25519 DID Document keys.
pub const ED25519_DID_DOCUMENT_KEY_TYPE: &str = "JsonWebKey2020";

/// Whether an operation key is expected to carry private key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKeyType {
    Public,
    Private,
}

/// Operation key (update or recovery key), public or private.
///
/// Deserializing (or converting from a [`serde_json::Value`]) runs the
/// operation key schema validation, so a `Jwk` obtained from JSON always has a
/// known `kty`/`crv` pair and no extraneous members. Values built by hand can be
/// checked with [`Jwk::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum Jwk {
    Es256k(Es256kJwk),
    Ed25519(Ed25519Jwk),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Es256kJwk {
    pub x: String,
    pub y: String,
    pub d: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Jwk {
    pub x: String,
    pub d: Option<String>,
}

impl Jwk {
    pub fn is_private(&self) -> bool {
        match self {
            Self::Es256k(key) => key.d.is_some(),
            Self::Ed25519(key) => key.d.is_some(),
        }
    }

    pub fn to_public(&self) -> Self {
        match self {
            Self::Es256k(key) => Self::Es256k(Es256kJwk {
                d: None,
                ..key.clone()
            }),
            Self::Ed25519(key) => Self::Ed25519(Ed25519Jwk {
                d: None,
                ..key.clone()
            }),
        }
    }

    /// JWS algorithm used to sign with this key.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Es256k(_) => Algorithm::ES256K,
            Self::Ed25519(_) => Algorithm::EdDSA,
        }
    }

    /// JSON form, members ordered `kty`, `crv`, `x`, `y`, `d`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::Es256k(key) => {
                map.insert("kty".to_owned(), KTY_EC.into());
                map.insert("crv".to_owned(), CRV_SECP256K1.into());
                map.insert("x".to_owned(), key.x.clone().into());
                map.insert("y".to_owned(), key.y.clone().into());
                if let Some(d) = &key.d {
                    map.insert("d".to_owned(), d.clone().into());
                }
            }
            Self::Ed25519(key) => {
                map.insert("kty".to_owned(), KTY_OKP.into());
                map.insert("crv".to_owned(), CRV_ED25519.into());
                map.insert("x".to_owned(), key.x.clone().into());
                if let Some(d) = &key.d {
                    map.insert("d".to_owned(), d.clone().into());
                }
            }
        }
        Value::Object(map)
    }

    /// Run the operation key schema validation on this key.
    pub fn validate(&self, key_type: OperationKeyType) -> crate::Result<()> {
        validator::validate_operation_key(&self.to_json(), key_type)
    }

    pub(crate) fn secp256k1_secret_key(&self) -> crate::Result<k256::SecretKey> {
        let Self::Es256k(Es256kJwk { d: Some(d), .. }) = self else {
            return Err(not_a_private_key(Algorithm::ES256K));
        };
        let bytes = encoder::decode_as_bytes(d, "d")?;
        k256::SecretKey::from_slice(&bytes).map_err(|_| {
            IonError::new(ErrorCode::SigningFailed, "Invalid secp256k1 private key.")
        })
    }

    pub(crate) fn secp256k1_public_key(&self) -> crate::Result<k256::PublicKey> {
        let Self::Es256k(key) = self else {
            return Err(key_type_mismatch(Algorithm::ES256K));
        };
        let mut sec1 = vec![0x04];
        sec1.extend(encoder::decode_as_bytes(&key.x, "x")?);
        sec1.extend(encoder::decode_as_bytes(&key.y, "y")?);
        k256::PublicKey::from_sec1_bytes(&sec1).map_err(|_| {
            IonError::new(
                ErrorCode::SignatureVerificationFailed,
                "Invalid secp256k1 public key.",
            )
        })
    }

    pub(crate) fn ed25519_signing_key(&self) -> crate::Result<Ed25519SigningKey> {
        let Self::Ed25519(Ed25519Jwk { d: Some(d), .. }) = self else {
            return Err(not_a_private_key(Algorithm::EdDSA));
        };
        let bytes = encoder::decode_as_bytes(d, "d")?;
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            IonError::new(ErrorCode::SigningFailed, "Invalid Ed25519 private key.")
        })?;
        Ok(Ed25519SigningKey::from_bytes(&bytes))
    }

    pub(crate) fn ed25519_verifying_key(&self) -> crate::Result<Ed25519VerifyingKey> {
        let Self::Ed25519(key) = self else {
            return Err(key_type_mismatch(Algorithm::EdDSA));
        };
        let bytes = encoder::decode_as_bytes(&key.x, "x")?;
        let invalid = || {
            IonError::new(
                ErrorCode::SignatureVerificationFailed,
                "Invalid Ed25519 public key.",
            )
        };
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| invalid())?;
        Ed25519VerifyingKey::from_bytes(&bytes).map_err(|_| invalid())
    }

    pub fn from_secret_secp256k1(secret_key: &k256::SecretKey) -> Self {
        let point = secret_key.public_key().to_encoded_point(false);
        Self::Es256k(Es256kJwk {
            x: point.x().map(encoder::encode).unwrap_or_default(),
            y: point.y().map(encoder::encode).unwrap_or_default(),
            d: Some(encoder::encode(secret_key.to_bytes())),
        })
    }

    pub fn from_secret_ed25519(signing_key: &Ed25519SigningKey) -> Self {
        Self::Ed25519(Ed25519Jwk {
            x: encoder::encode(signing_key.verifying_key().as_bytes()),
            d: Some(encoder::encode(signing_key.to_bytes())),
        })
    }
}

fn not_a_private_key(algorithm: Algorithm) -> IonError {
    IonError::new(
        ErrorCode::SigningFailed,
        format!("Signing with {algorithm} requires a private key of the matching type."),
    )
}

fn key_type_mismatch(algorithm: Algorithm) -> IonError {
    IonError::new(
        ErrorCode::JwsAlgorithmMismatch,
        format!("Key cannot be used with algorithm {algorithm}."),
    )
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl TryFrom<Value> for Jwk {
    type Error = IonError;

    /// Validates `value` as a private key if it has a `d` member, as a public
    /// key otherwise.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let key_type = if value.get("d").is_some() {
            OperationKeyType::Private
        } else {
            OperationKeyType::Public
        };
        validator::validate_operation_key(&value, key_type)?;

        let member = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);
        let required = |name: &str| {
            member(name).ok_or_else(|| {
                IonError::new(
                    ErrorCode::UnsupportedKeyType,
                    format!("JWK is missing '{name}'."),
                )
            })
        };

        if validator::is_es256k(&value) {
            Ok(Self::Es256k(Es256kJwk {
                x: required("x")?,
                y: required("y")?,
                d: member("d"),
            }))
        } else {
            Ok(Self::Ed25519(Ed25519Jwk {
                x: required("x")?,
                d: member("d"),
            }))
        }
    }
}

/// Generate a secp256k1 operation key pair, returned as `(public, private)`.
pub fn generate_es256k_operation_key_pair() -> (Jwk, Jwk) {
    generate_es256k_operation_key_pair_from(&mut OsRng)
}

pub fn generate_es256k_operation_key_pair_from(
    rng: &mut (impl CryptoRng + RngCore),
) -> (Jwk, Jwk) {
    let private = Jwk::from_secret_secp256k1(&k256::SecretKey::random(rng));
    (private.to_public(), private)
}

/// Generate an Ed25519 operation key pair, returned as `(public, private)`.
pub fn generate_ed25519_operation_key_pair() -> (Jwk, Jwk) {
    generate_ed25519_operation_key_pair_from(&mut OsRng)
}

pub fn generate_ed25519_operation_key_pair_from(
    rng: &mut (impl CryptoRng + RngCore),
) -> (Jwk, Jwk) {
    let private = Jwk::from_secret_ed25519(&Ed25519SigningKey::generate(rng));
    (private.to_public(), private)
}

/// Generate a secp256k1 key for the DID Document itself.
///
/// Returns the public key entry to put in a document and the private key.
pub fn generate_es256k_did_document_key_pair(
    id: &str,
    purposes: Vec<PublicKeyPurpose>,
) -> crate::Result<(PublicKeyEntry, Jwk)> {
    let (public, private) = generate_es256k_operation_key_pair();
    did_document_key_pair(id, purposes, ES256K_DID_DOCUMENT_KEY_TYPE, public, private)
}

/// Generate an Ed25519 key for the DID Document itself.
pub fn generate_ed25519_did_document_key_pair(
    id: &str,
    purposes: Vec<PublicKeyPurpose>,
) -> crate::Result<(PublicKeyEntry, Jwk)> {
    let (public, private) = generate_ed25519_operation_key_pair();
    did_document_key_pair(id, purposes, ED25519_DID_DOCUMENT_KEY_TYPE, public, private)
}

fn did_document_key_pair(
    id: &str,
    purposes: Vec<PublicKeyPurpose>,
    r#type: &str,
    public: Jwk,
    private: Jwk,
) -> crate::Result<(PublicKeyEntry, Jwk)> {
    validator::validate_id(id)?;
    validator::validate_public_key_purposes(&purposes)?;

    let entry = PublicKeyEntry {
        id: id.to_owned(),
        r#type: r#type.to_owned(),
        public_key_jwk: public.to_json(),
        purposes,
    };
    Ok((entry, private))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn es256k_member_order() {
        let key: Jwk = serde_json::from_value(json!({
            "y": "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k",
            "x": "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "kty": "EC",
            "crv": "secp256k1"
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            r#"{"kty":"EC","crv":"secp256k1","x":"nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A","y":"iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k"}"#
        );
        assert!(!key.is_private());
        assert_eq!(key.algorithm(), Algorithm::ES256K);
    }

    #[test]
    fn from_json_validates() {
        let err = Jwk::try_from(json!({
            "kty": "XXX",
            "crv": "secp256k1",
            "x": "nIqlRCx0eyBSXcQnqDpReSv4zuWhwCRWssoc9L_nj6A",
            "y": "iG29VK6l2U5sKBZUSJePvyFusXgSlK2dDFlWaCM8F7k"
        }))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedKeyType);

        let err = serde_json::from_value::<Jwk>(json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "short"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("JwkEd25519HasIncorrectLengthOfX"));
    }

    #[test]
    fn generated_es256k_keys_are_valid() {
        let (public, private) = generate_es256k_operation_key_pair();
        public.validate(OperationKeyType::Public).unwrap();
        private.validate(OperationKeyType::Private).unwrap();
        assert_eq!(private.to_public(), public);
        assert_eq!(
            private.secp256k1_secret_key().unwrap().public_key(),
            public.secp256k1_public_key().unwrap()
        );
    }

    #[test]
    fn generated_ed25519_keys_are_valid() {
        let (public, private) = generate_ed25519_operation_key_pair();
        public.validate(OperationKeyType::Public).unwrap();
        private.validate(OperationKeyType::Private).unwrap();
        assert_eq!(
            private.ed25519_signing_key().unwrap().verifying_key(),
            public.ed25519_verifying_key().unwrap()
        );
        assert_eq!(public.algorithm(), Algorithm::EdDSA);
    }

    #[test]
    fn public_key_used_as_private_is_rejected() {
        let (public, _) = generate_es256k_operation_key_pair();
        let err = public.validate(OperationKeyType::Private).unwrap_err();
        assert_eq!(err.code, ErrorCode::JwkEs256kHasIncorrectLengthOfD);

        let (_, private) = generate_ed25519_operation_key_pair();
        let err = private.validate(OperationKeyType::Public).unwrap_err();
        assert_eq!(err.code, ErrorCode::PublicKeyJwkEd25519HasUnexpectedProperty);
    }

    #[test]
    fn did_document_key_pairs() {
        let (entry, private) = generate_es256k_did_document_key_pair(
            "key-1",
            vec![PublicKeyPurpose::Authentication, PublicKeyPurpose::KeyAgreement],
        )
        .unwrap();
        assert_eq!(entry.r#type, ES256K_DID_DOCUMENT_KEY_TYPE);
        assert_eq!(entry.public_key_jwk, private.to_public().to_json());

        let (entry, _) = generate_ed25519_did_document_key_pair("key-2", vec![]).unwrap();
        assert_eq!(entry.r#type, ED25519_DID_DOCUMENT_KEY_TYPE);
        assert!(serde_json::to_value(&entry).unwrap().get("purposes").is_none());

        let err = generate_es256k_did_document_key_pair(&"x".repeat(51), vec![]).unwrap_err();
        assert_eq!(err.code, ErrorCode::IdTooLong);

        let err = generate_es256k_did_document_key_pair("not base64url!", vec![]).unwrap_err();
        assert_eq!(err.code, ErrorCode::IdNotUsingBase64UrlCharacterSet);

        let err = generate_ed25519_did_document_key_pair(
            "key-3",
            vec![PublicKeyPurpose::Authentication, PublicKeyPurpose::Authentication],
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PublicKeyPurposeDuplicated);
    }
}
