//! Sidetree data model as used by ION: DID Document content, state patches and
//! delta objects, plus the hashing that ties them to commitments.
//!
//! See the [Sidetree v1.0.0 specification](https://identity.foundation/sidetree/spec/v1.0.0/).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{multihash, Jwk, Result};

pub mod operation;

pub use operation::*;

/// Verification relationship of a DID Document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PublicKeyPurpose {
    Authentication,
    AssertionMethod,
    CapabilityInvocation,
    CapabilityDelegation,
    KeyAgreement,
}

impl PublicKeyPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::AssertionMethod => "assertionMethod",
            Self::CapabilityInvocation => "capabilityInvocation",
            Self::CapabilityDelegation => "capabilityDelegation",
            Self::KeyAgreement => "keyAgreement",
        }
    }
}

impl fmt::Display for PublicKeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public Key Entry
///
/// Used by the [`add-public-keys`](DIDStatePatch::AddPublicKeys) and
/// [`replace`](DIDStatePatch::Replace) patch actions.
///
/// [Sidetree §12.1.1 `add-public-keys`](https://identity.foundation/sidetree/spec/v1.0.0/#add-public-keys)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyEntry {
    /// At most 50 Base64URL characters.
    pub id: String,

    /// Verification method type
    pub r#type: String,

    /// Any JWK. Unlike operation keys, document keys are not restricted to a
    /// key type.
    pub public_key_jwk: Value,

    /// Omitted from JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purposes: Vec<PublicKeyPurpose>,
}

/// Service Endpoint Entry
///
/// [Sidetree §12.1.3 `add-services`](https://identity.foundation/sidetree/spec/v1.0.0/#add-services)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpointEntry {
    pub id: String,

    /// At most 30 characters.
    pub r#type: String,

    /// URI string or JSON object.
    pub service_endpoint: Value,
}

/// Document content carried by the [`replace`](DIDStatePatch::Replace) patch.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_keys: Option<Vec<PublicKeyEntry>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ServiceEndpointEntry>>,
}

impl DocumentState {
    pub fn new(public_keys: Vec<PublicKeyEntry>, services: Vec<ServiceEndpointEntry>) -> Self {
        Self {
            public_keys: Some(public_keys),
            services: Some(services),
        }
    }
}

/// [DID State Patch][dsp] using a [Sidetree Standard Patch action][spa]
///
/// [dsp]: https://identity.foundation/sidetree/spec/v1.0.0/#did-state-patches
/// [spa]: https://identity.foundation/sidetree/spec/v1.0.0/#standard-patch-actions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "action")]
#[serde(rename_all = "kebab-case")]
pub enum DIDStatePatch {
    AddPublicKeys {
        #[serde(rename = "publicKeys")]
        public_keys: Vec<PublicKeyEntry>,
    },

    RemovePublicKeys {
        ids: Vec<String>,
    },

    AddServices {
        services: Vec<ServiceEndpointEntry>,
    },

    RemoveServices {
        ids: Vec<String>,
    },

    Replace {
        document: DocumentState,
    },
}

/// Create/Update/Recover Delta Object
///
/// - [Create Operation Delta Object](https://identity.foundation/sidetree/spec/v1.0.0/#create-delta-object)
/// - [Update Operation Delta Object](https://identity.foundation/sidetree/spec/v1.0.0/#update-delta-object)
/// - [Recover Operation Delta Object](https://identity.foundation/sidetree/spec/v1.0.0/#recover-delta-object)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub patches: Vec<DIDStatePatch>,

    /// Commitment to the key that must sign the next update.
    pub update_commitment: String,
}

impl Delta {
    /// Multihash of the canonicalized delta, as carried by `deltaHash`.
    pub fn hash(&self, hash_algorithm_code: u64) -> Result<String> {
        multihash::canonicalize_then_hash_then_encode(self, hash_algorithm_code)
    }
}

/// [Commitment](https://identity.foundation/sidetree/spec/v1.0.0/#commitment)
/// to a public operation key.
///
/// Private members of `key` never enter the commitment.
pub fn commitment_scheme(key: &Jwk, hash_algorithm_code: u64) -> Result<String> {
    multihash::canonicalize_then_double_hash_then_encode(&key.to_public(), hash_algorithm_code)
}

/// [Reveal value](https://identity.foundation/sidetree/spec/v1.0.0/#reveal-value)
/// of a public operation key.
///
/// Hashing the reveal value's digest once more yields
/// [`commitment_scheme`] of the same key.
pub fn reveal_value(key: &Jwk, hash_algorithm_code: u64) -> Result<String> {
    multihash::canonicalize_then_hash_then_encode(&key.to_public(), hash_algorithm_code)
}
