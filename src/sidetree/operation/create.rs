use serde::{Deserialize, Serialize};

use crate::{
    canonicalizer,
    did::{DIDSuffix, IonDid},
    encoder, multihash,
    sidetree::Delta,
    ErrorCode, IonConfig, IonError, Result,
};

use super::SidetreeOperation;

/// Sidetree DID Create operation
///
/// ### References
/// - [Sidetree §11.1 Create](https://identity.foundation/sidetree/spec/v1.0.0/#create)
/// - [Sidetree REST API §1.2.1 Create](https://identity.foundation/sidetree/api/#create)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CreateOperation {
    pub suffix_data: SuffixData,
    pub delta: Delta,
}

impl CreateOperation {
    /// Unique suffix of the DID this operation creates.
    pub fn did_suffix(&self, config: &IonConfig) -> Result<DIDSuffix> {
        self.suffix_data.did_suffix(config)
    }

    /// Construct a [Long-Form DID][lfdu] from this operation.
    ///
    /// [lfdu]: https://identity.foundation/sidetree/spec/v1.0.0/#long-form-did-uris
    pub fn to_ion_did(&self, config: &IonConfig) -> Result<IonDid> {
        let create_operation_data = encoder::encode(canonicalizer::canonicalize(self)?);
        Ok(IonDid::Long {
            network: config.network_segment().map(str::to_owned),
            did_suffix: self.did_suffix(config)?,
            create_operation_data,
        })
    }
}

impl SidetreeOperation for CreateOperation {
    type PartiallyVerifiedForm = PartiallyVerifiedCreateOperation;

    fn partial_verify(self, config: &IonConfig) -> Result<PartiallyVerifiedCreateOperation> {
        let did_suffix = self.did_suffix(config)?;
        let delta_hash = self.delta.hash(config.hash_algorithm_code)?;

        if delta_hash != self.suffix_data.delta_hash {
            return Err(IonError::new(
                ErrorCode::DeltaHashMismatch,
                "Create operation delta does not match the suffix data delta hash.",
            ));
        }

        Ok(PartiallyVerifiedCreateOperation {
            did_suffix,
            recovery_commitment: self.suffix_data.recovery_commitment,
            hashed_delta: self.delta,
        })
    }
}

/// Partially verified DID Create operation
///
/// Converted from [CreateOperation].
#[derive(Debug, Clone)]
pub struct PartiallyVerifiedCreateOperation {
    pub did_suffix: DIDSuffix,
    pub recovery_commitment: String,
    pub hashed_delta: Delta,
}

/// [Create Operation Suffix Data Object][data]
///
/// [data]: https://identity.foundation/sidetree/spec/v1.0.0/#create-suffix-data-object
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SuffixData {
    /// Hash of the canonicalized create [delta](Delta).
    pub delta_hash: String,

    /// Commitment to the first recovery key.
    pub recovery_commitment: String,
}

impl SuffixData {
    /// Hash the canonicalized suffix data into a [`DIDSuffix`].
    ///
    /// <https://identity.foundation/sidetree/spec/v1.0.0/#did-uri-composition>
    pub fn did_suffix(&self, config: &IonConfig) -> Result<DIDSuffix> {
        let hash = multihash::canonicalize_then_hash_then_encode(self, config.hash_algorithm_code)?;
        Ok(DIDSuffix(hash))
    }
}
