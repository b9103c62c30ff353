use serde::{Deserialize, Serialize};

use crate::{did::DIDSuffix, sidetree::Delta, ErrorCode, IonConfig, IonError, Jwk, Result};

use super::{decode_verify_signed_data, ensure_reveal_value, SidetreeOperation};

/// Sidetree DID Recover operation
///
/// ### References
/// - [Sidetree §11.3 Recover](https://identity.foundation/sidetree/spec/v1.0.0/#recover)
/// - [Sidetree REST API §1.2.3 Recover](https://identity.foundation/sidetree/api/#recover)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct RecoverOperation {
    pub did_suffix: DIDSuffix,
    /// Reveal value of the current recovery key.
    pub reveal_value: String,
    pub delta: Delta,
    /// Compact JWS of [RecoveryClaims]
    ///
    /// <https://identity.foundation/sidetree/spec/v1.0.0/#recover-signed-data-object>
    pub signed_data: String,
}

impl SidetreeOperation for RecoverOperation {
    type PartiallyVerifiedForm = PartiallyVerifiedRecoverOperation;

    fn partial_verify(self, config: &IonConfig) -> Result<PartiallyVerifiedRecoverOperation> {
        let (_, claims) =
            decode_verify_signed_data(&self.signed_data, |claims: &RecoveryClaims| {
                &claims.recovery_key
            })?;

        ensure_reveal_value(&self.reveal_value, &claims.recovery_key, config)?;

        if claims.delta_hash != self.delta.hash(config.hash_algorithm_code)? {
            return Err(IonError::new(
                ErrorCode::DeltaHashMismatch,
                "Recover operation delta does not match the signed delta hash.",
            ));
        }

        Ok(PartiallyVerifiedRecoverOperation {
            reveal_value: self.reveal_value,
            signed_delta: self.delta,
            signed_recovery_commitment: claims.recovery_commitment,
            signed_recovery_key: claims.recovery_key,
        })
    }
}

/// Partially verified DID Recover operation
#[derive(Debug, Clone)]
pub struct PartiallyVerifiedRecoverOperation {
    pub reveal_value: String,
    pub signed_delta: Delta,
    pub signed_recovery_commitment: String,
    pub signed_recovery_key: Jwk,
}

/// Payload of the JWS in [RecoverOperation]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryClaims {
    /// Commitment to the next recovery key.
    pub recovery_commitment: String,

    /// Key matching the previous recovery commitment
    pub recovery_key: Jwk,

    pub delta_hash: String,
}
