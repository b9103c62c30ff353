use serde::{Deserialize, Serialize};

use crate::{did::DIDSuffix, ErrorCode, IonConfig, IonError, Jwk, Result};

use super::{decode_verify_signed_data, ensure_reveal_value, SidetreeOperation};

/// Sidetree DID Deactivate operation
///
/// ### References
/// - [Sidetree §11.4 Deactivate](https://identity.foundation/sidetree/spec/v1.0.0/#deactivate)
/// - [Sidetree REST API §1.2.4 Deactivate](https://identity.foundation/sidetree/api/#deactivate)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct DeactivateOperation {
    pub did_suffix: DIDSuffix,
    pub reveal_value: String,
    /// Compact JWS of [DeactivateClaims]
    ///
    /// <https://identity.foundation/sidetree/spec/v1.0.0/#deactivate-signed-data-object>
    pub signed_data: String,
}

impl SidetreeOperation for DeactivateOperation {
    type PartiallyVerifiedForm = PartiallyVerifiedDeactivateOperation;

    fn partial_verify(self, config: &IonConfig) -> Result<PartiallyVerifiedDeactivateOperation> {
        let (_, claims) =
            decode_verify_signed_data(&self.signed_data, |claims: &DeactivateClaims| {
                &claims.recovery_key
            })?;

        ensure_reveal_value(&self.reveal_value, &claims.recovery_key, config)?;

        if self.did_suffix != claims.did_suffix {
            return Err(IonError::new(
                ErrorCode::DidSuffixMismatch,
                format!(
                    "Signed DID suffix {} does not match operation DID suffix {}.",
                    claims.did_suffix, self.did_suffix
                ),
            ));
        }

        Ok(PartiallyVerifiedDeactivateOperation {
            signed_did_suffix: claims.did_suffix,
            reveal_value: self.reveal_value,
            signed_recovery_key: claims.recovery_key,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PartiallyVerifiedDeactivateOperation {
    pub signed_did_suffix: DIDSuffix,
    pub reveal_value: String,
    pub signed_recovery_key: Jwk,
}

/// Payload of the JWS in [DeactivateOperation]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct DeactivateClaims {
    pub did_suffix: DIDSuffix,
    /// Key matching the previous recovery commitment
    pub recovery_key: Jwk,
}
