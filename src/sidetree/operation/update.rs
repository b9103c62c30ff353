use serde::{Deserialize, Serialize};

use crate::{did::DIDSuffix, sidetree::Delta, ErrorCode, IonConfig, IonError, Jwk, Result};

use super::{decode_verify_signed_data, ensure_reveal_value, SidetreeOperation};

/// Sidetree DID Update operation
///
/// ### References
/// - [Sidetree §11.2 Update](https://identity.foundation/sidetree/spec/v1.0.0/#update)
/// - [Sidetree REST API §1.2.2 Update](https://identity.foundation/sidetree/api/#update)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct UpdateOperation {
    pub did_suffix: DIDSuffix,
    /// Reveal value of the current update key.
    pub reveal_value: String,
    pub delta: Delta,
    /// Compact JWS of [UpdateClaims]
    ///
    /// <https://identity.foundation/sidetree/spec/v1.0.0/#update-signed-data-object>
    pub signed_data: String,
}

/// Partially verified DID Update operation
///
/// Converted from [UpdateOperation].
#[derive(Debug, Clone)]
pub struct PartiallyVerifiedUpdateOperation {
    pub reveal_value: String,
    pub signed_delta: Delta,
    pub signed_update_key: Jwk,
}

impl SidetreeOperation for UpdateOperation {
    type PartiallyVerifiedForm = PartiallyVerifiedUpdateOperation;

    /// Partially verify an [UpdateOperation]
    ///
    /// - the [signed data](UpdateOperation::signed_data) is verified against
    ///   the [update key](UpdateClaims::update_key) it reveals;
    /// - the revealed key is checked against the
    ///   [reveal value](UpdateOperation::reveal_value);
    /// - the [delta](UpdateOperation::delta) is checked against the signed
    ///   [delta hash](UpdateClaims::delta_hash).
    ///
    /// The DID suffix is not signed over and is not checked.
    fn partial_verify(self, config: &IonConfig) -> Result<PartiallyVerifiedUpdateOperation> {
        let (_, claims) =
            decode_verify_signed_data(&self.signed_data, |claims: &UpdateClaims| {
                &claims.update_key
            })?;

        ensure_reveal_value(&self.reveal_value, &claims.update_key, config)?;

        if claims.delta_hash != self.delta.hash(config.hash_algorithm_code)? {
            return Err(IonError::new(
                ErrorCode::DeltaHashMismatch,
                "Update operation delta does not match the signed delta hash.",
            ));
        }

        Ok(PartiallyVerifiedUpdateOperation {
            reveal_value: self.reveal_value,
            signed_delta: self.delta,
            signed_update_key: claims.update_key,
        })
    }
}

/// Payload of the JWS in [UpdateOperation]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaims {
    /// Key matching the previous update commitment
    pub update_key: Jwk,

    /// Hash of the canonicalized update [delta](Delta).
    pub delta_hash: String,
}
