mod create;
mod deactivate;
mod recover;
mod update;

pub use create::*;
pub use deactivate::*;
pub use recover::*;
pub use update::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    did::DIDSuffix,
    jws::{self, DecodedJws, Header},
    sidetree::{commitment_scheme, reveal_value},
    ErrorCode, IonConfig, IonError, Jwk, OperationKeyType, Result,
};

/// Sidetree DID operation, as submitted to an ION node.
///
/// ### References
/// - <https://identity.foundation/sidetree/spec/v1.0.0/#did-operations>
/// - <https://identity.foundation/sidetree/api/#sidetree-operations>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create(CreateOperation),
    Update(UpdateOperation),
    Recover(RecoverOperation),
    Deactivate(DeactivateOperation),
}

const SIDETREE_OPERATION: &str = "sidetreeOperation";

impl Operation {
    pub fn from_transaction(mut transaction: serde_json::Value) -> Result<Self> {
        let op_value = transaction
            .as_object_mut()
            .and_then(|object| object.remove(SIDETREE_OPERATION))
            .ok_or_else(|| {
                IonError::new(
                    ErrorCode::OperationMalformed,
                    format!("Missing `{SIDETREE_OPERATION}` property."),
                )
            })?;
        serde_json::from_value(op_value)
            .map_err(|e| IonError::new(ErrorCode::OperationMalformed, e.to_string()))
    }

    pub fn into_transaction(self) -> Result<serde_json::Value> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::json!({ SIDETREE_OPERATION: value }))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Recover(_) => "recover",
            Self::Deactivate(_) => "deactivate",
        }
    }
}

impl From<CreateOperation> for Operation {
    fn from(op: CreateOperation) -> Self {
        Self::Create(op)
    }
}

impl From<UpdateOperation> for Operation {
    fn from(op: UpdateOperation) -> Self {
        Self::Update(op)
    }
}

impl From<RecoverOperation> for Operation {
    fn from(op: RecoverOperation) -> Self {
        Self::Recover(op)
    }
}

impl From<DeactivateOperation> for Operation {
    fn from(op: DeactivateOperation) -> Self {
        Self::Deactivate(op)
    }
}

/// Partially verified Sidetree DID operation
///
/// Operation verification is described in [Sidetree §10.2.1 Operation Verification][ov].
///
/// [ov]: https://identity.foundation/sidetree/spec/v1.0.0/#operation-verification
#[derive(Debug, Clone)]
pub enum PartiallyVerifiedOperation {
    Create(PartiallyVerifiedCreateOperation),
    Update(PartiallyVerifiedUpdateOperation),
    Recover(PartiallyVerifiedRecoverOperation),
    Deactivate(PartiallyVerifiedDeactivateOperation),
}

/// A Sidetree operation that can check its own internal consistency.
pub trait SidetreeOperation {
    type PartiallyVerifiedForm;

    /// Verify signatures, reveal values and hashes inside the operation.
    ///
    /// Whether the revealed key matches an earlier commitment depends on the
    /// previous operation and is left to [`PartiallyVerifiedOperation::follows`].
    /// The DID suffix is only checked for create and deactivate.
    fn partial_verify(self, config: &IonConfig) -> Result<Self::PartiallyVerifiedForm>;
}

impl SidetreeOperation for Operation {
    type PartiallyVerifiedForm = PartiallyVerifiedOperation;

    fn partial_verify(self, config: &IonConfig) -> Result<PartiallyVerifiedOperation> {
        match self {
            Operation::Create(op) => op
                .partial_verify(config)
                .map(PartiallyVerifiedOperation::Create),
            Operation::Update(op) => op
                .partial_verify(config)
                .map(PartiallyVerifiedOperation::Update),
            Operation::Recover(op) => op
                .partial_verify(config)
                .map(PartiallyVerifiedOperation::Recover),
            Operation::Deactivate(op) => op
                .partial_verify(config)
                .map(PartiallyVerifiedOperation::Deactivate),
        }
    }
}

impl PartiallyVerifiedOperation {
    pub fn update_commitment(&self) -> Option<&str> {
        match self {
            Self::Create(create) => Some(&create.hashed_delta.update_commitment),
            Self::Update(update) => Some(&update.signed_delta.update_commitment),
            Self::Recover(recover) => Some(&recover.signed_delta.update_commitment),
            Self::Deactivate(_) => None,
        }
    }

    pub fn recovery_commitment(&self) -> Option<&str> {
        match self {
            Self::Create(create) => Some(&create.recovery_commitment),
            Self::Update(_) => None,
            Self::Recover(recover) => Some(&recover.signed_recovery_commitment),
            Self::Deactivate(_) => None,
        }
    }

    /// Check that this operation may directly follow `previous`.
    pub fn follows(&self, previous: &PartiallyVerifiedOperation, config: &IonConfig) -> Result<()> {
        match self {
            Self::Create(_) => Err(IonError::new(
                ErrorCode::CommitmentMismatch,
                "A create operation cannot follow another operation.",
            )),
            Self::Update(update) => {
                let update_commitment = previous
                    .update_commitment()
                    .ok_or_else(|| missing_commitment("update"))?;
                ensure_reveal_commitment(
                    update_commitment,
                    &update.reveal_value,
                    &update.signed_update_key,
                    config,
                )
            }
            Self::Recover(recover) => {
                let recovery_commitment = previous
                    .recovery_commitment()
                    .ok_or_else(|| missing_commitment("recovery"))?;
                ensure_reveal_commitment(
                    recovery_commitment,
                    &recover.reveal_value,
                    &recover.signed_recovery_key,
                    config,
                )
            }
            Self::Deactivate(deactivate) => {
                // Recover operations do not sign over the DID suffix, so only a
                // preceding create can be checked here.
                if let Self::Create(create) = previous {
                    if create.did_suffix != deactivate.signed_did_suffix {
                        return Err(IonError::new(
                            ErrorCode::DidSuffixMismatch,
                            format!(
                                "DID suffix mismatch (expected {}, found {}).",
                                create.did_suffix, deactivate.signed_did_suffix
                            ),
                        ));
                    }
                }
                let recovery_commitment = previous
                    .recovery_commitment()
                    .ok_or_else(|| missing_commitment("recovery"))?;
                ensure_reveal_commitment(
                    recovery_commitment,
                    &deactivate.reveal_value,
                    &deactivate.signed_recovery_key,
                    config,
                )
            }
        }
    }
}

fn missing_commitment(kind: &str) -> IonError {
    IonError::new(
        ErrorCode::CommitmentMismatch,
        format!("Previous operation has no {kind} commitment."),
    )
}

fn ensure_reveal_commitment(
    commitment: &str,
    revealed: &str,
    key: &Jwk,
    config: &IonConfig,
) -> Result<()> {
    ensure_reveal_value(revealed, key, config)?;
    let computed_commitment = commitment_scheme(key, config.hash_algorithm_code)?;
    if computed_commitment != commitment {
        return Err(IonError::new(
            ErrorCode::CommitmentMismatch,
            "Revealed key does not match the previous commitment.",
        ));
    }
    Ok(())
}

fn ensure_reveal_value(found: &str, key: &Jwk, config: &IonConfig) -> Result<()> {
    let computed = reveal_value(key, config.hash_algorithm_code)?;
    if computed != found {
        return Err(IonError::new(
            ErrorCode::RevealValueMismatch,
            format!("Reveal value mismatch (computed: {computed}, found: {found})."),
        ));
    }
    Ok(())
}

/// Decode and verify signed data whose public key sits inside the payload.
///
/// The claims are deserialized first, `get_key` picks the key out of them,
/// and only then is the signature checked against that key.
fn decode_verify_signed_data<Claims: DeserializeOwned>(
    signed_data: &str,
    get_key: impl FnOnce(&Claims) -> &Jwk,
) -> Result<(Header, Claims)> {
    let (header_b64, payload_b64, signature_b64) = jws::split_jws(signed_data)?;
    let DecodedJws {
        header,
        signing_input,
        payload,
        signature,
    } = jws::decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|e| {
        IonError::new(
            ErrorCode::JwsMalformed,
            format!("Invalid signed data payload: {e}"),
        )
    })?;
    let key = get_key(&claims);
    key.validate(OperationKeyType::Public)?;
    if !jws::verify_bytes(header.algorithm, &signing_input, key, &signature)? {
        return Err(IonError::new(
            ErrorCode::SignatureVerificationFailed,
            "Signed data signature does not verify against the revealed key.",
        ));
    }
    Ok((header, claims))
}
