//! Builders for the four ION operation requests.
//!
//! Create is synchronous. Update, recover and deactivate hand the signed
//! payload to a [`Signer`] and are `async` for that reason only.

use crate::{
    did::DIDSuffix,
    jws::Header,
    sidetree::{
        commitment_scheme, reveal_value, CreateOperation, DIDStatePatch, DeactivateClaims,
        DeactivateOperation, Delta, DocumentState, PublicKeyEntry, RecoverOperation,
        RecoveryClaims, ServiceEndpointEntry, SuffixData, UpdateClaims, UpdateOperation,
    },
    validator, IonConfig, Jwk, OperationKeyType, Result, Signer,
};

/// Input of [`IonRequest::create_create_request`].
#[derive(Debug, Clone)]
pub struct CreateRequestInput {
    pub recovery_key: Jwk,
    pub update_key: Jwk,
    /// Initial document, applied with a single `replace` patch.
    pub document: DocumentState,
}

/// Input of [`IonRequest::create_update_request`].
///
/// Empty lists produce no patch.
#[derive(Debug, Clone)]
pub struct UpdateRequestInput {
    pub did_suffix: String,
    pub update_public_key: Jwk,
    pub next_update_public_key: Jwk,
    pub services_to_add: Vec<ServiceEndpointEntry>,
    pub ids_of_services_to_remove: Vec<String>,
    pub public_keys_to_add: Vec<PublicKeyEntry>,
    pub ids_of_public_keys_to_remove: Vec<String>,
}

impl UpdateRequestInput {
    pub fn new(
        did_suffix: impl Into<String>,
        update_public_key: Jwk,
        next_update_public_key: Jwk,
    ) -> Self {
        Self {
            did_suffix: did_suffix.into(),
            update_public_key,
            next_update_public_key,
            services_to_add: Vec::new(),
            ids_of_services_to_remove: Vec::new(),
            public_keys_to_add: Vec::new(),
            ids_of_public_keys_to_remove: Vec::new(),
        }
    }

    pub fn add_services(mut self, services: Vec<ServiceEndpointEntry>) -> Self {
        self.services_to_add.extend(services);
        self
    }

    pub fn remove_services(mut self, ids: Vec<String>) -> Self {
        self.ids_of_services_to_remove.extend(ids);
        self
    }

    pub fn add_public_keys(mut self, public_keys: Vec<PublicKeyEntry>) -> Self {
        self.public_keys_to_add.extend(public_keys);
        self
    }

    pub fn remove_public_keys(mut self, ids: Vec<String>) -> Self {
        self.ids_of_public_keys_to_remove.extend(ids);
        self
    }
}

/// Input of [`IonRequest::create_recover_request`].
#[derive(Debug, Clone)]
pub struct RecoverRequestInput {
    pub did_suffix: String,
    pub recovery_public_key: Jwk,
    pub next_recovery_public_key: Jwk,
    pub next_update_public_key: Jwk,
    /// Replaces the whole document.
    pub document: DocumentState,
}

/// Operation request builder.
#[derive(Debug, Clone, Default)]
pub struct IonRequest {
    config: IonConfig,
}

impl IonRequest {
    pub fn new(config: IonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IonConfig {
        &self.config
    }

    fn code(&self) -> u64 {
        self.config.hash_algorithm_code
    }

    /// Build a create request.
    ///
    /// [Sidetree §11.1 Create](https://identity.foundation/sidetree/spec/v1.0.0/#create)
    pub fn create_create_request(&self, input: CreateRequestInput) -> Result<CreateOperation> {
        let CreateRequestInput {
            recovery_key,
            update_key,
            document,
        } = input;

        recovery_key.validate(OperationKeyType::Public)?;
        update_key.validate(OperationKeyType::Public)?;
        validator::validate_document(&document)?;

        let delta = Delta {
            patches: vec![DIDStatePatch::Replace { document }],
            update_commitment: commitment_scheme(&update_key, self.code())?,
        };
        let delta_size = validator::validate_delta_size(&delta, &self.config)?;

        let suffix_data = SuffixData {
            delta_hash: delta.hash(self.code())?,
            recovery_commitment: commitment_scheme(&recovery_key, self.code())?,
        };

        let operation = CreateOperation { suffix_data, delta };
        log::debug!(
            "built create request for DID suffix {} ({delta_size} byte delta)",
            operation.did_suffix(&self.config)?
        );
        Ok(operation)
    }

    /// Build an update request and sign it with the current update key.
    ///
    /// Patches are emitted in the order add-services, remove-services,
    /// add-public-keys, remove-public-keys.
    ///
    /// [Sidetree §11.2 Update](https://identity.foundation/sidetree/spec/v1.0.0/#update)
    pub async fn create_update_request(
        &self,
        input: UpdateRequestInput,
        signer: &dyn Signer,
    ) -> Result<UpdateOperation> {
        let UpdateRequestInput {
            did_suffix,
            update_public_key,
            next_update_public_key,
            services_to_add,
            ids_of_services_to_remove,
            public_keys_to_add,
            ids_of_public_keys_to_remove,
        } = input;

        validator::validate_did_suffix(&did_suffix, &self.config)?;
        update_public_key.validate(OperationKeyType::Public)?;
        next_update_public_key.validate(OperationKeyType::Public)?;
        validator::validate_services(&services_to_add)?;
        validator::validate_did_document_keys(&public_keys_to_add)?;
        for id in ids_of_services_to_remove
            .iter()
            .chain(&ids_of_public_keys_to_remove)
        {
            validator::validate_id(id)?;
        }

        let mut patches = Vec::new();
        if !services_to_add.is_empty() {
            patches.push(DIDStatePatch::AddServices {
                services: services_to_add,
            });
        }
        if !ids_of_services_to_remove.is_empty() {
            patches.push(DIDStatePatch::RemoveServices {
                ids: ids_of_services_to_remove,
            });
        }
        if !public_keys_to_add.is_empty() {
            patches.push(DIDStatePatch::AddPublicKeys {
                public_keys: public_keys_to_add,
            });
        }
        if !ids_of_public_keys_to_remove.is_empty() {
            patches.push(DIDStatePatch::RemovePublicKeys {
                ids: ids_of_public_keys_to_remove,
            });
        }

        let delta = Delta {
            patches,
            update_commitment: commitment_scheme(&next_update_public_key, self.code())?,
        };
        let delta_size = validator::validate_delta_size(&delta, &self.config)?;

        let reveal_value = reveal_value(&update_public_key, self.code())?;
        let delta_hash = delta.hash(self.code())?;
        log::trace!("update reveal value {reveal_value}, delta hash {delta_hash}");

        let header = Header::for_key(&update_public_key);
        let claims = UpdateClaims {
            update_key: update_public_key.to_public(),
            delta_hash,
        };
        let signed_data = signer.sign(&header, &serde_json::to_value(&claims)?).await?;

        log::debug!(
            "built update request for DID suffix {did_suffix} with {} patches ({delta_size} byte delta)",
            delta.patches.len()
        );
        Ok(UpdateOperation {
            did_suffix: DIDSuffix(did_suffix),
            reveal_value,
            delta,
            signed_data,
        })
    }

    /// Build a recover request and sign it with the current recovery key.
    ///
    /// [Sidetree §11.3 Recover](https://identity.foundation/sidetree/spec/v1.0.0/#recover)
    pub async fn create_recover_request(
        &self,
        input: RecoverRequestInput,
        signer: &dyn Signer,
    ) -> Result<RecoverOperation> {
        let RecoverRequestInput {
            did_suffix,
            recovery_public_key,
            next_recovery_public_key,
            next_update_public_key,
            document,
        } = input;

        validator::validate_did_suffix(&did_suffix, &self.config)?;
        recovery_public_key.validate(OperationKeyType::Public)?;
        next_recovery_public_key.validate(OperationKeyType::Public)?;
        next_update_public_key.validate(OperationKeyType::Public)?;
        validator::validate_document(&document)?;

        let reveal_value = reveal_value(&recovery_public_key, self.code())?;

        let delta = Delta {
            patches: vec![DIDStatePatch::Replace { document }],
            update_commitment: commitment_scheme(&next_update_public_key, self.code())?,
        };
        let delta_size = validator::validate_delta_size(&delta, &self.config)?;
        let delta_hash = delta.hash(self.code())?;

        let header = Header::for_key(&recovery_public_key);
        let claims = RecoveryClaims {
            recovery_commitment: commitment_scheme(&next_recovery_public_key, self.code())?,
            recovery_key: recovery_public_key.to_public(),
            delta_hash,
        };
        let signed_data = signer.sign(&header, &serde_json::to_value(&claims)?).await?;

        log::debug!(
            "built recover request for DID suffix {did_suffix} ({delta_size} byte delta)"
        );
        Ok(RecoverOperation {
            did_suffix: DIDSuffix(did_suffix),
            reveal_value,
            delta,
            signed_data,
        })
    }

    /// Build a deactivate request and sign it with the current recovery key.
    ///
    /// [Sidetree §11.4 Deactivate](https://identity.foundation/sidetree/spec/v1.0.0/#deactivate)
    pub async fn create_deactivate_request(
        &self,
        did_suffix: &str,
        recovery_public_key: &Jwk,
        signer: &dyn Signer,
    ) -> Result<DeactivateOperation> {
        validator::validate_did_suffix(did_suffix, &self.config)?;
        recovery_public_key.validate(OperationKeyType::Public)?;

        let reveal_value = reveal_value(recovery_public_key, self.code())?;

        let header = Header::for_key(recovery_public_key);
        let claims = DeactivateClaims {
            did_suffix: DIDSuffix(did_suffix.to_owned()),
            recovery_key: recovery_public_key.to_public(),
        };
        let signed_data = signer.sign(&header, &serde_json::to_value(&claims)?).await?;

        log::debug!("built deactivate request for DID suffix {did_suffix}");
        Ok(DeactivateOperation {
            did_suffix: claims.did_suffix,
            reveal_value,
            signed_data,
        })
    }
}
