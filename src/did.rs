//! `did:ion` strings.
//!
//! Reference: [Sidetree §9. DID URI Composition][duc]
//!
//! [duc]: https://identity.foundation/sidetree/spec/v1.0.0/#did-uri-composition

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    canonicalizer,
    config::METHOD,
    encoder,
    request::{CreateRequestInput, IonRequest},
    sidetree::{CreateOperation, DocumentState},
    validator, ErrorCode, IonConfig, IonError, Jwk, Result,
};

/// An ION DID, short or long form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IonDid {
    /// `did:ion:[network:]suffix`
    Short {
        network: Option<String>,
        did_suffix: DIDSuffix,
    },

    /// `did:ion:[network:]suffix:initial-state`
    ///
    /// Reference: [§9.1 Long-Form DID URIs](https://identity.foundation/sidetree/spec/v1.0.0/#long-form-did-uris)
    Long {
        network: Option<String>,
        did_suffix: DIDSuffix,
        create_operation_data: String,
    },
}

fn malformed(did: &str, reason: &str) -> IonError {
    IonError::new(
        ErrorCode::DidMalformed,
        format!("DID '{did}' is malformed: {reason}."),
    )
}

impl IonDid {
    /// Parse `did`, validating the suffix against `config`.
    ///
    /// A network segment, when present, is kept as found; it is not compared
    /// with the configured network.
    pub fn parse(did: &str, config: &IonConfig) -> Result<Self> {
        let mut parts = did.split(':');

        if parts.next() != Some("did") {
            return Err(malformed(did, "invalid URI scheme"));
        }

        match parts.next() {
            Some(METHOD) => {}
            Some(method) => {
                return Err(IonError::new(
                    ErrorCode::DidMethodMismatch,
                    format!("DID method must be '{METHOD}' but got '{method}'."),
                ))
            }
            None => return Err(malformed(did, "missing DID method")),
        }

        let rest: Vec<&str> = parts.collect();
        // Two segments are either `network:suffix` or `suffix:initial-state`.
        let (network, did_suffix, create_operation_data) = match rest.as_slice() {
            [suffix] => (None, *suffix, None),
            [first, second] if validator::validate_did_suffix(first, config).is_ok() => {
                (None, *first, Some(*second))
            }
            [network, suffix] => (Some(*network), *suffix, None),
            [network, suffix, data] => (Some(*network), *suffix, Some(*data)),
            [] => return Err(malformed(did, "missing DID suffix")),
            _ => return Err(malformed(did, "unexpected data after long-form DID")),
        };

        if network.is_some_and(str::is_empty) {
            return Err(malformed(did, "empty network segment"));
        }
        if create_operation_data.is_some_and(str::is_empty) {
            return Err(malformed(did, "empty initial state"));
        }

        validator::validate_did_suffix(did_suffix, config)?;

        let network = network.map(str::to_owned);
        let did_suffix = DIDSuffix(did_suffix.to_owned());
        Ok(match create_operation_data {
            None => Self::Short {
                network,
                did_suffix,
            },
            Some(data) => Self::Long {
                network,
                did_suffix,
                create_operation_data: data.to_owned(),
            },
        })
    }

    pub fn did_suffix(&self) -> &DIDSuffix {
        match self {
            Self::Short { did_suffix, .. } | Self::Long { did_suffix, .. } => did_suffix,
        }
    }

    pub fn network(&self) -> Option<&str> {
        match self {
            Self::Short { network, .. } | Self::Long { network, .. } => network.as_deref(),
        }
    }

    /// The same DID without its initial state.
    pub fn short_form(&self) -> Self {
        Self::Short {
            network: self.network().map(str::to_owned),
            did_suffix: self.did_suffix().clone(),
        }
    }

    /// Decode the create operation embedded in a long-form DID.
    ///
    /// Returns `None` for a short-form DID. The embedded suffix data must hash
    /// to the DID suffix.
    pub fn create_operation(&self, config: &IonConfig) -> Result<Option<CreateOperation>> {
        let Self::Long {
            did_suffix,
            create_operation_data,
            ..
        } = self
        else {
            return Ok(None);
        };

        let json = encoder::decode_as_bytes(create_operation_data, "long-form DID initial state")?;
        let operation: CreateOperation = serde_json::from_slice(&json).map_err(|e| {
            IonError::new(
                ErrorCode::DidMalformed,
                format!("Long-form DID initial state is not a create operation: {e}"),
            )
        })?;

        let computed = operation.did_suffix(config)?;
        if &computed != did_suffix {
            return Err(IonError::new(
                ErrorCode::DidSuffixMismatch,
                format!("DID suffix {did_suffix} does not match initial state suffix {computed}."),
            ));
        }
        Ok(Some(operation))
    }
}

impl FromStr for IonDid {
    type Err = IonError;

    fn from_str(did: &str) -> Result<Self> {
        Self::parse(did, &IonConfig::default())
    }
}

impl fmt::Display for IonDid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "did:{METHOD}:")?;
        if let Some(network) = self.network() {
            write!(f, "{network}:")?;
        }
        match self {
            Self::Short { did_suffix, .. } => write!(f, "{did_suffix}"),
            Self::Long {
                did_suffix,
                create_operation_data,
                ..
            } => write!(f, "{did_suffix}:{create_operation_data}"),
        }
    }
}

/// [DID Suffix](https://identity.foundation/sidetree/spec/v1.0.0/#did-suffix)
///
/// Unique identifier string within a DID (short or long form)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct DIDSuffix(pub String);

impl DIDSuffix {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DIDSuffix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<IonDid> for DIDSuffix {
    fn from(did: IonDid) -> DIDSuffix {
        match did {
            IonDid::Short { did_suffix, .. } | IonDid::Long { did_suffix, .. } => did_suffix,
        }
    }
}

/// Long-form DID for a new identity.
///
/// Builds the create request for the given keys and document and embeds it
/// after the short-form DID.
pub fn create_long_form_did(
    config: &IonConfig,
    recovery_key: &Jwk,
    update_key: &Jwk,
    document: &DocumentState,
) -> Result<String> {
    let request = IonRequest::new(config.clone());
    let operation = request.create_create_request(CreateRequestInput {
        recovery_key: recovery_key.clone(),
        update_key: update_key.clone(),
        document: document.clone(),
    })?;

    let did = operation.to_ion_did(config)?;
    log::debug!(
        "derived long-form DID for suffix {} ({} byte initial state)",
        did.did_suffix(),
        canonicalizer::canonicalize(&operation)?.len()
    );
    Ok(did.to_string())
}
