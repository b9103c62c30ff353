//! Client-side construction of [`did:ion`][ion] operations.
//!
//! ION is a [Sidetree][sidetree] network anchored on Bitcoin. This crate
//! builds the four Sidetree operation requests (create, update, recover and
//! deactivate) that a wallet submits to an ION node, derives long-form DIDs,
//! and generates the operation keys those requests commit to. It does not talk
//! to a node and does not resolve DIDs.
//!
//! [ion]: <https://identity.foundation/ion/>
//! [sidetree]: <https://identity.foundation/sidetree/spec/v1.0.0/>
//!
//! # Basic Usage
//!
//! ```
//! use did_ion_sdk::{
//!     create_long_form_did, jwk::generate_es256k_operation_key_pair, DocumentState,
//!     IonConfig, IonDid,
//! };
//!
//! let (recovery_key, _recovery_private_key) = generate_es256k_operation_key_pair();
//! let (update_key, _update_private_key) = generate_es256k_operation_key_pair();
//!
//! let config = IonConfig::default();
//! let did = create_long_form_did(&config, &recovery_key, &update_key, &DocumentState::default())
//!     .unwrap();
//!
//! let parsed = IonDid::parse(&did, &config).unwrap();
//! assert!(parsed.create_operation(&config).unwrap().is_some());
//! ```
//!
//! Update, recover and deactivate requests are signed through a [`Signer`].
//! [`LocalSigner`] signs with an in-memory private key; other implementations
//! can delegate to external key stores.
pub mod canonicalizer;
pub mod config;
pub mod did;
pub mod encoder;
pub mod error;
pub mod jwk;
pub mod jws;
pub mod multihash;
pub mod request;
pub mod sidetree;
pub mod signer;
pub mod validator;

pub use config::IonConfig;
pub use did::{create_long_form_did, DIDSuffix, IonDid};
pub use error::{ErrorCode, IonError, Result};
pub use jwk::{Jwk, OperationKeyType};
pub use request::{CreateRequestInput, IonRequest, RecoverRequestInput, UpdateRequestInput};
pub use sidetree::{
    DIDStatePatch, Delta, DocumentState, Operation, PublicKeyEntry, PublicKeyPurpose,
    ServiceEndpointEntry,
};
pub use signer::{LocalSigner, Signer};
