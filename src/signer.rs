//! Signing capability used by the update, recover and deactivate builders.

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    jws::{self, Header},
    ErrorCode, IonError, Jwk, OperationKeyType, Result,
};

/// Produces a compact JWS over a JSON payload.
///
/// Implementations may hold keys in memory, in an HSM or behind a remote
/// service; builders only ever see the returned compact JWS.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, header: &Header, content: &Value) -> Result<String>;
}

/// [`Signer`] holding a private operation key in memory.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    private_key: Jwk,
}

impl LocalSigner {
    pub fn new(private_key: Jwk) -> Result<Self> {
        private_key.validate(OperationKeyType::Private)?;
        Ok(Self { private_key })
    }

    pub fn public_key(&self) -> Jwk {
        self.private_key.to_public()
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign(&self, header: &Header, content: &Value) -> Result<String> {
        if header.algorithm != self.private_key.algorithm() {
            return Err(IonError::new(
                ErrorCode::JwsAlgorithmMismatch,
                format!(
                    "Header algorithm {} does not match {} signing key.",
                    header.algorithm,
                    self.private_key.algorithm()
                ),
            ));
        }
        let payload = serde_json::to_vec(content)?;
        log::trace!("signing {} byte payload with {}", payload.len(), header.algorithm);
        jws::sign(header, &payload, &self.private_key)
    }
}
