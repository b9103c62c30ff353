use serde::{Deserialize, Serialize};

use crate::multihash::SHA2_256;

/// Default value of [`IonConfig::max_canonicalized_delta_size_in_bytes`].
pub const DEFAULT_MAX_CANONICALIZED_DELTA_SIZE_IN_BYTES: usize = 1000;

/// Network name for which no network segment is added to DIDs.
pub const MAINNET: &str = "mainnet";

/// DID method name
pub const METHOD: &str = "ion";

/// Parameters shared by every operation builder.
///
/// Constructed once and handed to [`IonRequest`](crate::IonRequest) (and to the
/// free functions that need it); nothing in this crate reads configuration from
/// global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct IonConfig {
    /// Multihash code of the hash algorithm. Only `18` (SHA-256) is supported.
    pub hash_algorithm_code: u64,

    /// Upper bound on the size of a canonicalized delta object.
    pub max_canonicalized_delta_size_in_bytes: usize,

    /// Network instance, e.g. `test`.
    ///
    /// `None` and `"mainnet"` both produce DIDs without a network segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl Default for IonConfig {
    fn default() -> Self {
        Self {
            hash_algorithm_code: SHA2_256,
            max_canonicalized_delta_size_in_bytes: DEFAULT_MAX_CANONICALIZED_DELTA_SIZE_IN_BYTES,
            network: None,
        }
    }
}

impl IonConfig {
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn with_max_delta_size(mut self, max_canonicalized_delta_size_in_bytes: usize) -> Self {
        self.max_canonicalized_delta_size_in_bytes = max_canonicalized_delta_size_in_bytes;
        self
    }

    /// Network segment to put in DIDs, if any.
    pub fn network_segment(&self) -> Option<&str> {
        match self.network.as_deref() {
            None | Some(MAINNET) => None,
            Some("") => {
                log::warn!("empty network name configured, treating as mainnet");
                None
            }
            Some(network) => Some(network),
        }
    }

    /// `did:ion:` followed by the network segment, if any.
    pub fn did_prefix(&self) -> String {
        match self.network_segment() {
            Some(network) => format!("did:{METHOD}:{network}:"),
            None => format!("did:{METHOD}:"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IonConfig::default();
        assert_eq!(config.hash_algorithm_code, 18);
        assert_eq!(config.max_canonicalized_delta_size_in_bytes, 1000);
        assert_eq!(config.did_prefix(), "did:ion:");
    }

    #[test]
    fn mainnet_has_no_network_segment() {
        let config = IonConfig::default().with_network("mainnet");
        assert_eq!(config.did_prefix(), "did:ion:");
        let config = IonConfig::default().with_network("test");
        assert_eq!(config.did_prefix(), "did:ion:test:");
    }

    #[test]
    fn deserialize_partial() {
        let config: IonConfig = serde_json::from_str(r#"{"network":"test"}"#).unwrap();
        assert_eq!(config.network.as_deref(), Some("test"));
        assert_eq!(config.hash_algorithm_code, 18);

        let config: IonConfig =
            serde_json::from_str(r#"{"maxCanonicalizedDeltaSizeInBytes":2000}"#).unwrap();
        assert_eq!(config.max_canonicalized_delta_size_in_bytes, 2000);
        assert_eq!(config.network, None);
    }
}
