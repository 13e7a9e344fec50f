pub mod callback;
mod preferences;

pub use callback::CallbackParams;
use jose_jwk::Jwk;
pub use preferences::ClientPreferences;
use serde::{Deserialize, Serialize};

/// A device-held key to be covered by a key attestation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestedKey {
    pub key_id: String,
    pub public_key: Jwk,
}

impl AttestedKey {
    pub fn new(key_id: impl Into<String>, public_key: Jwk) -> Self {
        Self { key_id: key_id.into(), public_key }
    }
}
