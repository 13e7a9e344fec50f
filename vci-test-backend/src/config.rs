//! Startup configuration: the client preferences and the two signing keys.
//!
//! The configuration is read once, turned into a
//! [`ClientContext`](crate::ClientContext), and never written back.
mod file;

pub use self::file::{FileStore, Format};
use crate::error::{Error, Result};
use crate::keys::ClientKeyMaterial;
use crate::types::ClientPreferences;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Error produced by a [`Loader`].
pub type LoadError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything the backend needs at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub preferences: ClientPreferences,
    pub keys: ClientKeyMaterial,
}

impl Config {
    /// Reads the configuration from `loader`.
    ///
    /// Key material is checked later, when the context is built.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        let config = loader.load().await.map_err(Error::ConfigLoad)?;
        tracing::debug!(
            client_id = config.preferences.client_id(),
            client_assertion_kid = ?config.keys.client_assertion.kid(),
            attestation_issuer_kid = ?config.keys.attestation_issuer.kid(),
            "loaded config"
        );
        Ok(config)
    }
}

/// A source of the startup [`Config`].
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait Loader {
    fn load(&self) -> impl Future<Output = core::result::Result<Config, LoadError>>;
}
