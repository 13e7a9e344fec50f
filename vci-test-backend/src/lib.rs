#![doc = include_str!("../README.md")]
pub mod attestation;
pub mod broker;
pub mod config;
mod constants;
mod context;
mod error;
pub mod jose;
pub mod keys;
pub mod signer;
pub mod types;
mod utils;

pub use attestation::AttestationIssuer;
pub use broker::{DuplicatePolicy, PendingRedirect, RedirectBroker};
pub use config::{Config, FileStore};
pub use context::ClientContext;
pub use error::{Error, Result};
pub use keys::{ClientKeyMaterial, KeyHandle};
pub use signer::{JwkSigner, JwtSigner};
pub use types::{AttestedKey, CallbackParams, ClientPreferences};
