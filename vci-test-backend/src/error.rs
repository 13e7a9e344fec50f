use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Broker(#[from] crate::broker::Error),
    #[error(transparent)]
    Callback(#[from] crate::types::callback::Error),
    #[error(transparent)]
    Keys(#[from] crate::keys::Error),
    #[error(transparent)]
    Signer(#[from] crate::signer::Error),
    #[error("key attestation requires at least one key")]
    NoKeysToAttest,
    #[error("loading config error: {0}")]
    ConfigLoad(crate::config::LoadError),
}

pub type Result<T> = core::result::Result<T, Error>;
