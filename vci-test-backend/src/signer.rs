//! The signing delegate boundary.
//!
//! The attestation facade only decides *which* key signs *what*; producing
//! the signature is left to a [`JwtSigner`].
use crate::jose::create_signed_jwt;
use crate::jose::jws::RegisteredHeader;
use crate::jose::jwt::Claims;
use crate::keys::KeyHandle;
use jose_jwa::{Algorithm, Signing};
use jose_jwk::{crypto, EcCurves, Key};
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("key for signing must be a secret key")]
    PublicKey,
    #[error("crypto error: {0:?}")]
    JwkCrypto(crypto::Error),
    #[error(transparent)]
    Signature(#[from] ecdsa::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait JwtSigner {
    /// Signs `claims` with `key` and returns the compact JWS.
    ///
    /// Implementations set `alg` (and `kid`, when known) in `header`.
    fn sign(
        &self,
        key: &KeyHandle,
        header: RegisteredHeader,
        claims: Claims,
    ) -> impl Future<Output = Result<String>>;
}

/// Signs with the JWK held by the key handle. Only P-256 (`ES256`) keys are
/// supported.
#[derive(Clone, Debug)]
pub struct JwkSigner {
    accepted_algorithms: Vec<String>,
}

impl JwkSigner {
    pub fn new(accepted_algorithms: Vec<String>) -> Self {
        Self { accepted_algorithms }
    }
    fn algorithm(key: &Key) -> Result<&'static str> {
        match key {
            Key::Ec(ec) => match &ec.crv {
                EcCurves::P256 => Ok("ES256"),
                crv => Err(Error::UnsupportedAlgorithm(format!("{crv:?}"))),
            },
            _ => Err(Error::UnsupportedAlgorithm(String::from("non-EC key"))),
        }
    }
}

impl Default for JwkSigner {
    fn default() -> Self {
        Self::new(vec![String::from("ES256")])
    }
}

impl JwtSigner for JwkSigner {
    async fn sign(
        &self,
        key: &KeyHandle,
        mut header: RegisteredHeader,
        claims: Claims,
    ) -> Result<String> {
        let alg = Self::algorithm(&key.jwk.key)?;
        if !self.accepted_algorithms.iter().any(|accepted| accepted == alg) {
            return Err(Error::UnsupportedAlgorithm(alg.into()));
        }
        match crypto::Key::try_from(&key.jwk.key).map_err(Error::JwkCrypto)? {
            crypto::Key::P256(crypto::Kind::Secret(secret_key)) => {
                header.alg = Algorithm::Signing(Signing::Es256);
                header.kid = key.kid().map(String::from);
                create_signed_jwt(secret_key.into(), header, claims)
            }
            crypto::Key::P256(crypto::Kind::Public(_)) => Err(Error::PublicKey),
            #[allow(unreachable_patterns)]
            _ => Err(Error::UnsupportedAlgorithm(alg.into())),
        }
    }
}
