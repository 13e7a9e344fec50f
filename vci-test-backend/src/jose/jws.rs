use jose_jwa::Algorithm;
use serde::{Deserialize, Serialize};

/// The JOSE header parameters the backend's tokens carry.
// https://datatracker.ietf.org/doc/html/rfc7515#section-4.1
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredHeader {
    pub alg: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Base64 DER certificates, leaf first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl RegisteredHeader {
    /// Header for a typed JWT, before the signer fills in `alg` and `kid`.
    pub fn typed(alg: Algorithm, typ: impl Into<String>) -> Self {
        Self { typ: Some(typ.into()), ..Self::from(alg) }
    }
}

impl From<Algorithm> for RegisteredHeader {
    fn from(alg: Algorithm) -> Self {
        Self { alg, kid: None, x5c: None, typ: None }
    }
}
