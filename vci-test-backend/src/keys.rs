//! Long-lived key material of the simulated backend.
//!
//! Two keys are loaded once at startup: the client-assertion key, which
//! authenticates the wallet client to an authorization server, and the
//! attestation-issuer key, which signs wallet and key attestations and comes
//! with the certificate chain a verifier uses to establish trust.
use jose_jwk::{crypto, Jwk, Key};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate kid: {0}")]
    DuplicateKid(String),
    #[error("{0} key must have a `kid`")]
    EmptyKid(&'static str),
    #[error("{0} key must have a subject")]
    EmptySubject(&'static str),
    #[error("{0} key for signing must be a secret key")]
    PublicKey(&'static str),
    #[error("{0} key cannot be used for signing: {1:?}")]
    UnusableKey(&'static str, crypto::Error),
    #[error("a symmetric key has no public part")]
    NoPublicPart,
    #[error("attestation issuer key requires a certificate chain")]
    MissingCertificateChain,
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

/// A signing-capable key together with its public identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHandle {
    pub jwk: Jwk,
    pub subject: String,
    /// Base64 DER certificates, leaf first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_chain: Option<Vec<String>>,
}

impl KeyHandle {
    pub fn new(jwk: Jwk, subject: impl Into<String>) -> Self {
        Self { jwk, subject: subject.into(), certificate_chain: None }
    }
    pub fn with_certificate_chain(mut self, chain: Vec<String>) -> Self {
        self.certificate_chain = Some(chain);
        self
    }
    pub fn kid(&self) -> Option<&str> {
        self.jwk.prm.kid.as_deref()
    }
    /// The key without its private parameters.
    pub fn public_jwk(&self) -> Result<Jwk> {
        public_part(&self.jwk)
    }
    fn validate(&self, role: &'static str) -> Result<()> {
        if self.kid().map_or(true, str::is_empty) {
            return Err(Error::EmptyKid(role));
        }
        if self.subject.is_empty() {
            return Err(Error::EmptySubject(role));
        }
        // accept exactly what the signer can sign with
        match crypto::Key::try_from(&self.jwk.key) {
            Ok(crypto::Key::P256(crypto::Kind::Secret(_))) => Ok(()),
            Ok(crypto::Key::P256(crypto::Kind::Public(_))) => Err(Error::PublicKey(role)),
            Ok(_) => Err(Error::UnusableKey(role, crypto::Error::Unsupported)),
            Err(err) => Err(Error::UnusableKey(role, err)),
        }
    }
}

// never print private parameters
impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("kid", &self.kid())
            .field("subject", &self.subject)
            .field("certificate_chain", &self.certificate_chain.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

/// The two key pairs of the backend. Immutable once handed to a
/// [`ClientContext`](crate::ClientContext).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientKeyMaterial {
    pub client_assertion: KeyHandle,
    pub attestation_issuer: KeyHandle,
}

impl ClientKeyMaterial {
    /// Parses and validates a key document such as
    ///
    /// ```json
    /// {
    ///   "client_assertion": { "jwk": { "kty": "EC", ... }, "subject": "wallet-client" },
    ///   "attestation_issuer": { "jwk": { ... }, "subject": "https://attestation.example", "certificate_chain": ["MII..."] }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let keys = serde_json::from_str::<Self>(json)?;
        keys.validate()?;
        Ok(keys)
    }
    pub fn validate(&self) -> Result<()> {
        self.client_assertion.validate("client assertion")?;
        self.attestation_issuer.validate("attestation issuer")?;
        if self.attestation_issuer.certificate_chain.as_ref().map_or(true, Vec::is_empty) {
            return Err(Error::MissingCertificateChain);
        }
        let mut kids = HashSet::with_capacity(2);
        for kid in [self.client_assertion.kid(), self.attestation_issuer.kid()].into_iter().flatten()
        {
            if !kids.insert(kid) {
                return Err(Error::DuplicateKid(kid.to_string()));
            }
        }
        Ok(())
    }
}

/// Copy of `jwk` with every private parameter removed.
pub(crate) fn public_part(jwk: &Jwk) -> Result<Jwk> {
    let mut jwk = jwk.clone();
    match &mut jwk.key {
        Key::Ec(ec) => ec.d = None,
        Key::Okp(okp) => okp.d = None,
        Key::Rsa(rsa) => rsa.prv = None,
        _ => return Err(Error::NoPublicPart),
    }
    Ok(jwk)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jose_jwk::{crypto, Parameters};
    use p256::SecretKey;
    use rand::rngs::ThreadRng;

    pub(crate) fn generate_jwk(kid: &str) -> (SecretKey, Jwk) {
        let secret_key = SecretKey::random(&mut ThreadRng::default());
        let key = Key::from(&crypto::Key::P256(crypto::Kind::Secret(secret_key.clone())));
        let jwk = Jwk { key, prm: Parameters { kid: Some(kid.into()), ..Default::default() } };
        (secret_key, jwk)
    }

    // RFC 8037, Appendix A.1
    pub(crate) fn ed25519_jwk(kid: &str) -> Jwk {
        serde_json::from_value(serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "kid": kid,
            "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo",
            "d": "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A",
        }))
        .expect("invalid OKP jwk")
    }

    pub(crate) fn key_material() -> ClientKeyMaterial {
        ClientKeyMaterial {
            client_assertion: KeyHandle::new(generate_jwk("client-01").1, "wallet-client"),
            attestation_issuer: KeyHandle::new(
                generate_jwk("attestation-01").1,
                "https://attestation.example",
            )
            .with_certificate_chain(vec![String::from("MIIBleaf"), String::from("MIIBroot")]),
        }
    }

    #[test]
    fn test_valid_key_material() {
        let keys = key_material();
        assert!(keys.validate().is_ok());
        let json = serde_json::to_string(&keys).expect("failed to serialize keys");
        let parsed = ClientKeyMaterial::from_json(&json).expect("failed to parse keys");
        assert_eq!(parsed, keys);
    }

    #[test]
    fn test_public_jwk_strips_private_part() {
        let keys = key_material();
        let public = keys.client_assertion.public_jwk().expect("failed to get public part");
        let Key::Ec(ec) = &public.key else {
            panic!("expected an EC key");
        };
        assert!(ec.d.is_none());
        assert_eq!(public.prm.kid.as_deref(), Some("client-01"));
    }

    #[test]
    fn test_public_part_of_other_key_types() {
        // OKP
        {
            let public = public_part(&ed25519_jwk("okp-01")).expect("failed to get public part");
            let json = serde_json::to_value(&public).expect("failed to serialize");
            assert_eq!(json["x"], "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo");
            assert!(json.get("d").is_none());
        }
        // RSA, private exponent only
        {
            let jwk = serde_json::from_value::<Jwk>(serde_json::json!({
                "kty": "RSA",
                "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
                "e": "AQAB",
                "d": "X4cTteJY_gn4FYPsXB8rdXix5vwsg1FLN5E3EaG6RJoVH-HLLKD9M7dx5oo7GURknchnrRweUkC7hT5fJLM0WbFAKNLWY2vv7B6NqXSzUvxT0_YSfqijwp3RTzlBaCxWp4doFk5N2o8Gy_nHNKroADIkJ46pRUohsXywbReAdYaMwFs9tv8d_cPVY3i07a3t8MN6TNwm0dSawm9v47UiCl3Sk5ZiG7xojPLu4sbg1U2jx4IBTNBznbJSzFHK66jT8bgkuqsk0GjskDJk19Z4qwjwbsnn4j2WBii3RL-Us2lGVkY8fkFzme1z0HbIkfz0Y6mqnOYtqc0X4jfcKoAC8Q",
            }))
            .expect("invalid RSA jwk");
            let json = serde_json::to_value(public_part(&jwk).expect("failed to get public part"))
                .expect("failed to serialize");
            assert_eq!(json["e"], "AQAB");
            assert!(json.get("d").is_none());
        }
        // symmetric
        {
            let jwk = serde_json::from_value::<Jwk>(serde_json::json!({
                "kty": "oct",
                "k": "GawgguFyGrWKav7AX4VKUg",
            }))
            .expect("invalid oct jwk");
            assert!(matches!(public_part(&jwk), Err(Error::NoPublicPart)));
        }
    }

    #[test]
    fn test_invalid_key_material() {
        // public key only
        {
            let mut keys = key_material();
            keys.client_assertion.jwk =
                keys.client_assertion.public_jwk().expect("failed to get public part");
            assert!(matches!(keys.validate(), Err(Error::PublicKey("client assertion"))));
        }
        // key types the signer cannot use, private or not
        {
            let mut keys = key_material();
            keys.attestation_issuer.jwk = ed25519_jwk("attestation-01");
            assert!(matches!(
                keys.validate(),
                Err(Error::UnusableKey("attestation issuer", crypto::Error::Unsupported))
            ));
            keys.attestation_issuer.jwk =
                public_part(&ed25519_jwk("attestation-01")).expect("failed to get public part");
            assert!(matches!(
                keys.validate(),
                Err(Error::UnusableKey("attestation issuer", crypto::Error::Unsupported))
            ));
        }
        // malformed private scalar
        {
            let mut keys = key_material();
            let mut json =
                serde_json::to_value(&keys.client_assertion.jwk).expect("failed to serialize");
            json["d"] = serde_json::Value::from("AAAA");
            keys.client_assertion.jwk = serde_json::from_value(json).expect("invalid jwk");
            assert!(matches!(
                keys.validate(),
                Err(Error::UnusableKey("client assertion", crypto::Error::Invalid))
            ));
        }
        // missing kid
        {
            let mut keys = key_material();
            keys.attestation_issuer.jwk.prm.kid = None;
            assert!(matches!(keys.validate(), Err(Error::EmptyKid("attestation issuer"))));
        }
        // missing certificate chain
        {
            let mut keys = key_material();
            keys.attestation_issuer.certificate_chain = Some(Vec::new());
            assert!(matches!(keys.validate(), Err(Error::MissingCertificateChain)));
        }
        // duplicate kid
        {
            let mut keys = key_material();
            keys.attestation_issuer.jwk.prm.kid = Some(String::from("client-01"));
            assert!(matches!(keys.validate(), Err(Error::DuplicateKid(kid)) if kid == "client-01"));
        }
        // not json
        assert!(matches!(ClientKeyMaterial::from_json("{"), Err(Error::SerdeJson(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let keys = key_material();
        let json = serde_json::to_value(&keys.client_assertion.jwk).expect("failed to serialize");
        let d = json["d"].as_str().expect("secret key should have `d`");
        let debug = format!("{:?}", keys.client_assertion);
        assert!(debug.contains("client-01"));
        assert!(!debug.contains(d));
    }
}
