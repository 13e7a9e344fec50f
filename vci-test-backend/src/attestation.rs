//! Issuance of the assertions an authorization or credential server expects
//! from the wallet client.
//!
//! Every token is signed through a [`JwtSigner`]; which key signs which
//! claims is fixed here:
//!
//! | token              | key                  | `iss`                   |
//! |--------------------|----------------------|-------------------------|
//! | client assertion   | client assertion     | client id               |
//! | wallet attestation | attestation issuer   | attestation issuer      |
//! | key attestation    | attestation issuer   | attestation issuer      |
use crate::constants::{
    ATTESTATION_LIFETIME, CLIENT_ASSERTION_LIFETIME, CLIENT_ASSERTION_TYPE_JWT_BEARER,
    JWT_HEADER_TYP_KEY_ATTESTATION, JWT_HEADER_TYP_WALLET_ATTESTATION,
};
use crate::context::ClientContext;
use crate::error::{Error, Result};
use crate::jose::jws::RegisteredHeader;
use crate::jose::jwt::{Claims, Confirmation, PublicClaims, RegisteredClaims, RegisteredClaimsAud};
use crate::keys::public_part;
use crate::signer::{JwkSigner, JwtSigner};
use crate::types::AttestedKey;
use crate::utils::{generate_nonce, issued_and_expiry};
use jose_jwa::{Algorithm, Signing};
use jose_jwk::Jwk;
use std::sync::Arc;

pub struct AttestationIssuer<S = JwkSigner> {
    context: Arc<ClientContext>,
    signer: S,
}

impl AttestationIssuer<JwkSigner> {
    /// Uses a [`JwkSigner`] restricted to the configured signing algorithms.
    pub fn new(context: Arc<ClientContext>) -> Self {
        let signer =
            JwkSigner::new(context.preferences().accepted_signing_algorithms().to_vec());
        Self { context, signer }
    }
}

impl<S> AttestationIssuer<S>
where
    S: JwtSigner,
{
    pub fn with_signer(context: Arc<ClientContext>, signer: S) -> Self {
        Self { context, signer }
    }
    pub fn client_id(&self) -> &str {
        self.context.preferences().client_id()
    }
    /// The `client_assertion_type` to send along with a client assertion.
    pub fn client_assertion_type(&self) -> &'static str {
        CLIENT_ASSERTION_TYPE_JWT_BEARER
    }
    /// Client authentication for a token request to `authorization_server`.
    pub async fn create_client_assertion_jwt(&self, authorization_server: &str) -> Result<String> {
        let key = &self.context.keys().client_assertion;
        let (iat, exp) = issued_and_expiry(CLIENT_ASSERTION_LIFETIME);
        // https://datatracker.ietf.org/doc/html/rfc7523#section-3
        let claims = RegisteredClaims {
            iss: Some(self.client_id().to_string()),
            sub: Some(self.client_id().to_string()),
            aud: Some(RegisteredClaimsAud::Single(authorization_server.to_string())),
            exp: Some(exp),
            iat: Some(iat),
            jti: Some(generate_nonce()),
            ..Default::default()
        };
        let jwt = self
            .signer
            .sign(key, RegisteredHeader::from(Algorithm::Signing(Signing::Es256)), claims.into())
            .await?;
        tracing::debug!(aud = authorization_server, kid = ?key.kid(), "issued client assertion");
        Ok(jwt)
    }
    /// Attests that `attested_key` belongs to this wallet instance.
    pub async fn create_wallet_attestation_jwt(&self, attested_key: &Jwk) -> Result<String> {
        let key = &self.context.keys().attestation_issuer;
        let preferences = self.context.preferences();
        let cnf = Confirmation { jwk: public_part(attested_key)? };
        let (iat, exp) = issued_and_expiry(ATTESTATION_LIFETIME);
        let claims = Claims {
            registered: RegisteredClaims {
                iss: Some(key.subject.clone()),
                sub: Some(self.client_id().to_string()),
                exp: Some(exp),
                iat: Some(iat),
                ..Default::default()
            },
            public: PublicClaims {
                cnf: Some(cnf),
                wallet_name: Some(preferences.wallet_name().to_string()),
                wallet_link: Some(preferences.wallet_link().to_string()),
                ..Default::default()
            },
        };
        let jwt = self
            .signer
            .sign(key, self.attestation_header(JWT_HEADER_TYP_WALLET_ATTESTATION), claims)
            .await?;
        tracing::debug!(
            sub = self.client_id(),
            attested_kid = ?attested_key.prm.kid,
            "issued wallet attestation"
        );
        Ok(jwt)
    }
    /// Attests a batch of device keys, bound to `challenge`.
    ///
    /// `user_authentication` and `key_storage` describe how the device
    /// protects the keys and are included only when given.
    pub async fn create_key_attestation_jwt(
        &self,
        keys_to_attest: &[AttestedKey],
        challenge: &str,
        user_authentication: Option<Vec<String>>,
        key_storage: Option<Vec<String>>,
    ) -> Result<String> {
        if keys_to_attest.is_empty() {
            return Err(Error::NoKeysToAttest);
        }
        let key = &self.context.keys().attestation_issuer;
        let attested_keys = keys_to_attest
            .iter()
            .map(|attested| {
                let mut jwk = public_part(&attested.public_key)?;
                jwk.prm.kid = Some(attested.key_id.clone());
                Ok(jwk)
            })
            .collect::<Result<Vec<_>>>()?;
        let (iat, exp) = issued_and_expiry(ATTESTATION_LIFETIME);
        let claims = Claims {
            registered: RegisteredClaims {
                iss: Some(key.subject.clone()),
                exp: Some(exp),
                iat: Some(iat),
                ..Default::default()
            },
            public: PublicClaims {
                nonce: Some(challenge.to_string()),
                attested_keys: Some(attested_keys),
                key_storage,
                user_authentication,
                ..Default::default()
            },
        };
        let jwt = self
            .signer
            .sign(key, self.attestation_header(JWT_HEADER_TYP_KEY_ATTESTATION), claims)
            .await?;
        tracing::debug!(count = keys_to_attest.len(), "issued key attestation");
        Ok(jwt)
    }
    fn attestation_header(&self, typ: &str) -> RegisteredHeader {
        let mut header = RegisteredHeader::typed(Algorithm::Signing(Signing::Es256), typ);
        header.x5c = self.context.keys().attestation_issuer.certificate_chain.clone();
        header
    }
}
