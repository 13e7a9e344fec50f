//! End-to-end run of the backend side of an authorization code flow: the
//! wallet registers for its redirect, the "authorization server" redirects
//! back through the app-link handler, and the wallet authenticates itself
//! and its keys with tokens issued by the backend.
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jose_jwk::{crypto, Jwk, Key, Parameters};
use p256::SecretKey;
use rand::rngs::ThreadRng;
use serde_json::{json, Value};
use vci_test_backend::broker::Error;
use vci_test_backend::{
    AttestationIssuer, AttestedKey, CallbackParams, ClientContext, ClientKeyMaterial, Config,
    FileStore, KeyHandle, RedirectBroker,
};

fn secret_jwk(kid: &str) -> Jwk {
    let secret_key = SecretKey::random(&mut ThreadRng::default());
    Jwk {
        key: Key::from(&crypto::Key::P256(crypto::Kind::Secret(secret_key))),
        prm: Parameters { kid: Some(kid.into()), ..Default::default() },
    }
}

fn claims(jwt: &str) -> Value {
    let payload = jwt.split('.').nth(1).expect("missing payload");
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).expect("invalid base64"))
        .expect("invalid json")
}

fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    let keys = ClientKeyMaterial {
        client_assertion: KeyHandle::new(secret_jwk("client-01"), "wallet-client"),
        attestation_issuer: KeyHandle::new(secret_jwk("issuer-01"), "https://attestation.example")
            .with_certificate_chain(vec![String::from("MIIBleaf")]),
    };
    let config = json!({
        "preferences": {
            "client_id": "wallet-client",
            "redirect_base_url": "app://landing/",
            "accepted_locales": ["en-US"]
        },
        "keys": keys,
    });
    let path = dir.join("backend.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).expect("failed to serialize"))
        .expect("failed to write config");
    path
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn authorization_code_flow() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = Config::load(&FileStore::new(write_config(dir.path())))
        .await
        .expect("failed to load config");
    let context = Arc::new(ClientContext::try_from(config).expect("invalid key material"));
    assert_eq!(context.preferences().accepted_locales(), ["en-US"]);

    let broker = RedirectBroker::new();
    let issuer = AttestationIssuer::new(Arc::clone(&context));

    //--------------------------------------------------------------------------
    // Start the flow: register for the redirect before it can arrive.
    //--------------------------------------------------------------------------
    let (state, pending) = broker.register_new().expect("failed to register");

    // The hosting environment receives the app link some time later.
    let redirect =
        format!("{}?code=auth-code&state={state}", context.preferences().redirect_base_url());
    let handler = tokio::spawn({
        let broker = broker.clone();
        let redirect = redirect.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            // an unrelated redirect must not disturb the flow
            assert!(!broker.deliver("app://landing/?code=other&state=unknown"));
            broker.deliver(redirect)
        }
    });

    let url = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("redirect never arrived")
        .expect("waiter abandoned");
    assert!(handler.await.expect("handler panicked"));
    assert_eq!(url, redirect);
    let params = CallbackParams::from_url(&url).expect("invalid callback");
    assert_eq!(params.code.as_deref(), Some("auth-code"));
    assert_eq!(params.state.as_deref(), Some(state.as_str()));
    assert_eq!(broker.pending_count(), 0);

    //--------------------------------------------------------------------------
    // Authenticate the client and its keys.
    //--------------------------------------------------------------------------
    let assertion = issuer
        .create_client_assertion_jwt("https://issuer.example")
        .await
        .expect("failed to create client assertion");
    let assertion = claims(&assertion);
    assert_eq!(assertion["iss"], "wallet-client");
    assert_eq!(assertion["aud"], "https://issuer.example");

    let device_key = secret_jwk("device-01");
    let wallet_attestation = issuer
        .create_wallet_attestation_jwt(&device_key)
        .await
        .expect("failed to create wallet attestation");
    let wallet_attestation = claims(&wallet_attestation);
    assert_eq!(wallet_attestation["iss"], "https://attestation.example");
    assert_eq!(wallet_attestation["sub"], "wallet-client");
    assert!(wallet_attestation["cnf"]["jwk"].get("d").is_none());

    let key_attestation = issuer
        .create_key_attestation_jwt(
            &[AttestedKey::new("device-01", device_key)],
            "c_nonce-1",
            None,
            Some(vec![String::from("iso_18045_moderate")]),
        )
        .await
        .expect("failed to create key attestation");
    let key_attestation = claims(&key_attestation);
    assert_eq!(key_attestation["nonce"], "c_nonce-1");
    assert_eq!(key_attestation["attested_keys"][0]["kid"], "device-01");
    assert_eq!(key_attestation["key_storage"], json!(["iso_18045_moderate"]));
}

#[tokio::test]
async fn abandoned_flow_leaves_no_waiter() {
    let broker = RedirectBroker::new();
    let result = broker.register_wait_timeout("abc123", Duration::from_millis(10)).await;
    assert!(matches!(result, Err(Error::Timeout(state)) if state == "abc123"));
    assert_eq!(broker.pending_count(), 0);
    // the redirect arriving late is dropped
    assert!(!broker.deliver("app://landing/?state=abc123&code=late"));
}
