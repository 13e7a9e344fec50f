use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::{rngs::ThreadRng, CryptoRng, RngCore};

pub fn generate_nonce() -> String {
    URL_SAFE_NO_PAD.encode(get_random_values::<_, 16>(&mut ThreadRng::default()))
}

pub fn get_random_values<R, const LEN: usize>(rng: &mut R) -> [u8; LEN]
where
    R: RngCore + CryptoRng,
{
    let mut bytes = [0u8; LEN];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// `(iat, exp)` for a token valid for `lifetime` seconds from now.
pub fn issued_and_expiry(lifetime: i64) -> (i64, i64) {
    let iat = Utc::now().timestamp();
    (iat, iat + lifetime)
}
