// https://datatracker.ietf.org/doc/html/rfc7523#section-2.2
pub const CLIENT_ASSERTION_TYPE_JWT_BEARER: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

// https://datatracker.ietf.org/doc/html/draft-ietf-oauth-attestation-based-client-auth
pub const JWT_HEADER_TYP_WALLET_ATTESTATION: &str = "oauth-client-attestation+jwt";
// https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html#appendix-D.1
pub const JWT_HEADER_TYP_KEY_ATTESTATION: &str = "key-attestation+jwt";

// "iat" of a client assertion must be less than one minute old
pub const CLIENT_ASSERTION_LIFETIME: i64 = 60;
pub const ATTESTATION_LIFETIME: i64 = 300;
