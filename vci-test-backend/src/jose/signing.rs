use super::jws::RegisteredHeader;
use super::jwt::Claims;
use crate::signer::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ecdsa::{
    hazmat::{DigestPrimitive, SignPrimitive},
    signature::Signer,
    Signature, SignatureSize, SigningKey,
};
use elliptic_curve::{
    generic_array::ArrayLength, ops::Invert, subtle::CtOption, CurveArithmetic, PrimeCurve, Scalar,
};

/// Produces the compact serialization `header.payload.signature`.
pub fn create_signed_jwt<C>(
    key: SigningKey<C>,
    header: RegisteredHeader,
    claims: Claims,
) -> Result<String>
where
    C: PrimeCurve + CurveArithmetic + DigestPrimitive,
    Scalar<C>: Invert<Output = CtOption<Scalar<C>>> + SignPrimitive<C>,
    SignatureSize<C>: ArrayLength<u8>,
{
    let header = URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims)?);
    let signature: Signature<_> = key.try_sign(format!("{header}.{payload}").as_bytes())?;
    Ok(format!("{header}.{payload}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes())))
}
