//! Header and claim sets of the signed tokens, and their compact encoding.
pub mod jws;
pub mod jwt;
mod signing;

pub use self::signing::create_signed_jwt;
