use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use sha2::Sha256;

use crate::{Claims, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithms a token may declare. The header only selects among these.
pub const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Maps a header `alg` onto the HMAC allow-list.
///
/// Asymmetric algorithms, `none` and unknown names all fail with
/// `SignatureInvalid`.
pub fn check_algorithm(alg: &str) -> Result<Algorithm, TokenError> {
    match alg {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(TokenError::SignatureInvalid),
    }
}

/// Derives the per-token signing secret.
///
/// `hex(HMAC-SHA256(key = seed || hashed_password || issued_at, message = ""))`,
/// with `issued_at` rendered as plain decimal digits. The issuer performs the
/// same derivation, so the layout must not change.
///
/// # Returns
/// A 64-character lowercase hex string. Its ASCII bytes are the HMAC secret
/// used to check the token signature.
///
/// # Example
/// ```
/// use keygate_core::derive_signing_key;
/// use secrecy::ExposeSecret;
///
/// let key = derive_signing_key("s1", "h1", 1700000000);
/// assert_eq!(key.expose_secret().len(), 64);
/// ```
pub fn derive_signing_key(seed: &str, hashed_password: &str, issued_at: i64) -> SecretString {
    let material = SecretString::new(format!("{seed}{hashed_password}{issued_at}").into());
    let mac = HmacSha256::new_from_slice(material.expose_secret().as_bytes())
        .expect("HMAC accepts any key length");
    SecretString::new(hex::encode(mac.finalize().into_bytes()).into())
}

/// Checks the token signature against `secret` and returns the claims.
///
/// Only the signature and the HMAC algorithm family are checked here;
/// registered claims (`exp`, `nbf`, `iss`, `aud`) are left to the caller.
pub fn verify_signature(token: &str, secret: &SecretString) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;

    let token_data = decode::<Map<String, Value>>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => TokenError::SignatureInvalid,
        _ => TokenError::MalformedToken(e.to_string()),
    })?;

    Ok(Claims::from(token_data.claims))
}
