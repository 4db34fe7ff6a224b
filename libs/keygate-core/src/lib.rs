//! Bearer token verification with per-user derived signing keys.
//!
//! Tokens are HMAC-signed JWTs whose secret is not static: it is derived from
//! the user's stored password hash and seed together with the token's `iat`.
//! Changing either secret invalidates every token issued before the change.
//!
//! This crate provides:
//! - A loosely typed claims model (`Claims`, `ClaimValue`) and an untrusted
//!   structural decoder (`peek`)
//! - The key derivation and signature check primitives
//! - The `CredentialLookup` port and an in-memory implementation
//! - `TokenVerifier`, which ties the above together

mod claims;
mod crypto;
mod errors;
mod lookup;
mod verifier;

pub use claims::{ClaimValue, Claims, TokenHeader, UnverifiedToken, peek};
pub use crypto::{HMAC_ALGORITHMS, check_algorithm, derive_signing_key, verify_signature};
pub use errors::{CredentialError, TokenError};
pub use lookup::{CredentialLookup, InMemoryCredentialStore, StoredCredentials};
pub use verifier::{TokenVerifier, VerifiedToken, VerifierOptions};
