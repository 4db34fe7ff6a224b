use std::sync::Arc;

use secrecy::ExposeSecret;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::{
    ClaimValue, Claims, CredentialLookup, TokenError,
    claims::peek,
    crypto::{check_algorithm, derive_signing_key, verify_signature},
};

/// Policy knobs applied after the signature check.
#[derive(Debug, Clone, Default)]
pub struct VerifierOptions {
    /// Clock skew tolerance in seconds for `exp` and `nbf`.
    pub leeway_seconds: u64,
    /// When set, `iss` must equal this value.
    pub issuer: Option<String>,
    /// When set, `aud` must equal (or, for an array, contain) this value.
    pub audience: Option<String>,
}

/// Result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: i64,
    pub issued_at: i64,
    pub claims: Claims,
}

/// Verifies bearer tokens signed with a key derived from the user's
/// password hash, seed and the token's own `iat`.
///
/// Holds no mutable state; clone it freely and share it across tasks.
#[derive(Clone)]
pub struct TokenVerifier {
    lookup: Arc<dyn CredentialLookup>,
    options: VerifierOptions,
}

impl TokenVerifier {
    pub fn new(lookup: Arc<dyn CredentialLookup>) -> Self {
        Self::with_options(lookup, VerifierOptions::default())
    }

    pub fn with_options(lookup: Arc<dyn CredentialLookup>, options: VerifierOptions) -> Self {
        Self { lookup, options }
    }

    /// Verifies `token` against the current time.
    ///
    /// `token` must already be stripped of any `Bearer ` scheme prefix.
    pub async fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc().unix_timestamp())
            .await
    }

    /// Verifies `token` as of `now` (unix seconds).
    ///
    /// Runs in two phases. The first decodes the token without trusting it,
    /// only to learn which user's secrets to fetch and which `iat` to derive
    /// with. The second checks the signature under the derived key; claims
    /// are read from its output only.
    #[instrument(skip_all, fields(user_id = tracing::field::Empty))]
    pub async fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedToken, TokenError> {
        let unverified = peek(token)?;
        check_algorithm(&unverified.header.algorithm)?;

        let user_id = unverified.claims.subject()?;
        let issued_at = unverified.claims.issued_at()?;
        tracing::Span::current().record("user_id", user_id);

        let hashed_password = self
            .lookup
            .get_hashed_password(user_id)
            .await
            .map_err(TokenError::CredentialLookupFailed)?;
        let seed = self
            .lookup
            .get_seed(user_id)
            .await
            .map_err(TokenError::CredentialLookupFailed)?;

        let claims = {
            let key = derive_signing_key(
                seed.expose_secret(),
                hashed_password.expose_secret(),
                issued_at,
            );
            verify_signature(token, &key)?
        };

        check_registered_claims(&claims, now, &self.options)?;
        debug!("token verified");

        Ok(VerifiedToken {
            user_id: claims.subject()?,
            issued_at: claims.issued_at()?,
            claims,
        })
    }
}

fn check_registered_claims(
    claims: &Claims,
    now: i64,
    options: &VerifierOptions,
) -> Result<(), TokenError> {
    let leeway = i64::try_from(options.leeway_seconds).unwrap_or(i64::MAX);

    if let Some(exp) = claims.get("exp") {
        let exp = exp
            .as_truncated_i64()
            .ok_or(TokenError::InvalidClaim("exp"))?;
        if exp.saturating_add(leeway) < now {
            return Err(TokenError::TokenExpired);
        }
    }

    if let Some(nbf) = claims.get("nbf") {
        let nbf = nbf
            .as_truncated_i64()
            .ok_or(TokenError::InvalidClaim("nbf"))?;
        if nbf.saturating_sub(leeway) > now {
            return Err(TokenError::InvalidClaim("nbf"));
        }
    }

    if let Some(expected) = &options.issuer {
        let matches = claims.get("iss").and_then(ClaimValue::as_str) == Some(expected.as_str());
        if !matches {
            return Err(TokenError::InvalidClaim("iss"));
        }
    }

    if let Some(expected) = &options.audience {
        let audience = claims.get("aud");
        let matches = match audience.and_then(ClaimValue::as_array) {
            Some(auds) => auds
                .iter()
                .any(|aud| aud.as_str() == Some(expected.as_str())),
            None => audience.and_then(ClaimValue::as_str) == Some(expected.as_str()),
        };
        if !matches {
            return Err(TokenError::InvalidClaim("aud"));
        }
    }

    Ok(())
}
