use thiserror::Error;

/// Token verification errors.
///
/// Every variant is terminal for a single verification attempt. Callers at
/// the HTTP boundary should collapse all of them into one "unauthorized"
/// outcome and keep the detail for server-side logs.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Missing or non-numeric claim: {0}")]
    MissingClaim(&'static str),

    /// The store could not hand out secret material. The message is the same
    /// whether the user is unknown or the store is down; the cause is only
    /// reachable through `source()`.
    #[error("Credential lookup failed")]
    CredentialLookupFailed(#[source] CredentialError),

    #[error("Invalid signature")]
    SignatureInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid claim: {0}")]
    InvalidClaim(&'static str),
}

impl TokenError {
    /// Stable code used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::MissingClaim(_) => "missing_claim",
            Self::CredentialLookupFailed(_) => "credential_lookup_failed",
            Self::SignatureInvalid => "signature_invalid",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaim(_) => "invalid_claim",
        }
    }
}

/// Errors surfaced by a [`CredentialLookup`](crate::CredentialLookup) backend.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No credentials stored for user")]
    NotFound,

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}
