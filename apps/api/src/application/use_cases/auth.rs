use keygate_core::{TokenError, TokenVerifier};
use serde::Serialize;
use tracing::instrument;

use crate::app_error::{AppError, AppResult};

/// Identity attached to a request once its bearer token has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub issued_at: i64,
}

#[derive(Clone)]
pub struct AuthUseCases {
    verifier: TokenVerifier,
}

impl AuthUseCases {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Verifies a raw bearer token.
    ///
    /// Every verification failure becomes `AppError::Unauthorized`; the
    /// specific reason is only logged.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedUser> {
        match self.verifier.verify(token).await {
            Ok(verified) => Ok(AuthenticatedUser {
                user_id: verified.user_id,
                issued_at: verified.issued_at,
            }),
            Err(err) => {
                log_rejection(&err);
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn log_rejection(err: &TokenError) {
    match err {
        TokenError::CredentialLookupFailed(cause) => {
            tracing::warn!(kind = err.kind(), cause = %cause, "Token rejected");
        }
        _ => tracing::info!(kind = err.kind(), error = %err, "Token rejected"),
    }
}
