use keygate_core::CredentialError;
use sqlx::PgPool;

pub mod credentials;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

/// Maps a sqlx failure onto the credential port.
///
/// Store details are logged here and never forwarded to the verifier.
pub(crate) fn credential_error(err: sqlx::Error) -> CredentialError {
    match &err {
        sqlx::Error::RowNotFound => CredentialError::NotFound,
        _ => {
            tracing::error!(error = ?err, "Database error");
            CredentialError::Unavailable("Database operation failed".into())
        }
    }
}
