use async_trait::async_trait;
use keygate_core::{CredentialError, CredentialLookup};
use secrecy::SecretString;

use crate::adapters::persistence::{PostgresPersistence, credential_error};

#[async_trait]
impl CredentialLookup for PostgresPersistence {
    async fn get_hashed_password(&self, user_id: i64) -> Result<SecretString, CredentialError> {
        let password = sqlx::query_scalar::<_, String>(r#"SELECT password FROM "Users" WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(credential_error)?;

        password
            .map(|p| SecretString::new(p.into()))
            .ok_or(CredentialError::NotFound)
    }

    async fn get_seed(&self, user_id: i64) -> Result<SecretString, CredentialError> {
        let seed = sqlx::query_scalar::<_, String>(r#"SELECT user_seed FROM "UserSeed" WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(credential_error)?;

        seed.map(|s| SecretString::new(s.into()))
            .ok_or(CredentialError::NotFound)
    }
}
