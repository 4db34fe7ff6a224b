use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::CredentialError;

/// Read-only access to the secret material a user's tokens are keyed on.
///
/// Implementations may be backed by any store. Each verification performs
/// exactly one call to each method; nothing is cached on this side.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn get_hashed_password(&self, user_id: i64) -> Result<SecretString, CredentialError>;
    async fn get_seed(&self, user_id: i64) -> Result<SecretString, CredentialError>;
}

/// A user's stored password hash and seed.
pub struct StoredCredentials {
    pub hashed_password: SecretString,
    pub seed: SecretString,
}

impl StoredCredentials {
    pub fn new(hashed_password: impl Into<String>, seed: impl Into<String>) -> Self {
        let hashed_password: String = hashed_password.into();
        let seed: String = seed.into();
        Self {
            hashed_password: SecretString::new(hashed_password.into()),
            seed: SecretString::new(seed.into()),
        }
    }
}

/// In-memory [`CredentialLookup`] for tests and local development.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<i64, StoredCredentials>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = (i64, StoredCredentials)>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    /// Adds or replaces a user's credentials (e.g. after a password change).
    pub fn insert(&self, user_id: i64, credentials: StoredCredentials) {
        self.users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id, credentials);
    }

    pub fn remove(&self, user_id: i64) -> bool {
        self.users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&user_id)
            .is_some()
    }

    fn read_with<F>(&self, user_id: i64, field: F) -> Result<SecretString, CredentialError>
    where
        F: Fn(&StoredCredentials) -> &SecretString,
    {
        let users = self
            .users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let credentials = users.get(&user_id).ok_or(CredentialError::NotFound)?;
        Ok(SecretString::new(field(credentials).expose_secret().into()))
    }
}

#[async_trait]
impl CredentialLookup for InMemoryCredentialStore {
    async fn get_hashed_password(&self, user_id: i64) -> Result<SecretString, CredentialError> {
        self.read_with(user_id, |c| &c.hashed_password)
    }

    async fn get_seed(&self, user_id: i64) -> Result<SecretString, CredentialError> {
        self.read_with(user_id, |c| &c.seed)
    }
}
