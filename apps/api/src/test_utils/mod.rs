//! Test utilities for HTTP-level and use-case tests.
//!
//! Tokens are minted here with `jsonwebtoken`; the service itself never issues them.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use keygate_core::{InMemoryCredentialStore, StoredCredentials, TokenVerifier, derive_signing_key};
use secrecy::ExposeSecret;
use serde_json::Value;

use crate::{
    adapters::http::app_state::AppState, application::use_cases::auth::AuthUseCases,
    infra::config::AppConfig,
};

/// Store with user 42 holding password hash `h1` and seed `s1`.
pub fn test_store() -> Arc<InMemoryCredentialStore> {
    Arc::new(InMemoryCredentialStore::with_users([(
        42,
        StoredCredentials::new("h1", "s1"),
    )]))
}

pub fn test_config() -> AppConfig {
    AppConfig {
        app_name: "keygate-test".to_string(),
        app_version: "0.0.0".to_string(),
        bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        database_url: "postgres://unused".to_string(),
        pg_pool_max: 1,
        token_leeway_secs: 0,
        token_issuer: None,
        token_audience: None,
        log_level: None,
        log_json_file: None,
    }
}

pub fn test_app_state(store: Arc<InMemoryCredentialStore>) -> AppState {
    let config = test_config();
    let verifier = TokenVerifier::with_options(store, config.verifier_options());

    AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(AuthUseCases::new(verifier)),
    }
}

/// Signs `claims` with HS256 under the key derived from `seed`,
/// `hashed_password` and the `iat` inside `claims`.
pub fn mint_token(claims: &Value, seed: &str, hashed_password: &str) -> String {
    let iat = claims["iat"].as_i64().expect("test claims carry an integer iat");
    let key = derive_signing_key(seed, hashed_password, iat);
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(key.expose_secret().as_bytes()),
    )
    .expect("test token encodes")
}
