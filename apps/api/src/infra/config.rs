use std::net::{Ipv4Addr, SocketAddr};

use env_helpers::{get_env, get_env_default};
use keygate_core::VerifierOptions;

pub struct AppConfig {
    pub app_name: String,
    pub app_version: String,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub pg_pool_max: u32,
    /// Clock skew tolerance applied to `exp`/`nbf`.
    pub token_leeway_secs: u64,
    /// Expected `iss`; unset means the claim is not checked.
    pub token_issuer: Option<String>,
    /// Expected `aud`; unset means the claim is not checked.
    pub token_audience: Option<String>,
    /// Level for this service's targets when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// When set, JSON logs are also written to this file.
    pub log_json_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let app_name: String = get_env_default("APP_NAME", "keygate".to_string());
        let app_version: String =
            get_env_default("APP_VERSION", env!("CARGO_PKG_VERSION").to_string());
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
        );
        let database_url: String = get_env("DATABASE_URL");
        let pg_pool_max: u32 = get_env_default("PG_POOL_MAX", 5);
        let token_leeway_secs: u64 = get_env_default("TOKEN_LEEWAY_SECS", 0);
        let token_issuer = optional_env("TOKEN_ISSUER");
        let token_audience = optional_env("TOKEN_AUDIENCE");
        let log_level = optional_env("LOG_LEVEL");
        let log_json_file = optional_env("LOG_JSON_FILE");

        Self {
            app_name,
            app_version,
            bind_addr,
            database_url,
            pg_pool_max,
            token_leeway_secs,
            token_issuer,
            token_audience,
            log_level,
            log_json_file,
        }
    }

    pub fn verifier_options(&self) -> VerifierOptions {
        VerifierOptions {
            leeway_seconds: self.token_leeway_secs,
            issuer: self.token_issuer.clone(),
            audience: self.token_audience.clone(),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
