use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::auth::AuthUseCases,
    infra::{config::AppConfig, postgres_persistence},
};
use keygate_core::{CredentialLookup, TokenVerifier};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.pg_pool_max).await?);

    let verifier = TokenVerifier::with_options(
        postgres_arc as Arc<dyn CredentialLookup>,
        config.verifier_options(),
    );

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(AuthUseCases::new(verifier)),
    })
}

/// Filter used when `RUST_LOG` is unset. `LOG_LEVEL` applies one level to
/// every target this service logs from.
fn default_directives(log_level: Option<&str>) -> String {
    match log_level {
        Some(level) => format!("keygate_api={level},keygate_core={level},tower_http={level}"),
        None => "keygate_api=debug,keygate_core=info,tower_http=debug".to_string(),
    }
}

pub fn init_tracing(log_level: Option<&str>, json_log_path: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when a path is configured
    let json_layer = json_log_path.and_then(|path| match File::create(path) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create log file {path}: {err}");
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
