use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(get_health))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
    version: String,
}

async fn get_health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        name: app_state.config.app_name.clone(),
        version: app_state.config.app_version.clone(),
    })
}
