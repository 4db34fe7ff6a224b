use axum::{Extension, Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState, application::use_cases::auth::AuthenticatedUser,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_root))
        .route("/me", get(get_me))
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn get_root() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Hello World",
    })
}

async fn get_me(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
    Json(user)
}
