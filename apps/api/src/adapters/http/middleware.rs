use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{adapters::http::app_state::AppState, app_error::AppError};

/// Rejects requests without a valid bearer token and attaches the
/// authenticated user to the request extensions.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer)
        .map(str::to_owned)
        .ok_or(AppError::Unauthorized)?;

    let user = app_state.auth_use_cases.authenticate(&token).await?;
    tracing::debug!(user_id = user.user_id, "Request authenticated");

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; an empty token yields `None`.
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
