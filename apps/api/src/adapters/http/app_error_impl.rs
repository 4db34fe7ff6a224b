use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => {
                tracing::debug!("Request unauthorized");
                error_resp(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode) -> Response {
    let body = serde_json::json!({ "code": code.as_str() });
    (status, Json(body)).into_response()
}
