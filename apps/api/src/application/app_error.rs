use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Any authentication failure. Carries no detail, so the response cannot
    /// tell an unknown user from a bad signature.
    #[error("Unauthorized")]
    Unauthorized,
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    Unauthorized,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
