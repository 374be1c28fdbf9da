use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Codes carried back to the form page as `?error=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Missing,
    Invalid,
    Password,
    Exists,
    Unauthorized,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Missing => "missing",
            ErrorCode::Invalid => "invalid",
            ErrorCode::Password => "password",
            ErrorCode::Exists => "exists",
            ErrorCode::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a form action that did not succeed.
///
/// `Rejected` is recovered locally as a redirect; `App` is a server fault.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("rejected: {0}")]
    Rejected(ErrorCode),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<rusqlite::Error> for ActionError {
    fn from(e: rusqlite::Error) -> Self {
        ActionError::App(AppError::Database(e))
    }
}

impl From<ErrorCode> for ActionError {
    fn from(code: ErrorCode) -> Self {
        ActionError::Rejected(code)
    }
}

impl ActionError {
    /// Turns a rejection into a redirect back to `path`; server faults pass through.
    pub fn redirect_to(self, path: &str) -> AppResult<Response> {
        match self {
            ActionError::Rejected(code) => Ok(redirect_with_error(path, code).into_response()),
            ActionError::App(e) => Err(e),
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

pub fn redirect_with_error(path: &str, code: ErrorCode) -> Redirect {
    Redirect::to(&format!("{path}?error={code}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn rejection_redirects_with_code() {
        let response = ActionError::Rejected(ErrorCode::Exists)
            .redirect_to("/register")
            .expect("rejections are recovered");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/register?error=exists");
    }

    #[test]
    fn server_faults_are_not_redirected() {
        let err = ActionError::App(AppError::Internal("boom".into()));
        assert!(matches!(err.redirect_to("/register"), Err(AppError::Internal(_))));
    }
}
