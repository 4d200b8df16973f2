// crates/backend-lib/src/error.rs

//! Central error types + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::ValidationError;

/// Failure kinds inside the authentication core and its storage collaborator.
///
/// None of these cross the resolver boundary: callers of the resolver only see
/// "authenticated" or "rejected".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is not a Basic credential")]
    MalformedHeader,

    #[error("Basic credential is not valid base64 or UTF-8")]
    InvalidBase64,

    #[error("Decoded credential has no ':' separator")]
    MissingSeparator,

    #[error("No user matches the given identifier")]
    UnknownUser,

    #[error("Password does not match")]
    WrongPassword,

    #[error("Session not found")]
    SessionNotFound,

    #[error("User {0} already exists")]
    DuplicateRegistration(String),

    #[error("Invalid filter field: {0}")]
    InvalidFilterField(String),

    #[error("Reset token is invalid")]
    InvalidResetToken,
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(err) => match err {
                AuthError::DuplicateRegistration(_) | AuthError::InvalidFilterField(_) => {
                    StatusCode::BAD_REQUEST
                },
                AuthError::MalformedHeader
                | AuthError::InvalidBase64
                | AuthError::MissingSeparator
                | AuthError::UnknownUser
                | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
                AuthError::SessionNotFound | AuthError::InvalidResetToken => StatusCode::FORBIDDEN,
            },
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(AuthError::DuplicateRegistration(_)) => "USER_001",
            AppError::Auth(AuthError::InvalidFilterField(_)) => "USER_002",
            AppError::Auth(AuthError::SessionNotFound) => "SESSION_001",
            AppError::Auth(AuthError::InvalidResetToken) => "RESET_001",
            AppError::Auth(_) => "AUTH_001",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::Forbidden => "AUTH_003",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Config(_) => "CFG_001",
            AppError::Internal(_) => "INT_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Auth(AuthError::DuplicateRegistration(_)) => {
                "email already registered".to_string()
            },
            AppError::Auth(AuthError::InvalidFilterField(_)) => "Invalid request".to_string(),
            AppError::Auth(_) | AppError::InvalidCredentials => {
                "Authentication failed".to_string()
            },
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::Config(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "request failed");
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Auth(AuthError::DuplicateRegistration("a@b.io".to_string()));
        assert_eq!(
            err.to_string(),
            "Authentication error: User a@b.io already exists"
        );
        assert_eq!(AppError::Forbidden.to_string(), "Forbidden");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Auth(AuthError::DuplicateRegistration("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidFilterField("nope".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::WrongPassword).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Auth(AuthError::SessionNotFound).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidResetToken).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_error_codes() {
        assert_eq!(AppError::Forbidden.error_code(), "AUTH_003");
        assert_eq!(
            AppError::Auth(AuthError::UnknownUser).error_code(),
            "AUTH_001"
        );
        assert_eq!(
            AppError::Auth(AuthError::SessionNotFound).error_code(),
            "SESSION_001"
        );
        assert_eq!(AppError::Config("x".into()).error_code(), "CFG_001");
    }

    #[test]
    fn test_sanitized_message_does_not_name_the_failing_stage() {
        let wrong = AppError::Auth(AuthError::WrongPassword).sanitized_message();
        let unknown = AppError::Auth(AuthError::UnknownUser).sanitized_message();
        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn test_error_into_json_response() {
        let response = AppError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "AUTH_003");
    }
}
