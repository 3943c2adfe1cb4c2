//! Authentication error types

use axum::http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use axum::response::{IntoResponse, Response};
use cova_db::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    DuplicateIdentity,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token has no subject")]
    MissingSubject,

    #[error("User not found")]
    UserNotFound,

    #[error("User account is inactive")]
    InactiveUser,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenIssue(String),

    #[error("Invalid token configuration: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl AuthError {
    /// Whether this failure collapses to the generic 401 response
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::MissingSubject
                | AuthError::UserNotFound
                | AuthError::InactiveUser
                | AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
        )
    }

    /// Internal reason label used for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::DuplicateIdentity => "duplicate_identity",
            AuthError::InvalidToken => "invalid_token",
            AuthError::ExpiredToken => "expired_token",
            AuthError::MissingSubject => "missing_subject",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InactiveUser => "inactive_user",
            AuthError::Forbidden => "forbidden",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::PasswordHash(_) => "password_hash",
            AuthError::TokenIssue(_) => "token_issue",
            AuthError::Config(_) => "config",
            AuthError::Store(_) => "store",
        }
    }

    /// Count this failure in `cova_auth_failures_total`
    pub fn record(&self) {
        metrics::counter!("cova_auth_failures_total", "reason" => self.reason()).increment(1);
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_unauthorized() {
            let body = axum::Json(json!({
                "detail": "Could not validate credentials"
            }));
            let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            return response;
        }

        let (status, message) = match &self {
            AuthError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Incorrect email or password")
            }
            AuthError::DuplicateIdentity => (StatusCode::BAD_REQUEST, "Email already registered"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Admins only"),
            AuthError::Store(DbError::Unavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Database not available")
            }
            AuthError::Store(DbError::InvalidRecord(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Invalid user record")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = axum::Json(json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}
