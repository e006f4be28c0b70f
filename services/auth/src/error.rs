use std::fmt;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use portier_auth_types::token::TokenError;

/// Identity attribute that must be unique across users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    MobileNumber,
    Username,
    Email,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MobileNumber => "mobile number",
            Self::Username => "username",
            Self::Email => "email",
        })
    }
}

/// Auth service domain error variants.
///
/// Collaborator errors travel through the usecases untouched, so a store
/// returning `Internal(anyhow!("user not found"))` surfaces with exactly that
/// message.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Unknown identifier or wrong password. Deliberately does not say which.
    #[error("user not found")]
    CredentialNotFound,
    #[error("{0} already exists")]
    DuplicateIdentity(IdentityField),
    #[error("token issuance failed")]
    Issuance(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    ExpiredToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("otp requested too soon, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("no active otp challenge")]
    NoActiveChallenge,
    #[error("otp expired")]
    CodeExpired,
    #[error("otp mismatch")]
    CodeMismatch,
    #[error("request canceled")]
    Canceled,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CredentialNotFound => "CREDENTIAL_NOT_FOUND",
            Self::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
            Self::Issuance(_) => "ISSUANCE_ERROR",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::NoActiveChallenge => "NO_ACTIVE_CHALLENGE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::CodeMismatch => "CODE_MISMATCH",
            Self::Canceled => "CANCELED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::CredentialNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateIdentity(_) => StatusCode::CONFLICT,
            Self::ExpiredToken
            | Self::InvalidToken
            | Self::NoActiveChallenge
            | Self::CodeExpired
            | Self::CodeMismatch => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Canceled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Issuance(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for AuthServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::Invalid => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors; the trace layer already records them.
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
                "internal error".to_owned()
            }
            Self::Issuance(e) => {
                tracing::error!(error = %e, kind = "ISSUANCE_ERROR", "token signing failed");
                self.to_string()
            }
            _ => self.to_string(),
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        let mut resp = (status, axum::Json(body)).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            resp.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        resp
    }
}
