// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication error types and HTTP mapping.
//!
//! Every failure the token lifecycle can produce is a variant of [`AuthError`].
//! Handlers and middleware return it directly; the [`IntoResponse`] impl turns it
//! into a status code plus a body carrying a single human-readable `message`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// AuthError
// =============================================================================

/// Authentication and token lifecycle errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login rejected; no token was issued.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is malformed, has a bad signature, or is the wrong kind.
    #[error("Invalid token: {reason}")]
    TokenInvalid {
        /// What was wrong with the token (for logs only).
        reason: String,
    },

    /// Token expiration is not in the future.
    #[error("Token expired")]
    TokenExpired,

    /// The directory reports the account as disabled.
    #[error("Principal {subject_id} is disabled")]
    PrincipalDisabled {
        /// The disabled subject.
        subject_id: i64,
    },

    /// The directory has no record of the subject.
    #[error("Principal {subject_id} not found")]
    PrincipalNotFound {
        /// The unknown subject.
        subject_id: i64,
    },

    /// The credential directory could not answer in time.
    #[error("Credential directory unavailable: {reason}")]
    DirectoryUnavailable {
        /// Underlying cause.
        reason: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    RequestTimeout,

    /// Malformed request payload.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Internal error (key setup, encoding failures).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl AuthError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a token invalid error.
    pub fn token_invalid(reason: impl Into<String>) -> Self {
        Self::TokenInvalid {
            reason: reason.into(),
        }
    }

    /// Creates a directory unavailable error.
    pub fn directory_unavailable(reason: impl Into<String>) -> Self {
        Self::DirectoryUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid { .. }
            | AuthError::TokenExpired
            | AuthError::PrincipalNotFound { .. } => StatusCode::UNAUTHORIZED,
            AuthError::PrincipalDisabled { .. } => StatusCode::FORBIDDEN,
            AuthError::DirectoryUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AuthError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::TokenInvalid { .. } => "TOKEN_INVALID",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::PrincipalDisabled { .. } => "PRINCIPAL_DISABLED",
            AuthError::PrincipalNotFound { .. } => "PRINCIPAL_NOT_FOUND",
            AuthError::DirectoryUnavailable { .. } => "DIRECTORY_UNAVAILABLE",
            AuthError::RequestTimeout => "REQUEST_TIMEOUT",
            AuthError::BadRequest { .. } => "BAD_REQUEST",
            AuthError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a message that is safe to show to callers.
    ///
    /// Never includes claim contents or internal causes.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid username or password".to_string(),
            AuthError::TokenInvalid { .. } => "Invalid token".to_string(),
            AuthError::TokenExpired => "Token has expired".to_string(),
            AuthError::PrincipalDisabled { .. } => "Account is disabled".to_string(),
            AuthError::PrincipalNotFound { .. } => "Account no longer exists".to_string(),
            AuthError::DirectoryUnavailable { .. } => {
                "Authentication service temporarily unavailable".to_string()
            }
            AuthError::RequestTimeout => "Request timed out".to_string(),
            AuthError::BadRequest { message } => message.clone(),
            AuthError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if the caller may retry the same operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::DirectoryUnavailable { .. } | AuthError::RequestTimeout
        )
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::Internal { .. } | AuthError::DirectoryUnavailable { .. }
        )
    }

    /// Returns `true` for failures that only mean "this token cannot be used".
    pub fn is_token_rejection(&self) -> bool {
        matches!(self, AuthError::TokenInvalid { .. } | AuthError::TokenExpired)
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorBody {
            message: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    /// Creates a new error body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::token_invalid("bad signature").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::PrincipalDisabled { subject_id: 1 }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::directory_unavailable("timeout").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::RequestTimeout.status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            AuthError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = AuthError::token_invalid("signature mismatch for sub=42");
        assert_eq!(err.user_message(), "Invalid token");

        let err = AuthError::internal("encoding key rejected");
        assert!(!err.user_message().contains("encoding"));
    }

    #[test]
    fn test_retryable() {
        assert!(AuthError::directory_unavailable("timeout").is_retryable());
        assert!(!AuthError::TokenExpired.is_retryable());
        assert!(!AuthError::InvalidCredentials.is_retryable());
    }

    #[tokio::test]
    async fn test_response_body_has_single_message_field() {
        let response = AuthError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 1);
        assert_eq!(object["message"], "Token has expired");
    }
}
