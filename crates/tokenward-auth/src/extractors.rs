// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::context::{Identity, SecurityContext};
use crate::error::{AuthError, ErrorBody};

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// This is the access-control rule: handlers that take `Auth` reject an
/// unauthenticated context with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(identity): Auth) -> impl IntoResponse {
///     format!("Hello, {}", identity.subject_id)
/// }
/// ```
pub struct Auth(pub Identity);

/// Rejection for [`Auth`].
#[derive(Debug)]
pub struct AuthRequired;

impl IntoResponse for AuthRequired {
    fn into_response(self) -> Response {
        (
            axum::http::StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Authentication required")),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(|ctx| ctx.identity.clone())
            .map(Auth)
            .ok_or(AuthRequired)
    }
}

// =============================================================================
// Optional Auth Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<SecurityContext>()
            .and_then(|ctx| ctx.identity.clone());
        Ok(OptionalAuth(identity))
    }
}

// =============================================================================
// Context Extractor
// =============================================================================

/// Extracts the whole security context; anonymous if none was installed.
pub struct CurrentContext(pub SecurityContext);

impl<S> FromRequestParts<S> for CurrentContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default();
        Ok(CurrentContext(ctx))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// JSON body whose rejection is an [`AuthError::BadRequest`].
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AuthError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}
