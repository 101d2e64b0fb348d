// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authorization middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::Response,
};
use tower::{Layer, Service};

use crate::context::{Identity, SecurityContext};
use crate::token::TokenService;

const BEARER_SCHEME: &str = "Bearer";

// =============================================================================
// AuthorizationLayer
// =============================================================================

/// Layer that turns a bearer token into a [`SecurityContext`].
///
/// Every request leaves this layer with a context in its extensions. A
/// missing, malformed or expired token yields an anonymous context; the
/// request is forwarded either way and rejection is left to the handlers.
#[derive(Clone)]
pub struct AuthorizationLayer {
    tokens: TokenService,
}

impl AuthorizationLayer {
    /// Creates a new authorization layer.
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizationMiddleware {
            inner,
            tokens: self.tokens.clone(),
        }
    }
}

// =============================================================================
// AuthorizationMiddleware
// =============================================================================

/// Middleware installing the per-request security context.
#[derive(Clone)]
pub struct AuthorizationMiddleware<S> {
    inner: S,
    tokens: TokenService,
}

impl<S> AuthorizationMiddleware<S> {
    fn resolve(&self, req: &Request<Body>) -> SecurityContext {
        let ctx = match extract_bearer_token(req) {
            Some(token) => match self.tokens.validate_access(token) {
                Ok(principal) => SecurityContext::authenticated(Identity::from(principal)),
                Err(e) => {
                    tracing::debug!(error_code = e.error_code(), "Bearer token not accepted");
                    SecurityContext::anonymous()
                }
            },
            None => SecurityContext::anonymous(),
        };

        match req.extensions().get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => ctx.with_client_ip(addr.ip()),
            None => ctx,
        }
    }
}

impl<S> Service<Request<Body>> for AuthorizationMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let ctx = self.resolve(&req);

        tracing::trace!(
            request_id = %ctx.request_id,
            subject_id = ?ctx.subject_id(),
            "Security context installed"
        );
        req.extensions_mut().insert(ctx);

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
///
/// The scheme name is matched case-insensitively.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    Some(token.trim()).filter(|token| !token.is_empty())
}

// =============================================================================
// Tests
// =============================================================================
