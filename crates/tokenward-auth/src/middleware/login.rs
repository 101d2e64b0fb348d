// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login interception middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::cookie::{CookieConfig, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
use crate::directory::AuthenticationManager;
use crate::error::{AuthError, AuthResult};
use crate::principal::Credentials;
use crate::token::TokenService;

/// Default login path.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default limit on the login request body.
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

// =============================================================================
// LoginLayer
// =============================================================================

/// Layer that answers `POST {login_path}` itself.
///
/// Credentials are checked by the [`AuthenticationManager`]. On success the
/// response is `200` with an empty body and the token pair in two cookies.
/// Every other request goes to the inner service untouched.
#[derive(Clone)]
pub struct LoginLayer {
    state: Arc<LoginState>,
}

#[derive(Clone)]
struct LoginState {
    tokens: TokenService,
    authenticator: Arc<dyn AuthenticationManager>,
    cookies: CookieConfig,
    login_path: String,
    max_body_size: usize,
}

impl LoginLayer {
    /// Creates a login layer on the default path.
    pub fn new(tokens: TokenService, authenticator: Arc<dyn AuthenticationManager>) -> Self {
        Self {
            state: Arc::new(LoginState {
                tokens,
                authenticator,
                cookies: CookieConfig::default(),
                login_path: DEFAULT_LOGIN_PATH.to_string(),
                max_body_size: DEFAULT_MAX_BODY_SIZE,
            }),
        }
    }

    /// Sets the intercepted path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.state_mut().login_path = path.into();
        self
    }

    /// Sets the cookie attributes.
    pub fn with_cookies(mut self, cookies: CookieConfig) -> Self {
        self.state_mut().cookies = cookies;
        self
    }

    /// Sets the maximum accepted body size.
    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.state_mut().max_body_size = limit;
        self
    }

    /// Returns the intercepted path.
    pub fn login_path(&self) -> &str {
        &self.state.login_path
    }

    fn state_mut(&mut self) -> &mut LoginState {
        Arc::make_mut(&mut self.state)
    }
}

impl<S> Layer<S> for LoginLayer {
    type Service = LoginMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoginMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

// =============================================================================
// LoginMiddleware
// =============================================================================

/// Middleware implementing the login exchange.
#[derive(Clone)]
pub struct LoginMiddleware<S> {
    inner: S,
    state: Arc<LoginState>,
}

impl<S> Service<Request<Body>> for LoginMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if req.method() != Method::POST || req.uri().path() != self.state.login_path {
            return Box::pin(self.inner.call(req));
        }

        let state = self.state.clone();
        Box::pin(async move {
            Ok(state
                .login(req)
                .await
                .unwrap_or_else(IntoResponse::into_response))
        })
    }
}

impl LoginState {
    async fn login(&self, req: Request<Body>) -> AuthResult<Response> {
        let bytes = axum::body::to_bytes(req.into_body(), self.max_body_size)
            .await
            .map_err(|e| AuthError::bad_request(format!("Unreadable login body: {}", e)))?;
        let credentials: Credentials = serde_json::from_slice(&bytes)?;

        let principal = self
            .authenticator
            .authenticate(&credentials)
            .await
            .inspect_err(|e| {
                tracing::info!(
                    username = %credentials.username,
                    error_code = e.error_code(),
                    "Login rejected"
                )
            })?;

        let pair = self.tokens.issue(&principal)?;

        let mut response = StatusCode::OK.into_response();
        let headers = response.headers_mut();
        headers.append(
            header::SET_COOKIE,
            self.cookies.build(ACCESS_COOKIE_NAME, &pair.access_token)?,
        );
        headers.append(
            header::SET_COOKIE,
            self.cookies.build(REFRESH_COOKIE_NAME, &pair.refresh_token)?,
        );

        tracing::info!(subject_id = principal.id, "Login succeeded");
        Ok(response)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use tower::ServiceExt;

    use super::*;
    use crate::directory::InMemoryAccounts;
    use crate::token::TokenConfig;

    fn layer() -> (LoginLayer, TokenService) {
        let accounts = Arc::new(InMemoryAccounts::new());
        accounts.add_user(42, "alice", "wonderland", "USER").unwrap();
        let tokens = TokenService::new(
            TokenConfig::new("login-test-secret-that-is-long-enough"),
            accounts.clone(),
        )
        .unwrap();
        (LoginLayer::new(tokens.clone(), accounts), tokens)
    }

    async fn teapot_handler(_req: Request<Body>) -> Result<Response, Infallible> {
        Ok(StatusCode::IM_A_TEAPOT.into_response())
    }

    fn post(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_successful_login_sets_cookies() {
        let (layer, tokens) = layer();
        let response = layer
            .layer(tower::service_fn(teapot_handler))
            .oneshot(post("/login", r#"{"username":"alice","password":"wonderland"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("AccessToken="));
        assert!(cookies[1].starts_with("RefreshToken="));
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=86400"));
            assert!(cookie.contains("HttpOnly"));
        }

        let access = cookies[0]
            .trim_start_matches("AccessToken=")
            .split(';')
            .next()
            .unwrap();
        assert_eq!(tokens.validate_access(access).unwrap().id, 42);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (layer, _) = layer();
        let response = layer
            .layer(tower::service_fn(teapot_handler))
            .oneshot(post("/login", r#"{"username":"alice","password":"nope"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (layer, _) = layer();
        let response = layer
            .layer(tower::service_fn(teapot_handler))
            .oneshot(post("/login", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_requests_pass_through() {
        let (layer, _) = layer();
        let service = layer.with_login_path("/session").layer(tower::service_fn(teapot_handler));

        let response = service
            .clone()
            .oneshot(post("/login", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

        let get = Request::builder()
            .uri("/session")
            .body(Body::empty())
            .unwrap();
        let response = service.oneshot(get).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
