// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`.
//! A context router exposes the per-request security context so tests can
//! see what the authorization filter forwarded.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tokenward_auth::{
    AppState, AuthServer, AuthorizationLayer, Clock, CurrentContext, InMemoryAccounts, LoginLayer,
    TokenConfig, TokenPair, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};

use super::fixtures::{AccountFixtures, ApiFixtures, TokenFixtures};

/// Path of the context echo route.
pub const CONTEXT_PATH: &str = "/context";

// =============================================================================
// TestApp
// =============================================================================

/// The full router plus the state it was built from.
pub struct TestApp {
    /// Shared application state.
    pub state: AppState,

    /// Seeded account store.
    pub accounts: Arc<InMemoryAccounts>,

    router: Router,
    context: Router,
}

impl TestApp {
    /// Default tokens and the seeded accounts.
    pub fn new() -> Self {
        Self::with_tokens(TokenFixtures::config())
    }

    /// Seeded accounts with the given token configuration.
    pub fn with_tokens(tokens: TokenConfig) -> Self {
        Self::build(tokens, None)
    }

    /// Seeded accounts, the given token configuration and clock.
    pub fn with_clock(tokens: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self::build(tokens, Some(clock))
    }

    fn build(tokens: TokenConfig, clock: Option<Arc<dyn Clock>>) -> Self {
        super::init_test_logging();

        let accounts = AccountFixtures::seeded();
        let mut builder = AppState::builder()
            .config(ApiFixtures::config(tokens))
            .accounts(accounts.clone());
        if let Some(clock) = clock {
            builder = builder.clock(clock);
        }
        let state = builder.build().expect("Failed to build app state");

        let router = AuthServer::new(state.clone()).router();
        let context = context_router(&state);

        Self {
            state,
            accounts,
            router,
            context,
        }
    }

    /// Sends a request through the full router.
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Posts credentials to the login path.
    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        let body = json!({ "username": username, "password": password });
        self.request(json_request(Method::POST, &self.state.config.login_path, &body))
            .await
    }

    /// Logs in and returns the token pair read from the cookies.
    pub async fn login_pair(&self, username: &str, password: &str) -> TokenPair {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), 200, "login for {} failed", username);

        TokenPair {
            access_token: cookie_value(&response, ACCESS_COOKIE_NAME)
                .expect("missing access cookie"),
            refresh_token: cookie_value(&response, REFRESH_COOKIE_NAME)
                .expect("missing refresh cookie"),
        }
    }

    /// Posts a refresh token to the refresh endpoint.
    pub async fn refresh(&self, refresh_token: &str) -> Response<Body> {
        let body = json!({ "refresh_token": refresh_token });
        self.request(json_request(Method::POST, &self.state.config.refresh_path, &body))
            .await
    }

    /// GETs `path` with an optional raw `Authorization` header value.
    pub async fn get(&self, path: &str, authorization: Option<&str>) -> Response<Body> {
        self.request(get_request(path, authorization)).await
    }

    /// Returns the context the authorization filter forwarded, as JSON.
    pub async fn context_of(&self, authorization: Option<&str>) -> Value {
        let response = self
            .context
            .clone()
            .oneshot(get_request(CONTEXT_PATH, authorization))
            .await
            .expect("context router is infallible");
        assert_eq!(response.status(), 200);
        body_json(response).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Context Router
// =============================================================================

/// Login and authorization filters in front of a handler that echoes the
/// security context.
pub fn context_router(state: &AppState) -> Router {
    let login = LoginLayer::new(state.tokens.clone(), state.authenticator.clone())
        .with_login_path(state.config.login_path.clone());

    Router::new()
        .route(CONTEXT_PATH, get(echo_context))
        .layer(AuthorizationLayer::new(state.tokens.clone()))
        .layer(login)
}

async fn echo_context(CurrentContext(ctx): CurrentContext) -> Json<Value> {
    Json(json!({
        "authenticated": ctx.is_authenticated(),
        "subject_id": ctx.subject_id(),
        "role": ctx.role(),
        "request_id": ctx.request_id.to_string(),
    }))
}

// =============================================================================
// Request / Response Helpers
// =============================================================================

/// Builds a JSON request.
pub fn json_request(method: Method, path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Builds a GET request with an optional `Authorization` header.
pub fn get_request(path: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Formats a bearer header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Collects a response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes()
        .to_vec()
}

/// Collects a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// All `Set-Cookie` header values.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The full `Set-Cookie` header for `name`.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
}

/// The value of cookie `name`.
pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let header = set_cookie(response, name)?;
    let pair = header.split(';').next()?;
    pair.split_once('=').map(|(_, v)| v.to_string())
}
