// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP server wiring.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    routing::{get, post},
    BoxError, Router,
};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{AuthError, AuthResult};
use crate::handlers;
use crate::middleware::{AuthorizationLayer, LoginLayer};
use crate::state::AppState;

// =============================================================================
// AuthServer
// =============================================================================

/// The authentication server.
pub struct AuthServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl AuthServer {
    /// Creates a new server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    ///
    /// Middleware order, outermost first: trace, timeout, login,
    /// authorization, then the routes.
    pub fn router(&self) -> Router {
        let login = LoginLayer::new(self.state.tokens.clone(), self.state.authenticator.clone())
            .with_login_path(self.config.login_path.clone())
            .with_cookies(self.config.cookies.clone())
            .with_max_body_size(self.config.max_body_size);
        let authorization = AuthorizationLayer::new(self.state.tokens.clone());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(timeout_error))
            .timeout(self.config.request_timeout)
            .layer(login)
            .layer(authorization);

        Router::new()
            .route("/health", get(handlers::health))
            .route(&self.config.refresh_path, post(handlers::refresh_token))
            .route("/auth/me", get(handlers::current_user))
            // Set before `layer` so unmatched paths (including login) pass the stack.
            .fallback(handlers::not_found)
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until the process is stopped.
    pub async fn run(self) -> AuthResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> AuthResult<()> {
        let addr = self.config.socket_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AuthError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> AuthResult<()> {
        let router = self.router();
        let local = listener.local_addr().ok();

        info!(addr = ?local, login_path = %self.config.login_path, "Starting auth server");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| AuthError::internal(format!("Server error: {}", e)))?;

        info!("Auth server shutdown complete");

        Ok(())
    }

    /// Returns the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Turns a failure from the timeout layer into the error body.
async fn timeout_error(err: BoxError) -> AuthError {
    if err.is::<Elapsed>() {
        AuthError::RequestTimeout
    } else {
        AuthError::internal(format!("Unhandled middleware error: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::directory::{AuthenticationManager, InMemoryAccounts};
    use crate::principal::{Credentials, Principal};
    use crate::token::TokenConfig;

    struct SlowAuthenticator;

    #[async_trait]
    impl AuthenticationManager for SlowAuthenticator {
        async fn authenticate(&self, _credentials: &Credentials) -> AuthResult<Principal> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Principal::new(42, "USER"))
        }
    }

    fn login_request() -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"alice","password":"wonderland"}"#))
            .unwrap()
    }

    fn server() -> AuthServer {
        let accounts = Arc::new(InMemoryAccounts::new());
        accounts.add_user(42, "alice", "wonderland", "USER").unwrap();
        let config = ApiConfig::default()
            .with_tokens(TokenConfig::new("server-test-secret-that-is-long-enough"));

        let state = AppState::builder()
            .config(config)
            .accounts(accounts)
            .build()
            .unwrap();
        AuthServer::new(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = server()
            .router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Not found");
    }

    #[tokio::test]
    async fn test_login_reaches_middleware() {
        let response = server().router().oneshot(login_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[tokio::test]
    async fn test_me_requires_authentication() {
        let response = server()
            .router()
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_timeout_returns_error_body() {
        let mut config = ApiConfig::default()
            .with_tokens(TokenConfig::new("server-test-secret-that-is-long-enough"));
        config.request_timeout = Duration::from_millis(50);
        let state = AppState::builder()
            .config(config)
            .directory(Arc::new(InMemoryAccounts::new()))
            .authenticator(Arc::new(SlowAuthenticator))
            .build()
            .unwrap();

        let response = AuthServer::new(state)
            .router()
            .oneshot(login_request())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body_json(response).await["message"], "Request timed out");
    }

    #[test]
    fn test_addr() {
        assert_eq!(server().addr().port(), 8080);
    }
}
