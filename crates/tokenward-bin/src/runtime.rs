// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Builds the account directory and token service from configuration,
//! serves the router and drains connections on shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use tokenward_auth::{AppState, AuthServer};
use tokenward_config::{load_config, ServiceConfig};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// Runs the auth server until shutdown.
pub struct ServiceRuntime {
    config: Arc<ServiceConfig>,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a new runtime.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Builds the shared application state.
    pub fn build_state(&self) -> BinResult<AppState> {
        let accounts = self.config.build_accounts()?;
        if accounts.is_empty() {
            warn!("No accounts configured; every login will be rejected");
        }

        let state = AppState::builder()
            .config(self.config.api.clone())
            .accounts(Arc::new(accounts))
            .build()
            .map_err(BinError::Startup)?;

        Ok(state)
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting tokenward v{}", tokenward_auth::VERSION);

        let state = self.build_state()?;
        let server = AuthServer::new(state);
        info!(
            addr = %server.addr(),
            accounts = self.config.accounts.len(),
            access_lifetime = ?self.config.api.tokens.access_lifetime,
            refresh_lifetime = ?self.config.api.tokens.refresh_lifetime,
            single_use_refresh = self.config.api.tokens.single_use_refresh,
            "tokenward is ready"
        );

        let signal_watcher = {
            let coordinator = self.shutdown.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        let drain_signal = self.shutdown.shutdown_signal();
        let mut serve = tokio::spawn(server.run_with_shutdown(drain_signal.wait()));

        let result = tokio::select! {
            joined = &mut serve => joined,
            _ = self.shutdown.shutdown_signal().wait() => {
                let grace = self.config.api.shutdown_timeout;
                info!(?grace, "Draining connections");
                match tokio::time::timeout(grace, &mut serve).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!("Shutdown timeout elapsed; aborting open connections");
                        serve.abort();
                        signal_watcher.abort();
                        return Ok(());
                    }
                }
            }
        };
        signal_watcher.abort();

        match result {
            Ok(served) => served?,
            Err(source) => {
                return Err(BinError::Task {
                    task: "server",
                    source,
                })
            }
        }

        info!("tokenward shutdown complete");
        Ok(())
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<ServiceConfig>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or(BinError::MissingConfig)?;

                load_config(&path).map_err(|source| BinError::LoadConfig { path, source })?
            }
        };

        if let Some(port) = self.port {
            config.api.port = port;
        }

        Ok(ServiceRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
