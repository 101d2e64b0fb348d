// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token lifecycle: issue, validate, refresh.

use std::sync::Arc;

use tokio::time::timeout;

use super::claims::{AccessClaims, RefreshClaims, SubjectClaims, TimedClaims, TokenKind};
use super::codec::TokenCodec;
use super::config::TokenConfig;
use super::guard::RefreshGuard;
use super::key::SigningKey;
use crate::clock::{Clock, SystemClock};
use crate::directory::{CredentialDirectory, DirectoryEntry};
use crate::error::{AuthError, AuthResult};
use crate::principal::{Principal, SubjectId, TokenPair};

// =============================================================================
// TokenService
// =============================================================================

/// Issues, validates and refreshes token pairs.
///
/// Issuance and access validation are pure CPU work against the signing key.
/// Only [`refresh`](Self::refresh) talks to the credential directory, and that
/// lookup is bounded by `directory_timeout`.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<TokenConfig>,
    codec: TokenCodec,
    directory: Arc<dyn CredentialDirectory>,
    guard: Option<Arc<RefreshGuard>>,
}

impl TokenService {
    /// Creates a service from validated configuration.
    pub fn new(config: TokenConfig, directory: Arc<dyn CredentialDirectory>) -> AuthResult<Self> {
        config.validate()?;

        let key = SigningKey::from_secret(config.secret.as_bytes(), config.algorithm)?;
        let codec = TokenCodec::new(key, &config.issuer, Arc::new(SystemClock));
        let guard = config
            .single_use_refresh
            .then(|| Arc::new(RefreshGuard::new(config.refresh_guard_capacity)));

        Ok(Self {
            config: Arc::new(config),
            codec,
            directory,
            guard,
        })
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.codec = self.codec.with_clock(clock);
        self
    }

    /// Enforces single use of refresh tokens through `guard`.
    pub fn with_refresh_guard(mut self, guard: Arc<RefreshGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Returns the codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns `true` if refresh tokens are single-use.
    pub fn is_single_use_refresh(&self) -> bool {
        self.guard.is_some()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Mints a fresh pair for an already authenticated principal.
    pub fn issue(&self, principal: &Principal) -> AuthResult<TokenPair> {
        if !principal.enabled {
            return Err(AuthError::PrincipalDisabled {
                subject_id: principal.id,
            });
        }

        let now = self.codec.clock().issued_at();
        let access = AccessClaims::new(
            principal,
            &self.config.issuer,
            now,
            self.config.access_lifetime_secs(),
        );
        let refresh = RefreshClaims::new(
            principal.id,
            &self.config.issuer,
            now,
            self.config.refresh_lifetime_secs(),
        );

        let pair = TokenPair {
            access_token: self.codec.encode(&access)?,
            refresh_token: self.codec.encode(&refresh)?,
        };

        tracing::info!(
            subject_id = principal.id,
            role = %principal.role,
            access_exp = access.exp,
            refresh_exp = refresh.exp,
            "Issued token pair"
        );

        Ok(pair)
    }

    /// Validates an access token and rebuilds its principal from the claims.
    ///
    /// No directory lookup happens here.
    pub fn validate_access(&self, token: &str) -> AuthResult<Principal> {
        let claims: AccessClaims = self
            .codec
            .decode(token, TokenKind::Access)
            .inspect_err(|e| tracing::debug!(error = %e, "Access token rejected"))?;

        claims.to_principal()
    }

    /// Exchanges a valid refresh token for a brand-new pair.
    ///
    /// Role and enablement are re-read from the directory; nothing but the
    /// subject id is taken from the presented token.
    pub async fn refresh(&self, token: &str) -> AuthResult<TokenPair> {
        let claims: RefreshClaims = self
            .codec
            .decode(token, TokenKind::Refresh)
            .inspect_err(|e| tracing::debug!(error = %e, "Refresh token rejected"))?;
        let subject_id = claims.subject_id()?;

        let entry = self.lookup(subject_id).await?;
        if !entry.enabled {
            tracing::info!(subject_id, "Refresh denied for disabled principal");
            return Err(AuthError::PrincipalDisabled { subject_id });
        }

        if let Some(guard) = &self.guard {
            let remaining = claims.remaining_at(self.codec.clock().now());
            guard
                .mark_used(&claims.jti, remaining)
                .await
                .inspect_err(|_| tracing::warn!(subject_id, "Refresh token replayed"))?;
        }

        tracing::info!(subject_id, role = %entry.role, "Refreshing token pair");
        self.issue(&entry.into_principal())
    }

    /// Returns the subject id embedded in any token issued by this service.
    ///
    /// The signature is verified; expiry and token kind are not.
    pub fn subject_id(&self, token: &str) -> AuthResult<SubjectId> {
        self.codec
            .decode_ignoring_expiry::<SubjectClaims>(token)?
            .subject_id()
    }

    async fn lookup(&self, subject_id: SubjectId) -> AuthResult<DirectoryEntry> {
        let limit = self.config.directory_timeout;

        match timeout(limit, self.directory.find(subject_id)).await {
            Err(_) => {
                tracing::warn!(subject_id, timeout = ?limit, "Directory lookup timed out");
                Err(AuthError::directory_unavailable(format!(
                    "lookup timed out after {:?}",
                    limit
                )))
            }
            Ok(Err(e)) => {
                tracing::warn!(subject_id, error = %e, "Directory lookup failed");
                Err(e.into())
            }
            Ok(Ok(None)) => Err(AuthError::PrincipalNotFound { subject_id }),
            Ok(Ok(Some(entry))) => Ok(entry),
        }
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .field("single_use_refresh", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::clock::ManualClock;
    use crate::directory::{Account, DirectoryError, InMemoryAccounts};

    const SECRET: &str = "service-test-secret-that-is-long-enough";

    fn config() -> TokenConfig {
        TokenConfig::new(SECRET)
            .with_access_lifetime(Duration::from_secs(60))
            .with_refresh_lifetime(Duration::from_secs(3_600))
    }

    fn accounts() -> Arc<InMemoryAccounts> {
        let accounts = Arc::new(InMemoryAccounts::new());
        accounts
            .insert(Account::new(42, "alice", "unused", "USER"))
            .unwrap();
        accounts
    }

    fn service(config: TokenConfig) -> (TokenService, Arc<ManualClock>, Arc<InMemoryAccounts>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let accounts = accounts();
        let service = TokenService::new(config, accounts.clone())
            .unwrap()
            .with_clock(clock.clone());
        (service, clock, accounts)
    }

    struct StalledDirectory;

    #[async_trait]
    impl CredentialDirectory for StalledDirectory {
        async fn find(&self, _id: SubjectId) -> Result<Option<DirectoryEntry>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    struct DownDirectory;

    #[async_trait]
    impl CredentialDirectory for DownDirectory {
        async fn find(&self, _id: SubjectId) -> Result<Option<DirectoryEntry>, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(TokenService::new(TokenConfig::default(), accounts()).is_err());
    }

    #[test]
    fn test_issue_then_validate() {
        let (service, _, _) = service(config());
        let principal = Principal::new(42, "USER");

        let pair = service.issue(&principal).unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);

        let validated = service.validate_access(&pair.access_token).unwrap();
        assert_eq!(validated.id, 42);
        assert_eq!(validated.role, "USER");
    }

    #[test]
    fn test_issue_refuses_disabled_principal() {
        let (service, _, _) = service(config());
        let principal = Principal::new(42, "USER").with_enabled(false);

        assert!(matches!(
            service.issue(&principal),
            Err(AuthError::PrincipalDisabled { subject_id: 42 })
        ));
    }

    #[test]
    fn test_access_expiry_is_monotonic() {
        let (service, clock, _) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        clock.advance(Duration::from_secs(59));
        assert!(service.validate_access(&pair.access_token).is_ok());

        for _ in 0..3 {
            clock.advance(Duration::from_secs(1));
            assert!(matches!(
                service.validate_access(&pair.access_token),
                Err(AuthError::TokenExpired)
            ));
        }
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let (service, _, _) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        assert!(matches!(
            service.validate_access(&pair.refresh_token),
            Err(AuthError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_foreign_secret_is_invalid() {
        let (service, _, _) = service(config());
        let (other, _, _) = service_with_secret("a-completely-different-secret-value!");
        let pair = other.issue(&Principal::new(42, "USER")).unwrap();

        assert!(matches!(
            service.validate_access(&pair.access_token),
            Err(AuthError::TokenInvalid { .. })
        ));
    }

    fn service_with_secret(
        secret: &str,
    ) -> (TokenService, Arc<ManualClock>, Arc<InMemoryAccounts>) {
        let mut config = config();
        config.secret = secret.to_string();
        service(config)
    }

    #[tokio::test]
    async fn test_refresh_uses_current_role() {
        let (service, _, accounts) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        accounts.set_role(42, "ADMIN");
        let refreshed = service.refresh(&pair.refresh_token).await.unwrap();

        let principal = service.validate_access(&refreshed.access_token).unwrap();
        assert_eq!(principal.role, "ADMIN");
        assert_ne!(refreshed.refresh_token, pair.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_disabled_principal() {
        let (service, _, accounts) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        accounts.set_enabled(42, false);
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::PrincipalDisabled { subject_id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_refresh_unknown_principal() {
        let (service, _, accounts) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        accounts.remove(42);
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::PrincipalNotFound { subject_id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_refresh_expired() {
        let (service, clock, _) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        clock.advance(Duration::from_secs(3_600));
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let (service, _, _) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        assert!(matches!(
            service.refresh(&pair.access_token).await,
            Err(AuthError::TokenInvalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_directory_timeout() {
        let config = config().with_directory_timeout(Duration::from_millis(100));
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let service = TokenService::new(config, Arc::new(StalledDirectory))
            .unwrap()
            .with_clock(clock);
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::DirectoryUnavailable { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_refresh_directory_down() {
        let service = TokenService::new(config(), Arc::new(DownDirectory)).unwrap();
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::DirectoryUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_reusable_by_default() {
        let (service, _, _) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        assert!(!service.is_single_use_refresh());
        assert!(service.refresh(&pair.refresh_token).await.is_ok());
        assert!(service.refresh(&pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_single_use_refresh() {
        let (service, _, _) = service(config().with_single_use_refresh(true));
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        let next = service.refresh(&pair.refresh_token).await.unwrap();
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::TokenInvalid { .. })
        ));
        assert!(service.refresh(&next.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_single_use_not_consumed_by_disabled_refresh() {
        let (service, _, accounts) = service(config().with_single_use_refresh(true));
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        accounts.set_enabled(42, false);
        assert!(service.refresh(&pair.refresh_token).await.is_err());

        accounts.set_enabled(42, true);
        assert!(service.refresh(&pair.refresh_token).await.is_ok());
    }

    #[test]
    fn test_subject_id_ignores_expiry_and_kind() {
        let (service, clock, _) = service(config());
        let pair = service.issue(&Principal::new(42, "USER")).unwrap();

        clock.advance(Duration::from_secs(10_000));
        assert_eq!(service.subject_id(&pair.access_token).unwrap(), 42);
        assert_eq!(service.subject_id(&pair.refresh_token).unwrap(), 42);
        assert!(service.subject_id("garbage").is_err());
    }
}
