// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for tokenward.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse YAML, TOML or JSON into [`ServiceConfig`]
//! 4. Apply environment variable overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! TOKENWARD_API_HOST=127.0.0.1
//! TOKENWARD_API_PORT=9090
//! TOKENWARD_TOKEN_SECRET=...
//! TOKENWARD_TOKEN_ISSUER=auth.example.com
//! TOKENWARD_SINGLE_USE_REFRESH=true
//! TOKENWARD_COOKIE_SECURE=true
//! TOKENWARD_LOG_LEVEL=debug
//! TOKENWARD_LOG_FORMAT=json
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, ServiceConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "TOKENWARD";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for tokenward.
///
/// # Examples
///
/// ```no_run
/// use tokenward_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("tokenward.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,

    /// Whether to validate after loading.
    validate: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            validate: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables validation.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is taken from the extension: `.yaml`/`.yml`, `.toml`
    /// or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<ServiceConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let config = self.parse_content(&content, format, path)?;
        let config = self.finish(config)?;

        info!("Configuration loaded successfully");
        debug!(
            accounts = config.accounts.len(),
            single_use_refresh = config.api.tokens.single_use_refresh,
            "Configuration summary"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<ServiceConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let config = parse_str(&content, format)?;
        self.finish(config)
    }

    fn finish(&self, mut config: ServiceConfig) -> ConfigResult<ServiceConfig> {
        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<ServiceConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports `${VAR_NAME}` and `${VAR_NAME:default}`. Unknown variables
    /// without a default are left in place.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (env::var(var_name), default_value) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    fn env_var(&self, suffix: &str) -> Option<(String, String)> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        env::var(&name).ok().map(|value| (name, value))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut ServiceConfig) -> ConfigResult<()> {
        if let Some((name, value)) = self.env_var("API_HOST") {
            config.api.host = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected an IP address"))?;
        }
        if let Some((name, value)) = self.env_var("API_PORT") {
            config.api.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }

        if let Some((_, value)) = self.env_var("TOKEN_SECRET") {
            config.api.tokens.secret = value;
        }
        if let Some((_, value)) = self.env_var("TOKEN_ISSUER") {
            config.api.tokens.issuer = value;
        }
        if let Some((_, value)) = self.env_var("SINGLE_USE_REFRESH") {
            config.api.tokens.single_use_refresh = parse_bool(&value);
        }
        if let Some((_, value)) = self.env_var("COOKIE_SECURE") {
            config.api.cookies.secure = parse_bool(&value);
        }

        if let Some((name, value)) = self.env_var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a log level"))?;
        }
        if let Some((name, value)) = self.env_var("LOG_FORMAT") {
            config.logging.format = parse_log_format(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected text, compact or json"))?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    validate: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables validation.
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(validate) = self.validate {
            loader.validate = validate;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<ServiceConfig> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "text" | "pretty" => Some(LogFormat::Text),
        "compact" => Some(LogFormat::Compact),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

/// YAML goes through the `config` crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<ServiceConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<ServiceConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const TEST_YAML: &str = r#"
api:
  port: 9000
  refresh_path: /token/refresh
  tokens:
    secret: yaml-test-secret-that-is-long-enough
    issuer: auth.test
    access_lifetime: 10m
    refresh_lifetime: 2d
    single_use_refresh: true

accounts:
  - id: 42
    username: alice
    password: wonderland
    role: USER
  - id: 7
    username: bob
    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g"
    enabled: false

logging:
  level: debug
  format: json
"#;

    fn isolated() -> ConfigLoader {
        ConfigLoader::new().with_env_prefix("TOKENWARD_LOADER_TEST_UNSET")
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(TEST_YAML.as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.refresh_path, "/token/refresh");
        assert_eq!(config.api.tokens.issuer, "auth.test");
        assert_eq!(config.api.tokens.access_lifetime, Duration::from_secs(600));
        assert_eq!(config.api.tokens.refresh_lifetime, Duration::from_secs(2 * 86_400));
        assert!(config.api.tokens.single_use_refresh);
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[1].role, "USER");
        assert!(!config.accounts[1].enabled);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[api]
port = 8181

[api.tokens]
secret = "toml-test-secret-that-is-long-enough"
access_lifetime = "1s"
refresh_lifetime = "1m"
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();
        assert_eq!(config.api.port, 8181);
        assert_eq!(config.api.tokens.access_lifetime, Duration::from_secs(1));
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_load_json_str() {
        let json = r#"{"api":{"tokens":{"secret":"json-test-secret-that-is-long-enough"}}}"#;
        let config = isolated().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.tokens.issuer, "tokenward");
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = isolated()
            .load_from_str("api:\n  port: 8080\n", ConfigFormat::Yaml)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let config = isolated()
            .with_validation(false)
            .load_from_str("api:\n  port: 8080\n", ConfigFormat::Yaml)
            .unwrap();
        assert!(config.api.tokens.secret.is_empty());
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(b"gateway:\n  id: x\n").unwrap();

        let err = isolated().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(ConfigFormat::Json.extension(), "json");
        assert!(ConfigFormat::from_path(Path::new("config.txt")).is_err());
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let result = isolated().resolve_env_placeholders("value: ${TOKENWARD_NONEXISTENT_VAR:fallback}");
        assert_eq!(result, "value: fallback");

        let result = isolated().resolve_env_placeholders("value: ${TOKENWARD_NONEXISTENT_VAR}");
        assert_eq!(result, "value: ${TOKENWARD_NONEXISTENT_VAR}");

        let result = isolated().resolve_env_placeholders("value: ${unterminated");
        assert_eq!(result, "value: ${unterminated");
    }

    #[test]
    fn test_env_placeholder_resolution() {
        env::set_var("TOKENWARD_PLACEHOLDER_SECRET", "placeholder-secret-that-is-long-enough");

        let yaml = "api:\n  tokens:\n    secret: ${TOKENWARD_PLACEHOLDER_SECRET}\n";
        let config = isolated().load_from_str(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.api.tokens.secret, "placeholder-secret-that-is-long-enough");
    }

    #[test]
    fn test_env_overrides() {
        let prefix = "TOKENWARD_OVERRIDE_TEST";
        env::set_var(format!("{prefix}_API_PORT"), "9443");
        env::set_var(format!("{prefix}_TOKEN_SECRET"), "override-secret-that-is-long-enough");
        env::set_var(format!("{prefix}_SINGLE_USE_REFRESH"), "yes");
        env::set_var(format!("{prefix}_LOG_LEVEL"), "warning");

        let config = ConfigLoader::new()
            .with_env_prefix(prefix)
            .load_from_str("{}", ConfigFormat::Json)
            .unwrap();

        assert_eq!(config.api.port, 9443);
        assert_eq!(config.api.tokens.secret, "override-secret-that-is-long-enough");
        assert!(config.api.tokens.single_use_refresh);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_env_override() {
        let prefix = "TOKENWARD_BAD_PORT_TEST";
        env::set_var(format!("{prefix}_API_PORT"), "not-a-port");

        let err = ConfigLoader::new()
            .with_env_prefix(prefix)
            .with_validation(false)
            .load_from_str("{}", ConfigFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("ON"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("CUSTOM")
            .resolve_env_vars(false)
            .validate(false)
            .build();

        assert_eq!(loader.env_prefix, "CUSTOM");
        assert!(!loader.resolve_env_vars);
        assert!(!loader.validate);
    }

    #[test]
    fn test_file_not_found() {
        let err = load_config("/nonexistent/tokenward.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
