use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_JWKS_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime configuration for token verification. Fixed at process start.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected issuer claim (iss), typically the identity provider base URL.
    pub issuer: String,
    /// Expected audience claim (aud).
    pub audience: String,
    /// Endpoint serving the provider's JSON Web Key Set.
    pub jwks_url: String,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
    /// Upper bound on a single JWKS fetch.
    pub jwks_timeout: Duration,
}

impl AuthConfig {
    /// Construct config for an issuer, deriving the JWKS endpoint from the
    /// provider convention `{issuer}/.well-known/jwks.json`.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let jwks_url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        Self {
            issuer,
            audience: audience.into(),
            jwks_url,
            leeway_seconds: 0,
            jwks_timeout: DEFAULT_JWKS_TIMEOUT,
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_jwks_timeout(mut self, timeout: Duration) -> Self {
        self.jwks_timeout = timeout;
        self
    }

    /// Load from `AUTH_ISSUER`, `AUTH_AUDIENCE`, and optionally
    /// `AUTH_JWKS_URL` / `AUTH_LEEWAY_SECONDS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let issuer = require_var("AUTH_ISSUER")?;
        let audience = require_var("AUTH_AUDIENCE")?;
        let mut config = Self::new(issuer, audience);

        if let Ok(url) = env::var("AUTH_JWKS_URL") {
            config = config.with_jwks_url(url);
        }
        if let Ok(raw) = env::var("AUTH_LEEWAY_SECONDS") {
            let seconds = raw
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidVar("AUTH_LEEWAY_SECONDS", raw))?;
            config = config.with_leeway(seconds);
        }

        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: '{1}'")]
    InvalidVar(&'static str, String),
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
