use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::{timestamp, Claims, ClaimsRepr};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwks::{JwksFetcher, KeyResolver};

/// Verifies bearer tokens against the resolved signing-key set and the
/// configured issuer and audience.
#[derive(Clone)]
pub struct TokenVerifier {
    config: AuthConfig,
    resolver: KeyResolver,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Self {
        let fetcher = JwksFetcher::new(config.jwks_url.clone(), config.jwks_timeout);
        Self {
            resolver: KeyResolver::new(fetcher),
            config,
        }
    }

    pub fn with_resolver(config: AuthConfig, resolver: KeyResolver) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Validate a compact JWT end to end. Expiry is checked before the
    /// signature so an expired token reports `TokenExpired` no matter what
    /// its signature segment contains.
    pub async fn verify(&self, token: &str) -> AuthResult<Claims> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::MalformedToken(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        }

        let header = decode_segment(segments[0], "header")?;
        let payload = decode_segment(segments[1], "payload")?;

        let kid = header
            .get("kid")
            .and_then(Value::as_str)
            .ok_or(AuthError::MissingKeyId)?;
        let algorithm = accepted_algorithm(&header)?;
        let key = self.resolver.resolve(kid).await?;

        let repr: ClaimsRepr = serde_json::from_value(payload.clone())
            .map_err(|err| AuthError::MalformedToken(format!("invalid claims payload: {err}")))?;

        let now = Utc::now().timestamp();
        if repr.exp.saturating_add(i64::from(self.config.leeway_seconds)) <= now {
            return Err(AuthError::TokenExpired);
        }

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims::<&str>(&[]);
        decode::<Value>(token, &key, &validation)
            .map_err(|err| AuthError::InvalidSignature(err.to_string()))?;

        if repr.iss.as_deref() != Some(self.config.issuer.as_str()) {
            return Err(AuthError::InvalidIssuer);
        }

        let audience = match repr.aud {
            Some(aud) if aud.contains(&self.config.audience) => aud.into_vec(),
            _ => return Err(AuthError::InvalidAudience),
        };

        let claims = Claims {
            subject: repr.sub,
            issuer: self.config.issuer.clone(),
            audience,
            expires_at: timestamp(repr.exp, "exp")?,
            issued_at: match repr.iat {
                Some(iat) => Some(timestamp(iat, "iat")?),
                None => None,
            },
            permissions: repr.permissions,
            raw: payload,
        };

        debug!(kid, subject = %claims.subject, "verified bearer token");
        Ok(claims)
    }
}

fn decode_segment(segment: &str, name: &str) -> AuthResult<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken(format!("{name} is not valid base64url")))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| AuthError::MalformedToken(format!("{name} is not valid JSON")))
}

/// Only asymmetric RSA algorithms are accepted. Symmetric algorithms are
/// rejected outright so an HMAC token can never be validated against public
/// key material (algorithm confusion).
fn accepted_algorithm(header: &Value) -> AuthResult<Algorithm> {
    let alg = header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::InvalidSignature("token header missing alg".into()))?;

    match alg {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(AuthError::InvalidSignature(format!(
            "algorithm '{other}' is not an accepted asymmetric algorithm"
        ))),
    }
}
