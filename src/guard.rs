use axum::http::HeaderMap;
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::AuthResult;
use crate::extract::extract_bearer;
use crate::permissions::ensure_permission;
use crate::verifier::TokenVerifier;

/// Single entry point for protected routes: extract the bearer token,
/// verify it, and check the required permission, short-circuiting on the
/// first failure. Callers branch on the result and translate denials into
/// HTTP responses (`AuthError` implements `IntoResponse`).
#[derive(Clone)]
pub struct AuthGuard {
    verifier: TokenVerifier,
}

impl AuthGuard {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn from_config(config: AuthConfig) -> Self {
        Self::new(TokenVerifier::new(config))
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Warm the signing-key cache at process start so the first request does
    /// not pay the fetch.
    pub async fn warm_up(&self) -> AuthResult<usize> {
        self.verifier.resolver().refresh().await
    }

    pub async fn guard(
        &self,
        headers: &HeaderMap,
        required_permission: &str,
    ) -> AuthResult<Claims> {
        let outcome = self.check(headers, required_permission).await;
        match &outcome {
            Ok(claims) => debug!(
                subject = %claims.subject,
                permission = required_permission,
                "authorization granted"
            ),
            Err(err) => warn!(
                code = err.code(),
                status = %err.status_code(),
                permission = required_permission,
                error = %err,
                "authorization denied"
            ),
        }
        outcome
    }

    async fn check(&self, headers: &HeaderMap, required_permission: &str) -> AuthResult<Claims> {
        let token = extract_bearer(headers)?;
        let claims = self.verifier.verify(token).await?;
        ensure_permission(&claims, required_permission)?;
        Ok(claims)
    }
}
