use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Every way a guarded request can be refused. The `Display` text carries
/// full detail for logs; client responses use [`AuthError::public_message`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingHeader,
    #[error("authorization header is not exactly 'Bearer <token>'")]
    MalformedHeader,
    #[error("authorization scheme is not 'Bearer'")]
    InvalidScheme,
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("token header missing kid")]
    MissingKeyId,
    #[error("no signing key registered for kid '{0}' after refresh")]
    KeyNotFound(String),
    #[error("signature verification failed: {0}")]
    InvalidSignature(String),
    #[error("token is expired")]
    TokenExpired,
    #[error("token issuer does not match expected issuer")]
    InvalidIssuer,
    #[error("expected audience not present in token audience")]
    InvalidAudience,
    #[error("token carries no permissions claim")]
    PermissionsClaimMissing,
    #[error("permission '{0}' not granted to token")]
    InsufficientPermission(String),
    #[error("failed to retrieve signing keys: {0}")]
    RetrievalFailure(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PermissionsClaimMissing => StatusCode::BAD_REQUEST,
            AuthError::InsufficientPermission(_) => StatusCode::FORBIDDEN,
            AuthError::RetrievalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable machine-readable code for response bodies and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::InvalidScheme => "invalid_scheme",
            AuthError::MalformedToken(_) => "malformed_token",
            AuthError::MissingKeyId => "missing_key_id",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::InvalidSignature(_) => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::InsufficientPermission(_) => "insufficient_permission",
            AuthError::RetrievalFailure(_) => "retrieval_failure",
        }
    }

    /// Client-safe description. Never echoes key identifiers, signature
    /// detail, or upstream error text; those stay in `Display` for logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "Authorization header is expected",
            AuthError::MalformedHeader => "Authorization header must be 'Bearer <token>'",
            AuthError::InvalidScheme => "Authorization header must start with 'Bearer'",
            AuthError::MalformedToken(_) => "Token is not a well-formed JWT",
            AuthError::MissingKeyId => "Token header lacks a key identifier",
            AuthError::KeyNotFound(_) => "Unable to find an appropriate signing key",
            AuthError::InvalidSignature(_) => "Token signature could not be verified",
            AuthError::TokenExpired => "Token is expired",
            AuthError::InvalidIssuer => "Token was issued by an unexpected issuer",
            AuthError::InvalidAudience => "Token audience does not match this API",
            AuthError::PermissionsClaimMissing => "Permissions were not included in the token",
            AuthError::InsufficientPermission(_) => "Permission not found",
            AuthError::RetrievalFailure(_) => "Unable to validate credentials",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            message: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
