//! Stateless bearer-token authorization for HTTP APIs: extracts a JWT from
//! the `Authorization` header, verifies it against a remote JWKS, and
//! enforces a per-route permission requirement.

pub mod claims;
pub mod config;
pub mod error;
pub mod extract;
pub mod guard;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult};
pub use extract::extract_bearer;
pub use guard::AuthGuard;
pub use jwks::{JwksFetcher, KeyResolver};
pub use permissions::ensure_permission;
pub use verifier::TokenVerifier;
