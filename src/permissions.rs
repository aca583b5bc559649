use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};

/// Decide whether verified claims carry `required`.
///
/// A token with no permissions claim at all is a provider misconfiguration,
/// reported as `PermissionsClaimMissing` rather than a legitimate denial.
pub fn ensure_permission(claims: &Claims, required: &str) -> AuthResult<()> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if permissions.iter().any(|value| value == required) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermission(required.to_string()))
    }
}
