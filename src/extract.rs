use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::{AuthError, AuthResult};

/// Parse the `Authorization` header into a raw bearer token.
///
/// The header must consist of exactly two space-separated parts and the
/// scheme must be the literal `Bearer`, case-sensitively. The token part is
/// returned verbatim, unvalidated.
pub fn extract_bearer(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split(' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().ok_or(AuthError::MalformedHeader)?;
    if parts.next().is_some() || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    if scheme != "Bearer" {
        return Err(AuthError::InvalidScheme);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn accepts_well_formed_bearer() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers).expect("token"), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        let err = extract_bearer(&HeaderMap::new()).expect_err("should reject");
        assert!(matches!(err, AuthError::MissingHeader));
    }

    #[test]
    fn rejects_single_part() {
        let err = extract_bearer(&headers_with("Bearer")).expect_err("should reject");
        assert!(matches!(err, AuthError::MalformedHeader));
    }

    #[test]
    fn rejects_three_parts() {
        let err = extract_bearer(&headers_with("Bearer abc def")).expect_err("should reject");
        assert!(matches!(err, AuthError::MalformedHeader));
    }

    #[test]
    fn rejects_double_space() {
        let err = extract_bearer(&headers_with("Bearer  abc")).expect_err("should reject");
        assert!(matches!(err, AuthError::MalformedHeader));
    }

    #[test]
    fn scheme_is_case_sensitive() {
        let err = extract_bearer(&headers_with("bearer abc")).expect_err("should reject");
        assert!(matches!(err, AuthError::InvalidScheme));

        let err = extract_bearer(&headers_with("Basic abc")).expect_err("should reject");
        assert!(matches!(err, AuthError::InvalidScheme));
    }
}
