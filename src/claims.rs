use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Verified JWT claims handed to the route layer. Exists only after the
/// verifier has confirmed signature, expiry, issuer, and audience.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    /// Absent when the provider issued no permissions claim at all; the
    /// permission authority treats that as a configuration error.
    pub permissions: Option<Vec<String>>,
    pub raw: serde_json::Value,
}

impl Claims {
    /// Convenience helper for permission checks.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|list| list.iter().any(|value| value == permission))
    }
}

/// Wire shape of the payload segment, before issuer/audience checks.
#[derive(Debug, Deserialize)]
pub(crate) struct ClaimsRepr {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<AudienceRepr>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AudienceRepr {
    Single(String),
    Many(Vec<String>),
}

impl AudienceRepr {
    pub(crate) fn contains(&self, expected: &str) -> bool {
        match self {
            AudienceRepr::Single(value) => value == expected,
            AudienceRepr::Many(values) => values.iter().any(|value| value == expected),
        }
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            AudienceRepr::Single(value) => vec![value],
            AudienceRepr::Many(values) => values,
        }
    }
}

pub(crate) fn timestamp(seconds: i64, claim: &str) -> AuthResult<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| AuthError::MalformedToken(format!("claim '{claim}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_permission_matches_exactly() {
        let claims = Claims {
            subject: "auth0|user".into(),
            issuer: "https://issuer.test".into(),
            audience: vec!["drinks-api".into()],
            expires_at: Utc::now(),
            issued_at: None,
            permissions: Some(vec!["get:drinks-detail".into(), "post:drinks".into()]),
            raw: serde_json::Value::Null,
        };

        assert!(claims.has_permission("post:drinks"));
        assert!(!claims.has_permission("delete:drinks"));
        assert!(!claims.has_permission("Post:drinks"));
    }

    #[test]
    fn audience_repr_accepts_single_and_many() {
        let single: AudienceRepr = serde_json::from_value(serde_json::json!("drinks-api"))
            .expect("single audience");
        assert!(single.contains("drinks-api"));
        assert!(!single.contains("other"));

        let many: AudienceRepr =
            serde_json::from_value(serde_json::json!(["other", "drinks-api"]))
                .expect("audience list");
        assert!(many.contains("drinks-api"));
        assert_eq!(many.into_vec(), vec!["other", "drinks-api"]);
    }

    #[test]
    fn repr_requires_sub_and_exp() {
        let err = serde_json::from_value::<ClaimsRepr>(serde_json::json!({"sub": "x"}));
        assert!(err.is_err());

        let repr: ClaimsRepr =
            serde_json::from_value(serde_json::json!({"sub": "x", "exp": 1_700_000_000}))
                .expect("minimal claims");
        assert!(repr.iss.is_none());
        assert!(repr.permissions.is_none());
    }
}
