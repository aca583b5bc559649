use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// Fetches the identity provider's key set from a fixed JWKS endpoint.
#[derive(Clone)]
pub struct JwksFetcher {
    client: Client,
    url: String,
    timeout: Duration,
}

impl JwksFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn with_client(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> AuthResult<Vec<(String, DecodingKey)>> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| AuthError::RetrievalFailure(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::RetrievalFailure(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let body: JwksResponse = response
            .json()
            .await
            .map_err(|err| AuthError::RetrievalFailure(format!("invalid JWKS document: {err}")))?;

        let mut keys = Vec::new();
        for key in body.keys.into_iter() {
            let kid = key
                .kid
                .ok_or_else(|| AuthError::RetrievalFailure("JWKS entry missing kid".into()))?;
            let kty = key.kty.unwrap_or_else(|| "RSA".to_string());
            if kty != "RSA" {
                return Err(AuthError::RetrievalFailure(format!(
                    "JWKS key '{kid}' uses unsupported key type '{kty}'"
                )));
            }

            if let Some(alg) = key.alg {
                if !matches!(alg.as_str(), "RS256" | "RS384" | "RS512") {
                    return Err(AuthError::RetrievalFailure(format!(
                        "JWKS key '{kid}' uses unsupported alg '{alg}'"
                    )));
                }
            }

            let modulus = key.n.ok_or_else(|| {
                AuthError::RetrievalFailure(format!("JWKS key '{kid}' missing RSA modulus"))
            })?;
            let exponent = key.e.ok_or_else(|| {
                AuthError::RetrievalFailure(format!("JWKS key '{kid}' missing RSA exponent"))
            })?;

            let decoding_key = DecodingKey::from_rsa_components(&modulus, &exponent)
                .map_err(|err| {
                    AuthError::RetrievalFailure(format!("JWKS key '{kid}' unparseable: {err}"))
                })?;
            keys.push((kid, decoding_key));
        }

        Ok(keys)
    }
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkEntry>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    kty: Option<String>,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

/// Immutable snapshot of the key set. Replaced wholesale on refresh, never
/// mutated in place; concurrent verifications each hold their own `Arc`.
#[derive(Default)]
pub struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<DateTime<Utc>>,
}

impl KeySet {
    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }
}

/// Resolves signing keys by `kid`, populating the cache lazily and
/// refreshing at most once per resolution on a cache miss.
#[derive(Clone)]
pub struct KeyResolver {
    fetcher: JwksFetcher,
    snapshot: Arc<RwLock<Arc<KeySet>>>,
}

impl KeyResolver {
    pub fn new(fetcher: JwksFetcher) -> Self {
        Self {
            fetcher,
            snapshot: Arc::new(RwLock::new(Arc::new(KeySet::default()))),
        }
    }

    pub fn current(&self) -> Arc<KeySet> {
        let guard = self.snapshot.read().expect("rwlock poisoned");
        Arc::clone(&guard)
    }

    /// Look up `kid`, refreshing the key set once on a miss. A `kid` still
    /// absent after the refresh is `KeyNotFound`; the bounded retry keeps an
    /// attacker-supplied bogus `kid` from forcing repeated fetches.
    pub async fn resolve(&self, kid: &str) -> AuthResult<DecodingKey> {
        if let Some(key) = self.current().get(kid) {
            return Ok(key.clone());
        }

        self.refresh().await?;
        self.current()
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    /// Fetch the key set and swap in a fresh snapshot. Also usable for
    /// process-start warm-up.
    pub async fn refresh(&self) -> AuthResult<usize> {
        let keys = self.fetcher.fetch().await?;
        let count = keys.len();
        let set = KeySet {
            keys: keys.into_iter().collect(),
            fetched_at: Some(Utc::now()),
        };

        let mut guard = self.snapshot.write().expect("rwlock poisoned");
        *guard = Arc::new(set);
        drop(guard);

        debug!(count, url = self.fetcher.url(), "refreshed signing key set");
        Ok(count)
    }

    /// Replace the snapshot with fixed key material, bypassing the endpoint.
    pub fn install<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, DecodingKey)>,
    {
        let set = KeySet {
            keys: entries.into_iter().collect(),
            fetched_at: Some(Utc::now()),
        };
        let mut guard = self.snapshot.write().expect("rwlock poisoned");
        *guard = Arc::new(set);
    }
}
