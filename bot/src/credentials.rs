//! Shared API Credentials
//!
//! Read-only lookup of third-party API tokens, keyed by service name.
//! Each service maps to a set of named fields (e.g. `pexels` → `authorization`).

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use fred::clients::Client;
use fred::interfaces::HashesInterface;

use crate::settings::StoreError;

/// Service name for the Pexels API token.
pub const PEXELS_SERVICE: &str = "pexels";

/// Field holding the Pexels bearer token.
pub const AUTHORIZATION_FIELD: &str = "authorization";

/// Source of shared API tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All fields stored for `service`; empty when nothing is configured.
    async fn shared_api_tokens(&self, service: &str) -> Result<HashMap<String, String>, StoreError>;
}

/// Fetch a token field, if present and non-empty.
pub async fn token(
    store: &dyn CredentialStore,
    service: &str,
    field: &str,
) -> Result<Option<String>, StoreError> {
    let mut tokens = store.shared_api_tokens(service).await?;
    Ok(tokens.remove(field).filter(|t| !t.is_empty()))
}

/// In-process credential store, typically seeded from the environment.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    services: DashMap<String, HashMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the Pexels token already set.
    #[must_use]
    pub fn with_pexels_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.insert(PEXELS_SERVICE, AUTHORIZATION_FIELD, token);
        store
    }

    pub fn insert(&self, service: &str, field: &str, value: impl Into<String>) {
        self.services
            .entry(service.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn shared_api_tokens(&self, service: &str) -> Result<HashMap<String, String>, StoreError> {
        Ok(self
            .services
            .get(service)
            .map(|fields| fields.clone())
            .unwrap_or_default())
    }
}

/// Redis-backed credential store. Each service is a hash at
/// `{prefix}:api_tokens:{service}`.
#[derive(Clone)]
pub struct RedisCredentialStore {
    redis: Client,
    prefix: String,
}

impl RedisCredentialStore {
    pub fn new(redis: Client, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn key(&self, service: &str) -> String {
        format!("{}:api_tokens:{service}", self.prefix)
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn shared_api_tokens(&self, service: &str) -> Result<HashMap<String, String>, StoreError> {
        let fields: HashMap<String, String> = self.redis.hgetall(self.key(service)).await?;
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_service_has_no_token() {
        let store = MemoryCredentialStore::new();
        let found = token(&store, PEXELS_SERVICE, AUTHORIZATION_FIELD).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_missing() {
        let store = MemoryCredentialStore::with_pexels_token("");
        let found = token(&store, PEXELS_SERVICE, AUTHORIZATION_FIELD).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_whitespace_token_counts_as_present() {
        let store = MemoryCredentialStore::with_pexels_token("   ");
        let found = token(&store, PEXELS_SERVICE, AUTHORIZATION_FIELD).await.unwrap();
        assert_eq!(found.as_deref(), Some("   "));
    }

    #[tokio::test]
    async fn test_other_fields_do_not_count() {
        let store = MemoryCredentialStore::new();
        store.insert(PEXELS_SERVICE, "client_id", "abc");
        let found = token(&store, PEXELS_SERVICE, AUTHORIZATION_FIELD).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_token_present() {
        let store = MemoryCredentialStore::with_pexels_token("secret");
        let found = token(&store, PEXELS_SERVICE, AUTHORIZATION_FIELD).await.unwrap();
        assert_eq!(found.as_deref(), Some("secret"));
    }
}
