use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::SecretStore;
use crate::config::EnvVars;
use crate::error::SecretError;

/// Resolves named secrets from the vault, falling back to environment variables.
///
/// Values fetched from the vault are cached by vault name for the lifetime of the resolver.
pub struct SecretResolver {
    store: Option<Arc<dyn SecretStore>>,
    env: EnvVars,
    cache: RwLock<HashMap<String, String>>,
}

impl SecretResolver {
    pub fn new(store: Arc<dyn SecretStore>, env: EnvVars) -> Self {
        Self {
            store: Some(store),
            env,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create without vault (secrets come from the environment only)
    pub fn new_without_vault(env: EnvVars) -> Self {
        Self {
            store: None,
            env,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Use the vault when `VAULT_ADDR` is present in `env`
    pub fn from_env_vars(env: EnvVars) -> Self {
        match super::vault_from_env(&env) {
            Some(store) => Self::new(store, env),
            None => Self::new_without_vault(env),
        }
    }

    pub fn has_vault(&self) -> bool {
        self.store.is_some()
    }

    pub fn env(&self) -> &EnvVars {
        &self.env
    }

    pub async fn resolve(&self, name: &str, env_var: &str) -> Result<String, SecretError> {
        let Some(store) = &self.store else {
            return self.from_environment(name, env_var);
        };

        {
            let cache = self.cache.read().await;
            if let Some(value) = cache.get(name) {
                return Ok(value.clone());
            }
        }

        match store.fetch(name).await {
            Ok(Some(value)) if !value.is_empty() => {
                let mut cache = self.cache.write().await;
                cache.insert(name.to_string(), value.clone());
                Ok(value)
            }
            Ok(_) => {
                tracing::warn!(secret = %name, "Secret has no value in vault");
                Err(self.unavailable(name, env_var))
            }
            Err(e) => {
                tracing::warn!(secret = %name, error = %e, "Failed to get secret from vault");
                tracing::warn!(env_var = %env_var, "Falling back to environment variable");
                self.from_environment(name, env_var)
            }
        }
    }

    fn from_environment(&self, name: &str, env_var: &str) -> Result<String, SecretError> {
        self.env
            .get(env_var)
            .map(str::to_string)
            .ok_or_else(|| self.unavailable(name, env_var))
    }

    fn unavailable(&self, name: &str, env_var: &str) -> SecretError {
        SecretError::Unavailable {
            name: name.to_string(),
            env_var: env_var.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vault_client::{VaultClient, VaultError};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory store that counts every fetch.
    struct CountingStore {
        values: HashMap<String, Option<String>>,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn new(values: &[(&str, Option<&str>)]) -> Self {
            Self {
                values: values
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SecretStore for CountingStore {
        async fn fetch(&self, name: &str) -> Result<Option<String>, VaultError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| VaultError::SecretNotFound {
                    path: name.to_string(),
                })
        }
    }

    fn env(vars: &[(&str, &str)]) -> EnvVars {
        vars.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_without_vault_reads_environment() {
        let resolver = SecretResolver::new_without_vault(env(&[("SQL_SERVER", "db.local")]));

        let value = resolver.resolve("SQL-SERVER", "SQL_SERVER").await.unwrap();
        assert_eq!(value, "db.local");
        assert!(!resolver.has_vault());
    }

    #[tokio::test]
    async fn test_without_vault_missing_env_is_unavailable() {
        let resolver = SecretResolver::new_without_vault(env(&[]));

        let result = resolver.resolve("SQL-SERVER", "SQL_SERVER").await;
        assert!(matches!(
            result,
            Err(SecretError::Unavailable { ref name, ref env_var })
                if name == "SQL-SERVER" && env_var == "SQL_SERVER"
        ));
    }

    #[tokio::test]
    async fn test_vault_value_is_cached() {
        let store = Arc::new(CountingStore::new(&[("SQL-USER", Some("vault-user"))]));
        let resolver = SecretResolver::new(store.clone(), env(&[("SQL_USER", "env-user")]));

        assert_eq!(resolver.resolve("SQL-USER", "SQL_USER").await.unwrap(), "vault-user");
        assert_eq!(resolver.resolve("SQL-USER", "SQL_USER").await.unwrap(), "vault-user");
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_vault_error_falls_back_to_environment() {
        let store = Arc::new(CountingStore::new(&[]));
        let resolver = SecretResolver::new(store.clone(), env(&[("SQL_PASSWORD", "from-env")]));

        let value = resolver.resolve("SQL-PASSWORD", "SQL_PASSWORD").await.unwrap();
        assert_eq!(value, "from-env");

        // fallback values are not cached, so the vault is asked again
        resolver.resolve("SQL-PASSWORD", "SQL_PASSWORD").await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_vault_error_without_environment_is_unavailable() {
        let store = Arc::new(CountingStore::new(&[]));
        let resolver = SecretResolver::new(store, env(&[]));

        let result = resolver.resolve("SQL-PASSWORD", "SQL_PASSWORD").await;
        assert!(matches!(result, Err(SecretError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_empty_vault_value_is_unavailable() {
        let store = Arc::new(CountingStore::new(&[
            ("SQL-DATABASE", Some("")),
            ("SQL-ENCRYPT", None),
        ]));
        let resolver = SecretResolver::new(store, env(&[("SQL_DATABASE", "todos")]));

        let empty = resolver.resolve("SQL-DATABASE", "SQL_DATABASE").await;
        assert!(matches!(empty, Err(SecretError::Unavailable { .. })));

        let missing = resolver.resolve("SQL-ENCRYPT", "SQL_ENCRYPT").await;
        assert!(matches!(missing, Err(SecretError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_vault_client_hits_server_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/secret/data/SQL-SERVER"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "data": { "value": "sql.internal" },
                    "metadata": {
                        "created_time": "2024-01-01T00:00:00.000000000Z",
                        "destroyed": false,
                        "version": 1
                    }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = VaultClient::builder()
            .base_url(mock_server.uri())
            .token("test-token")
            .mount("secret")
            .field("value")
            .build()
            .unwrap();
        let resolver = SecretResolver::new(Arc::new(client), env(&[]));

        for _ in 0..3 {
            let value = resolver.resolve("SQL-SERVER", "SQL_SERVER").await.unwrap();
            assert_eq!(value, "sql.internal");
        }
        // MockServer verifies expect(1) on drop
    }
}
