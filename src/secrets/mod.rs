pub mod bootstrap;
pub mod resolver;

use std::sync::Arc;

use async_trait::async_trait;
use vault_client::{VaultClient, VaultError};

use crate::config::EnvVars;

pub use bootstrap::load_secrets;
pub use resolver::SecretResolver;

/// Source of named secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` means the secret exists but carries no value.
    async fn fetch(&self, name: &str) -> Result<Option<String>, VaultError>;
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn fetch(&self, name: &str) -> Result<Option<String>, VaultError> {
        self.get_secret(name).await
    }
}

/// Build a Vault-backed secret store when `VAULT_ADDR` is set.
///
/// Returns `None` when the address is absent or the client cannot be built,
/// in which case secrets come from the environment only.
pub fn vault_from_env(env: &EnvVars) -> Option<Arc<dyn SecretStore>> {
    let Some(address) = env.get("VAULT_ADDR") else {
        tracing::warn!("VAULT_ADDR not set. Falling back to environment variables.");
        return None;
    };

    let mut builder = VaultClient::builder()
        .base_url(address)
        .application_name(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
    if let Some(token) = env.get("VAULT_TOKEN") {
        builder = builder.token(token);
    }

    match builder.build() {
        Ok(client) => {
            tracing::info!(address = %address, "Vault client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Vault client");
            tracing::warn!("Falling back to environment variables.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_vault_without_address() {
        let env: EnvVars = [("VAULT_TOKEN", "t")].into_iter().collect();
        assert!(vault_from_env(&env).is_none());
    }

    #[test]
    fn test_vault_with_address_and_token() {
        let env: EnvVars = [("VAULT_ADDR", "http://127.0.0.1:8200"), ("VAULT_TOKEN", "t")]
            .into_iter()
            .collect();
        assert!(vault_from_env(&env).is_some());
    }
}
