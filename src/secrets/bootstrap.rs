use crate::config::{ConfigKey, ConfigStore, Configuration};
use crate::error::{BootstrapError, SecretError};

use super::SecretResolver;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_ENCRYPT: &str = "true";
const DEFAULT_TRUST_SERVER_CERTIFICATE: &str = "false";

const MANDATORY: [ConfigKey; 4] = [
    ConfigKey::Server,
    ConfigKey::Database,
    ConfigKey::User,
    ConfigKey::Password,
];

const OPTIONAL: [(ConfigKey, &str); 2] = [
    (ConfigKey::Encrypt, DEFAULT_ENCRYPT),
    (ConfigKey::TrustServerCertificate, DEFAULT_TRUST_SERVER_CERTIFICATE),
];

/// Resolve every required configuration value and publish the result into `store`.
///
/// Nothing is published unless all mandatory secrets resolve.
pub async fn load_secrets(
    resolver: &SecretResolver,
    store: &ConfigStore,
) -> Result<Configuration, BootstrapError> {
    let port = resolver.env().get(ConfigKey::Port.env_var()).unwrap_or(DEFAULT_PORT);
    let mut config = Configuration::new().with(ConfigKey::Port, port);

    for key in MANDATORY {
        let value = resolve(resolver, key).await.map_err(|source| {
            tracing::error!(key = %key, error = %source, "Failed to load secrets");
            BootstrapError::Failed { key, source }
        })?;
        config.set(key, value);
    }

    for (key, default) in OPTIONAL {
        let value = match resolve(resolver, key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, default = %default, "Using default");
                default.to_string()
            }
        };
        config.set(key, value);
    }

    store.publish(config.clone());
    tracing::info!(vault = resolver.has_vault(), "Secrets loaded successfully");
    Ok(config)
}

async fn resolve(
    resolver: &SecretResolver,
    key: ConfigKey,
) -> Result<String, SecretError> {
    let name = key.vault_name().unwrap_or(key.env_var());
    resolver.resolve(name, key.env_var()).await
}
