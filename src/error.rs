use thiserror::Error;

use crate::config::ConfigKey;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret {name} not found in vault and {env_var} not set in environment")]
    Unavailable { name: String, env_var: String },
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Failed to load secret for {key}: {source}")]
    Failed {
        key: ConfigKey,
        #[source]
        source: SecretError,
    },
}

/// Errors from acquiring the shared database pool.
///
/// `Clone` so that one failed attempt can be reported to every caller awaiting it.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("Missing required database configuration: {}", format_keys(.missing))]
    ConfigIncomplete { missing: Vec<ConfigKey> },

    #[error("Database connection to {server} failed: {reason}")]
    ConnectFailed { server: String, reason: String },
}

fn format_keys(keys: &[ConfigKey]) -> String {
    keys.iter()
        .map(|key| key.env_var())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_incomplete_lists_env_vars() {
        let err = ConnectionError::ConfigIncomplete {
            missing: vec![ConfigKey::User, ConfigKey::Password],
        };
        assert_eq!(
            err.to_string(),
            "Missing required database configuration: SQL_USER, SQL_PASSWORD"
        );
    }
}
