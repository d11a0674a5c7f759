use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Keys recognized by the service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    Server,
    Database,
    User,
    Password,
    Encrypt,
    TrustServerCertificate,
    Port,
}

impl ConfigKey {
    /// Environment variable carrying this value when the vault cannot provide it.
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::Server => "SQL_SERVER",
            ConfigKey::Database => "SQL_DATABASE",
            ConfigKey::User => "SQL_USER",
            ConfigKey::Password => "SQL_PASSWORD",
            ConfigKey::Encrypt => "SQL_ENCRYPT",
            ConfigKey::TrustServerCertificate => "SQL_TRUST_SERVER_CERTIFICATE",
            ConfigKey::Port => "PORT",
        }
    }

    /// Secret name in the vault. The listening port is never stored there.
    pub fn vault_name(self) -> Option<&'static str> {
        match self {
            ConfigKey::Server => Some("SQL-SERVER"),
            ConfigKey::Database => Some("SQL-DATABASE"),
            ConfigKey::User => Some("SQL-USER"),
            ConfigKey::Password => Some("SQL-PASSWORD"),
            ConfigKey::Encrypt => Some("SQL-ENCRYPT"),
            ConfigKey::TrustServerCertificate => Some("SQL-TRUST-SERVER-CERTIFICATE"),
            ConfigKey::Port => None,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

/// String values for the recognized configuration keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<ConfigKey, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Empty strings count as absent.
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Process-wide configuration, written once by the bootstrap and read by the pool manager.
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Configuration>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value with the given configuration.
    pub fn publish(&self, config: Configuration) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = config;
    }

    pub fn snapshot(&self) -> Configuration {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Snapshot of environment variables consulted during secret resolution.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Create with actual OS environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Unset and empty variables are treated the same.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for EnvVars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
