use std::fmt;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use crate::config::{ConfigKey, Configuration};
use crate::error::{BoxError, ConnectionError};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection parameters derived from the published configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
}

impl DbSettings {
    /// Fails with `ConfigIncomplete` naming every missing credential.
    pub fn from_config(config: &Configuration) -> Result<Self, ConnectionError> {
        let required = [
            ConfigKey::Server,
            ConfigKey::Database,
            ConfigKey::User,
            ConfigKey::Password,
        ];
        let missing: Vec<ConfigKey> = required
            .into_iter()
            .filter(|key| config.get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConnectionError::ConfigIncomplete { missing });
        }

        let value = |key| config.get(key).unwrap_or_default().to_string();
        Ok(Self {
            server: value(ConfigKey::Server),
            database: value(ConfigKey::Database),
            user: value(ConfigKey::User),
            password: value(ConfigKey::Password),
            encrypt: config.get(ConfigKey::Encrypt) == Some("true"),
            trust_server_certificate: config.get(ConfigKey::TrustServerCertificate)
                == Some("true"),
        })
    }

    /// Split `host:port` or `host,port` into its parts.
    pub fn host_and_port(&self) -> (&str, Option<u16>) {
        if let Some(idx) = self.server.rfind([':', ',']) {
            if let Ok(port) = self.server[idx + 1..].parse() {
                return (&self.server[..idx], Some(port));
            }
        }
        (&self.server, None)
    }

    pub fn ssl_mode(&self) -> PgSslMode {
        match (self.encrypt, self.trust_server_certificate) {
            (false, _) => PgSslMode::Disable,
            (true, true) => PgSslMode::Require,
            (true, false) => PgSslMode::VerifyFull,
        }
    }
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}

/// Opens database pools. One call per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Pool: Clone + Send + Sync + 'static;

    async fn connect(&self, settings: &DbSettings) -> Result<Self::Pool, BoxError>;
}

pub struct PgConnector {
    max_connections: u32,
}

impl Default for PgConnector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONNECTIONS)
    }
}

impl PgConnector {
    pub fn new(max_connections: u32) -> Self {
        Self { max_connections }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Pool = PgPool;

    async fn connect(&self, settings: &DbSettings) -> Result<PgPool, BoxError> {
        let (host, port) = settings.host_and_port();
        let mut options = PgConnectOptions::new()
            .host(host)
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password)
            .ssl_mode(settings.ssl_mode());
        if let Some(port) = port {
            options = options.port(port);
        }

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Configuration {
        Configuration::new()
            .with(ConfigKey::Server, "db.internal:6432")
            .with(ConfigKey::Database, "todos")
            .with(ConfigKey::User, "app")
            .with(ConfigKey::Password, "hunter2")
    }

    #[test]
    fn test_from_config_reads_credentials_and_flags() {
        let settings = DbSettings::from_config(
            &config()
                .with(ConfigKey::Encrypt, "true")
                .with(ConfigKey::TrustServerCertificate, "false"),
        )
        .unwrap();

        assert_eq!(settings.database, "todos");
        assert_eq!(settings.user, "app");
        assert_eq!(settings.password, "hunter2");
        assert!(settings.encrypt);
        assert!(!settings.trust_server_certificate);
        assert!(matches!(settings.ssl_mode(), PgSslMode::VerifyFull));
    }

    #[test]
    fn test_from_config_reports_every_missing_key() {
        let config = Configuration::new().with(ConfigKey::Server, "s");
        let err = DbSettings::from_config(&config).unwrap_err();

        match err {
            ConnectionError::ConfigIncomplete { missing } => assert_eq!(
                missing,
                vec![ConfigKey::Database, ConfigKey::User, ConfigKey::Password]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_host_and_port() {
        let mut settings = DbSettings::from_config(&config()).unwrap();
        assert_eq!(settings.host_and_port(), ("db.internal", Some(6432)));

        settings.server = "db.internal,1433".to_string();
        assert_eq!(settings.host_and_port(), ("db.internal", Some(1433)));

        settings.server = "db.internal".to_string();
        assert_eq!(settings.host_and_port(), ("db.internal", None));
    }

    #[test]
    fn test_ssl_mode_follows_flags() {
        let mut settings = DbSettings::from_config(&config()).unwrap();
        assert!(matches!(settings.ssl_mode(), PgSslMode::Disable));

        settings.encrypt = true;
        settings.trust_server_certificate = true;
        assert!(matches!(settings.ssl_mode(), PgSslMode::Require));
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = DbSettings::from_config(&config()).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("hunter2"));
    }
}
