pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod secrets;
pub mod web;

pub use config::{ConfigKey, ConfigStore, Configuration, EnvVars};
pub use db::{Connector, DbSettings, PgConnector, PoolManager, Todo, TodoStore};
pub use error::{BootstrapError, ConnectionError, SecretError, StoreError};
pub use secrets::{load_secrets, SecretResolver, SecretStore};
