#![warn(rust_2018_idioms)]

use std::sync::Arc;

use todo_api::db::{PgConnector, PgTodoStore, PoolManager, TodoStore};
use todo_api::web::{self, AppState, ServerSettings};
use todo_api::{load_secrets, logging, ConfigStore, EnvVars, SecretResolver};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let env = EnvVars::from_env();
    let _guard = logging::init_logger(&env)?;
    let resolver = SecretResolver::from_env_vars(env);

    if let Err(e) = run(resolver).await {
        tracing::error!(error = %e, "Failed to start application");
        return Err(e);
    }
    Ok(())
}

async fn run(resolver: SecretResolver) -> Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting application");

    let config_store = Arc::new(ConfigStore::new());
    let config = load_secrets(&resolver, &config_store).await?;
    let settings = ServerSettings::from_config(&config, resolver.env())?;
    tracing::info!(port = settings.port, "Port configured");

    let pools = Arc::new(PoolManager::new(PgConnector::default(), config_store));
    let todos = Arc::new(PgTodoStore::new(pools));
    todos.init_table().await?;

    web::start_server(settings, AppState { todos }).await?;
    Ok(())
}
