use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigKey, Configuration, EnvVars};
use crate::db::TodoStore;
use crate::web::handlers::{health, todos};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl ServerSettings {
    /// Port comes from the published configuration, the rest from the environment.
    pub fn from_config(
        config: &Configuration,
        env: &EnvVars,
    ) -> Result<Self, std::num::ParseIntError> {
        let port = config.get(ConfigKey::Port).unwrap_or("8080").parse()?;
        Ok(Self {
            host: env.get("HOST").unwrap_or(DEFAULT_HOST).to_string(),
            port,
            static_dir: PathBuf::from(env.get("STATIC_DIR").unwrap_or(DEFAULT_STATIC_DIR)),
        })
    }
}

pub fn router(state: AppState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/ping/", get(health::health))
        .route("/todos", get(todos::list).post(todos::create))
        .route("/todos/{id}", delete(todos::remove))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(settings: ServerSettings, state: AppState) -> std::io::Result<()> {
    let app = router(state, settings.static_dir);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("Received SIGTERM, shutting down"),
    }
}
