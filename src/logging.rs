use std::io;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::EnvVars;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("log tracer already initialized")]
    LogTracerAlreadyInitialized,

    #[error("global tracing subscriber already set")]
    SubscriberAlreadySet,
}

/// Install the global subscriber.
///
/// `JSON_LOG=true` switches to Bunyan JSON on a non-blocking stdout writer; the returned
/// guard must live until shutdown so buffered lines are flushed.
pub fn init_logger(env: &EnvVars) -> Result<Option<WorkerGuard>, SetupError> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if !env.get("JSON_LOG").is_some_and(|s| s.parse().unwrap_or_default()) {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .try_init()
            .map_err(|_| SetupError::SubscriberAlreadySet)?;
        return Ok(None);
    }

    // Redirect the logs from log library to tracing's subscribers.
    LogTracer::init().map_err(|_| SetupError::LogTracerAlreadyInitialized)?;

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(io::stdout());

    let subscriber = Registry::default()
        .with(filter())
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(app_name, non_blocking_writer));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| SetupError::SubscriberAlreadySet)?;

    Ok(Some(guard))
}
