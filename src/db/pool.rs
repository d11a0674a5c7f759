//! Lazily established, shared database pool.
//!
//! The manager moves through `Absent -> InFlight -> Established`. A failed attempt
//! moves it back to `Absent` so that the next caller starts a fresh one. Callers
//! that arrive while an attempt is in flight await that same attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::connector::{Connector, DbSettings};
use crate::config::ConfigStore;
use crate::error::ConnectionError;

type Attempt<P> = Shared<BoxFuture<'static, Result<P, ConnectionError>>>;

enum PoolState<P> {
    Absent,
    InFlight { id: u64, attempt: Attempt<P> },
    Established(P),
}

pub struct PoolManager<C: Connector> {
    connector: Arc<C>,
    config: Arc<ConfigStore>,
    state: Mutex<PoolState<C::Pool>>,
    next_attempt: AtomicU64,
}

impl<C: Connector> PoolManager<C> {
    pub fn new(connector: C, config: Arc<ConfigStore>) -> Self {
        Self {
            connector: Arc::new(connector),
            config,
            state: Mutex::new(PoolState::Absent),
            next_attempt: AtomicU64::new(0),
        }
    }

    /// Return the shared pool, connecting on first use.
    pub async fn get_pool(&self) -> Result<C::Pool, ConnectionError> {
        let (id, attempt) = {
            let mut state = self.lock_state();
            match &*state {
                PoolState::Established(pool) => return Ok(pool.clone()),
                PoolState::InFlight { id, attempt } => (*id, attempt.clone()),
                PoolState::Absent => {
                    let settings = DbSettings::from_config(&self.config.snapshot())?;
                    let id = self.next_attempt.fetch_add(1, Ordering::Relaxed);
                    let attempt = self.start_attempt(settings);
                    *state = PoolState::InFlight {
                        id,
                        attempt: attempt.clone(),
                    };
                    (id, attempt)
                }
            }
        };

        let outcome = attempt.await;

        let mut state = self.lock_state();
        // a newer attempt may already have replaced this one
        if matches!(&*state, PoolState::InFlight { id: current, .. } if *current == id) {
            *state = match &outcome {
                Ok(pool) => PoolState::Established(pool.clone()),
                Err(_) => PoolState::Absent,
            };
        }
        outcome
    }

    pub fn is_established(&self) -> bool {
        matches!(&*self.lock_state(), PoolState::Established(_))
    }

    fn start_attempt(&self, settings: DbSettings) -> Attempt<C::Pool> {
        let connector = Arc::clone(&self.connector);
        async move {
            tracing::info!(
                server = %settings.server,
                database = %settings.database,
                user = %settings.user,
                "Connecting to database"
            );
            match connector.connect(&settings).await {
                Ok(pool) => {
                    tracing::info!(server = %settings.server, "Connected to database");
                    Ok(pool)
                }
                Err(e) => {
                    tracing::error!(server = %settings.server, error = %e, "Database connection failed");
                    Err(ConnectionError::ConnectFailed {
                        server: settings.server.clone(),
                        reason: e.to_string(),
                    })
                }
            }
        }
        .boxed()
        .shared()
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState<C::Pool>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
