use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::connector::PgConnector;
use super::pool::PoolManager;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i32,
    pub title: Option<String>,
    pub completed: bool,
}

/// Persistence operations used by the HTTP layer.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Create the todos table if it does not exist yet.
    async fn init_table(&self) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn add(&self, title: Option<&str>) -> Result<(), StoreError>;

    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: i32) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store. Every operation asks the pool manager for the pool.
pub struct PgTodoStore {
    pools: Arc<PoolManager<PgConnector>>,
}

impl PgTodoStore {
    pub fn new(pools: Arc<PoolManager<PgConnector>>) -> Self {
        Self { pools }
    }

    async fn pool(&self) -> Result<PgPool, StoreError> {
        Ok(self.pools.get_pool().await?)
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn init_table(&self) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id SERIAL PRIMARY KEY,
                title VARCHAR(255),
                completed BOOLEAN NOT NULL DEFAULT FALSE
            )",
        )
        .execute(&pool)
        .await?;
        tracing::info!("todos table checked/created");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let pool = self.pool().await?;
        let todos = sqlx::query_as::<_, Todo>("SELECT id, title, completed FROM todos ORDER BY id")
            .fetch_all(&pool)
            .await?;
        Ok(todos)
    }

    async fn add(&self, title: Option<&str>) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query("INSERT INTO todos (title) VALUES ($1)")
            .bind(title)
            .execute(&pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        tracing::debug!(id, rows = result.rows_affected(), "Deleted todo");
        Ok(())
    }
}
