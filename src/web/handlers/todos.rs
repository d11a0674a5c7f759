use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::db::Todo;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    title: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list().await?;
    Ok(Json(todos))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewTodo>,
) -> Result<(StatusCode, &'static str), ApiError> {
    state.todos.add(body.title.as_deref()).await?;
    Ok((StatusCode::CREATED, "Todo added"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<&'static str, ApiError> {
    state.todos.delete(id).await?;
    Ok("Todo deleted")
}
