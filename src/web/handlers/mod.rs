pub mod health;
pub mod todos;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::StoreError;

/// Store failures surface as `500` with the error message as plain text.
#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}
