use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};

const APPLICATION_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn index() -> &'static str {
    "API is running with PostgreSQL ✅"
}

#[derive(Debug, Deserialize)]
pub struct HealthRequest {
    noresponse: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResult {
    success: bool,
    application_name: &'static str,
    version: &'static str,
}

pub async fn health(Query(params): Query<HealthRequest>) -> Json<Option<HealthResult>> {
    let result = match params.noresponse {
        Some(_) => None,
        _ => Some(HealthResult {
            success: true,
            application_name: APPLICATION_NAME,
            version: VERSION,
        }),
    };
    Json(result)
}
