use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::error;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    name: &'static str,
    version: &'static str,
    status: &'static str,
}

/// `GET /` — identifies the service without touching the database.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: String,
}

/// `GET /healthz` — liveness including a database round trip.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    match check_database_health(&state.db_pool).await {
        Ok(_) => Ok(Json(HealthResponse {
            status: "OK".to_string(),
            database: "healthy".to_string(),
        })),
        Err(err) => {
            error!(%err, "Database health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

async fn check_database_health(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
