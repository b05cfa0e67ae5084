//! Liveness and database reachability

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the database does not answer
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// GET /health
///
/// Needs no session. Answers 503 when `SELECT 1` fails.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => ("ok", StatusCode::OK, "ok"),
        Err(e) => {
            warn!("Health check: database unreachable: {}", e);
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            module: "guampa-server",
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use guampa_common::db::init_memory_database;

    #[tokio::test]
    async fn test_healthy_database() {
        let pool = init_memory_database().await.unwrap();
        let (code, Json(body)) = health_check(State(AppState::new(pool, "app"))).await;

        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "ok");
    }

    #[tokio::test]
    async fn test_closed_pool_reports_degraded() {
        let pool = init_memory_database().await.unwrap();
        pool.close().await;
        let (code, Json(body)) = health_check(State(AppState::new(pool, "app"))).await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.database, "unreachable");
    }
}
