//! Liveness and database reachability probe.
//!
//! `/health` always answers 200 while the process serves HTTP. The
//! `database` field reports whether a trivial query against the pool
//! succeeded, so orchestrators can tell a hung database from a dead service.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Handle `GET /health`.
async fn health(State((pool, _)): State<AppState>) -> Json<HealthResponse> {
    // ---
    let database = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Health check query failed: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_shape() {
        // ---
        let body = HealthResponse {
            status: "ok",
            database: "unavailable",
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"status": "ok", "database": "unavailable"})
        );
    }
}
