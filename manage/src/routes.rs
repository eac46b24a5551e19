//! Status endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::database::Database;

/// Shared state for the status routes
#[derive(Clone)]
pub struct StatusState {
    pub environment: Arc<str>,
    pub database: Database,
}

/// Router with `/` and `/health`
pub fn status_routes(state: StatusState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}

async fn root() -> &'static str {
    "SoConn is running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    environment: String,
    database: DatabaseStatus,
}

#[derive(Serialize)]
struct DatabaseStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn health(State(state): State<StatusState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.database.ping().await {
        Ok(()) => DatabaseStatus {
            status: "healthy",
            error: None,
        },
        Err(e) => DatabaseStatus {
            status: "unhealthy",
            error: Some(e.to_string()),
        },
    };

    let healthy = database.error.is_none();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        environment: state.environment.to_string(),
        database,
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn state() -> StatusState {
        StatusState {
            environment: Arc::from("test"),
            database: Database::connect("sqlite::memory:").await.unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health_reports_environment() {
        let response = status_routes(state().await)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["environment"], "test");
        assert_eq!(json["database"]["status"], "healthy");
        assert!(json["database"].get("error").is_none());
    }

    #[tokio::test]
    async fn test_root() {
        let response = status_routes(state().await)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
