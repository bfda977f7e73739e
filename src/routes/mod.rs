//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the JSON API under `/api` with permissive CORS (the maintenance
//! frontend is served from a different origin) and request tracing.

pub mod rex;
pub mod windows;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Error half of a route result: status plus a coded JSON body the client
/// can surface as a notification.
pub(crate) type ApiError = (StatusCode, axum::response::Json<serde_json::Value>);

pub(crate) fn error_body(code: &str, message: impl Into<String>) -> axum::response::Json<serde_json::Value> {
    axum::response::Json(serde_json::json!({ "error": code, "message": message.into() }))
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/windows",
            get(windows::list_windows).post(windows::create_window),
        )
        .route(
            "/api/windows/{id}",
            get(windows::get_window).patch(windows::update_window),
        )
        .route(
            "/api/windows/{id}/anomalies",
            get(windows::list_anomalies).post(windows::record_anomaly),
        )
        .route("/api/windows/{id}/opportunity", get(windows::opportunity))
        .route(
            "/api/windows/{id}/rex",
            get(rex::list_by_window).post(rex::create_rex),
        )
        .route("/api/rex/{id}", get(rex::get_rex))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers;

    #[tokio::test]
    async fn healthz_returns_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn app_router_assembles_with_state() {
        let state = test_helpers::test_app_state();
        let _app = app(state);
    }

    #[test]
    fn error_body_carries_code_and_message() {
        let body = error_body("E_VALIDATION", "summary is required");
        assert_eq!(body.0["error"], "E_VALIDATION");
        assert_eq!(body.0["message"], "summary is required");
    }
}
