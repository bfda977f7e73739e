//! Maintenance window routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::routes::rex::rex_error_response;
use crate::routes::{ApiError, error_body};
use crate::services::opportunity::{self, OpportunitySummary};
use crate::services::window::{self, AnomalyRow, AnomalyStatus, WindowRow, WindowStatus};
use crate::services::rex;
use crate::state::AppState;

#[derive(Serialize)]
pub struct WindowResponse {
    pub id: Uuid,
    pub title: String,
    pub schedule_start: OffsetDateTime,
    pub schedule_end: OffsetDateTime,
    pub status: String,
}

#[derive(Serialize)]
pub struct AnomalyResponse {
    pub id: Uuid,
    pub window_id: Uuid,
    pub title: String,
    pub status: String,
    pub created_at: OffsetDateTime,
}

#[derive(Serialize)]
pub struct WindowDetailResponse {
    #[serde(flatten)]
    pub window: WindowResponse,
    pub anomalies: Vec<AnomalyResponse>,
}

fn to_window_response(row: WindowRow) -> WindowResponse {
    WindowResponse {
        id: row.id,
        title: row.title,
        schedule_start: row.schedule_start,
        schedule_end: row.schedule_end,
        status: row.status.as_str().to_owned(),
    }
}

fn to_anomaly_response(row: AnomalyRow) -> AnomalyResponse {
    AnomalyResponse {
        id: row.id,
        window_id: row.window_id,
        title: row.title,
        status: row.status.as_str().to_owned(),
        created_at: row.created_at,
    }
}

#[derive(Deserialize)]
pub struct CreateWindowBody {
    pub title: String,
    pub schedule_start: OffsetDateTime,
    pub schedule_end: OffsetDateTime,
}

#[derive(Deserialize)]
pub struct UpdateWindowBody {
    pub status: String,
}

#[derive(Deserialize)]
pub struct RecordAnomalyBody {
    pub title: String,
    pub status: Option<String>,
}

/// `POST /api/windows` — create a maintenance window.
pub async fn create_window(
    State(state): State<AppState>,
    Json(body): Json<CreateWindowBody>,
) -> Result<(StatusCode, Json<WindowResponse>), ApiError> {
    let row = window::create_window(&state.pool, &body.title, body.schedule_start, body.schedule_end)
        .await
        .map_err(|e| window_error_response(&e))?;
    Ok((StatusCode::CREATED, Json(to_window_response(row))))
}

/// `GET /api/windows` — list windows, most recently scheduled first.
pub async fn list_windows(
    State(state): State<AppState>,
) -> Result<Json<Vec<WindowResponse>>, ApiError> {
    let rows = window::list_windows(&state.pool)
        .await
        .map_err(|e| window_error_response(&e))?;
    Ok(Json(rows.into_iter().map(to_window_response).collect()))
}

/// `GET /api/windows/:id` — one window with its anomalies.
pub async fn get_window(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<WindowDetailResponse>, ApiError> {
    let row = window::get_window(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;
    let anomalies = window::list_anomalies(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;

    Ok(Json(WindowDetailResponse {
        window: to_window_response(row),
        anomalies: anomalies.into_iter().map(to_anomaly_response).collect(),
    }))
}

/// `PATCH /api/windows/:id` — update window status.
pub async fn update_window(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
    Json(body): Json<UpdateWindowBody>,
) -> Result<Json<WindowResponse>, ApiError> {
    let Some(status) = WindowStatus::from_str(&body.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("E_BAD_STATUS", format!("unknown window status: {}", body.status)),
        ));
    };

    window::set_window_status(&state.pool, window_id, status)
        .await
        .map_err(|e| window_error_response(&e))?;
    let row = window::get_window(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;
    Ok(Json(to_window_response(row)))
}

/// `POST /api/windows/:id/anomalies` — record an anomaly against a window.
pub async fn record_anomaly(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
    Json(body): Json<RecordAnomalyBody>,
) -> Result<(StatusCode, Json<AnomalyResponse>), ApiError> {
    let status = match body.status.as_deref() {
        None => AnomalyStatus::Open,
        Some(s) => AnomalyStatus::from_str(s).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                error_body("E_BAD_STATUS", format!("unknown anomaly status: {s}")),
            )
        })?,
    };

    let row = window::record_anomaly(
        &state.pool,
        window_id,
        &body.title,
        status,
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(|e| window_error_response(&e))?;
    Ok((StatusCode::CREATED, Json(to_anomaly_response(row))))
}

/// `GET /api/windows/:id/anomalies` — list a window's anomalies.
pub async fn list_anomalies(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Vec<AnomalyResponse>>, ApiError> {
    // Distinguish "no anomalies" from "no such window".
    window::get_window(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;
    let rows = window::list_anomalies(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;
    Ok(Json(rows.into_iter().map(to_anomaly_response).collect()))
}

/// `GET /api/windows/:id/opportunity` — REX opportunity summary for a window.
pub async fn opportunity(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<OpportunitySummary>, ApiError> {
    let row = window::get_window(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;
    let anomalies = window::list_anomalies(&state.pool, window_id)
        .await
        .map_err(|e| window_error_response(&e))?;
    let records = rex::list_by_window(&state.pool, window_id)
        .await
        .map_err(|e| rex_error_response(&e))?;

    let summary = opportunity::assess(&row, &anomalies, &records, OffsetDateTime::now_utc());
    Ok(Json(summary))
}

pub(crate) fn window_error_response(err: &window::WindowError) -> ApiError {
    let (status, code) = match err {
        window::WindowError::NotFound(_) => (StatusCode::NOT_FOUND, "E_WINDOW_NOT_FOUND"),
        window::WindowError::UnknownStatus(_) | window::WindowError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "E_DATABASE")
        }
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "window service error");
        return (status, error_body(code, "internal error"));
    }
    (status, error_body(code, err.to_string()))
}

#[cfg(test)]
#[path = "windows_test.rs"]
mod tests;
