//! REX capture routes.
//!
//! DESIGN
//! ======
//! Submission is fire-and-forget from the client's point of view: the create
//! handler validates, builds, and persists in one request, and the `201`
//! response carries the stored record. Nothing is retried or queued on
//! failure; the error body tells the client what to surface.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::routes::{ApiError, error_body};
use crate::services::rex::{self, RexDraft, RexError, RexRecord};
use crate::services::window;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateRexBody {
    pub summary: String,
    pub root_cause: String,
    pub correction_action: Option<String>,
    pub preventive_action: Option<String>,
    pub lessons_learned: Option<String>,
    pub recommendations: Option<String>,
    /// Author identifier, supplied by the caller pending auth integration.
    pub created_by: String,
}

impl CreateRexBody {
    fn into_draft(self) -> (RexDraft, String) {
        let draft = RexDraft {
            summary: self.summary,
            root_cause: self.root_cause,
            correction_action: self.correction_action.unwrap_or_default(),
            preventive_action: self.preventive_action.unwrap_or_default(),
            lessons_learned: self.lessons_learned.unwrap_or_default(),
            recommendations: self.recommendations.unwrap_or_default(),
        };
        (draft, self.created_by)
    }
}

/// `POST /api/windows/:id/rex` — validate, build, and persist a REX record.
pub async fn create_rex(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
    Json(body): Json<CreateRexBody>,
) -> Result<(StatusCode, Json<RexRecord>), ApiError> {
    let (draft, created_by) = body.into_draft();
    let record = rex::build_record(&draft, window_id, &created_by, OffsetDateTime::now_utc())
        .map_err(|e| rex_error_response(&e))?;
    rex::create_rex(&state.pool, &record)
        .await
        .map_err(|e| rex_error_response(&e))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/windows/:id/rex` — list a window's REX records.
pub async fn list_by_window(
    State(state): State<AppState>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Vec<RexRecord>>, ApiError> {
    let exists = window::window_exists(&state.pool, window_id)
        .await
        .map_err(|e| rex_error_response(&RexError::Database(e)))?;
    if !exists {
        return Err(rex_error_response(&RexError::WindowNotFound(window_id)));
    }

    let records = rex::list_by_window(&state.pool, window_id)
        .await
        .map_err(|e| rex_error_response(&e))?;
    Ok(Json(records))
}

/// `GET /api/rex/:id` — fetch one REX record.
pub async fn get_rex(
    State(state): State<AppState>,
    Path(rex_id): Path<Uuid>,
) -> Result<Json<RexRecord>, ApiError> {
    let record = rex::get_rex(&state.pool, rex_id)
        .await
        .map_err(|e| rex_error_response(&e))?;
    Ok(Json(record))
}

pub(crate) fn rex_error_response(err: &RexError) -> ApiError {
    let (status, code) = match err {
        RexError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "E_VALIDATION"),
        RexError::WindowNotFound(_) => (StatusCode::NOT_FOUND, "E_WINDOW_NOT_FOUND"),
        RexError::RecordNotFound(_) => (StatusCode::NOT_FOUND, "E_REX_NOT_FOUND"),
        RexError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E_DATABASE"),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "rex service error");
        return (status, error_body(code, "internal error"));
    }
    (status, error_body(code, err.to_string()))
}

#[cfg(test)]
#[path = "rex_test.rs"]
mod tests;
