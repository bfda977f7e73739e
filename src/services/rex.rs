//! REX record service — validation, construction, and the record store.
//!
//! DESIGN
//! ======
//! A Return of Experience record is built entirely from submitted form input:
//! `build_record` validates and constructs without touching the database, and
//! `create_rex` persists the finished value. Records are append-only; nothing
//! in the API mutates or deletes them after insertion.
//!
//! Association with a maintenance window is an explicit `window_id` key, so
//! membership queries are exact rather than inferred from free text.

use sqlx::PgPool;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RexError {
    #[error("validation failed: {0}")]
    Validation(&'static str),
    #[error("maintenance window not found: {0}")]
    WindowNotFound(Uuid),
    #[error("rex record not found: {0}")]
    RecordNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A Return of Experience record. Mirrors the `rex_records` table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RexRecord {
    pub id: Uuid,
    pub window_id: Uuid,
    pub summary: String,
    pub root_cause: String,
    pub correction_action: String,
    pub preventive_action: String,
    pub lessons_learned: String,
    pub recommendations: String,
    /// Attachment references. Always empty at build time; kept so stored
    /// records from other producers round-trip intact.
    pub attachments: Vec<String>,
    pub created_by: String,
    pub created_at: OffsetDateTime,
}

/// Submitted form input for a new record. Optional fields default to empty.
#[derive(Debug, Clone, Default)]
pub struct RexDraft {
    pub summary: String,
    pub root_cause: String,
    pub correction_action: String,
    pub preventive_action: String,
    pub lessons_learned: String,
    pub recommendations: String,
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

/// Build a record from form input. Pure: no I/O, inputs untouched.
///
/// # Errors
///
/// Returns `Validation` when `summary` or `root_cause` is empty or
/// whitespace-only.
pub fn build_record(
    draft: &RexDraft,
    window_id: Uuid,
    created_by: &str,
    now: OffsetDateTime,
) -> Result<RexRecord, RexError> {
    if draft.summary.trim().is_empty() {
        return Err(RexError::Validation("summary is required"));
    }
    if draft.root_cause.trim().is_empty() {
        return Err(RexError::Validation("root cause is required"));
    }

    Ok(RexRecord {
        id: Uuid::new_v4(),
        window_id,
        summary: draft.summary.clone(),
        root_cause: draft.root_cause.clone(),
        correction_action: draft.correction_action.clone(),
        preventive_action: draft.preventive_action.clone(),
        lessons_learned: draft.lessons_learned.clone(),
        recommendations: draft.recommendations.clone(),
        attachments: Vec::new(),
        created_by: created_by.to_string(),
        created_at: now,
    })
}

// =============================================================================
// STORE
// =============================================================================

/// Persist a built record. Invoked exactly once per successful submission.
///
/// # Errors
///
/// Returns `WindowNotFound` if the target window does not exist.
pub async fn create_rex(pool: &PgPool, record: &RexRecord) -> Result<(), RexError> {
    if !super::window::window_exists(pool, record.window_id).await? {
        return Err(RexError::WindowNotFound(record.window_id));
    }

    sqlx::query(
        "INSERT INTO rex_records (id, window_id, summary, root_cause, correction_action,
                                  preventive_action, lessons_learned, recommendations,
                                  attachments, created_by, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(record.id)
    .bind(record.window_id)
    .bind(&record.summary)
    .bind(&record.root_cause)
    .bind(&record.correction_action)
    .bind(&record.preventive_action)
    .bind(&record.lessons_learned)
    .bind(&record.recommendations)
    .bind(Json(&record.attachments))
    .bind(&record.created_by)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    tracing::info!(rex_id = %record.id, window_id = %record.window_id, "created rex record");
    Ok(())
}

/// List a window's records ordered by creation time, then ID.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_by_window(pool: &PgPool, window_id: Uuid) -> Result<Vec<RexRecord>, RexError> {
    let rows = sqlx::query_as::<_, RexRow>(
        "SELECT id, window_id, summary, root_cause, correction_action, preventive_action,
                lessons_learned, recommendations, attachments, created_by, created_at
         FROM rex_records WHERE window_id = $1
         ORDER BY created_at ASC, id ASC",
    )
    .bind(window_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(rex_from_row).collect())
}

/// Fetch one record by ID.
///
/// # Errors
///
/// Returns `RecordNotFound` if no record has the given ID.
pub async fn get_rex(pool: &PgPool, rex_id: Uuid) -> Result<RexRecord, RexError> {
    let row = sqlx::query_as::<_, RexRow>(
        "SELECT id, window_id, summary, root_cause, correction_action, preventive_action,
                lessons_learned, recommendations, attachments, created_by, created_at
         FROM rex_records WHERE id = $1",
    )
    .bind(rex_id)
    .fetch_optional(pool)
    .await?
    .ok_or(RexError::RecordNotFound(rex_id))?;

    Ok(rex_from_row(row))
}

// =============================================================================
// ASSOCIATION
// =============================================================================

/// Records attached to the given window, preserving input ordering.
#[must_use]
pub fn filter_by_window(records: &[RexRecord], window_id: Uuid) -> Vec<RexRecord> {
    records
        .iter()
        .filter(|r| r.window_id == window_id)
        .cloned()
        .collect()
}

/// Creation time of the last record by input ordering. Does not sort.
#[must_use]
pub fn last_record_timestamp(records: &[RexRecord]) -> Option<OffsetDateTime> {
    records.last().map(|r| r.created_at)
}

// =============================================================================
// HELPERS
// =============================================================================

type RexRow = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    String,
    String,
    String,
    Json<Vec<String>>,
    String,
    OffsetDateTime,
);

fn rex_from_row(row: RexRow) -> RexRecord {
    let (
        id,
        window_id,
        summary,
        root_cause,
        correction_action,
        preventive_action,
        lessons_learned,
        recommendations,
        Json(attachments),
        created_by,
        created_at,
    ) = row;
    RexRecord {
        id,
        window_id,
        summary,
        root_cause,
        correction_action,
        preventive_action,
        lessons_learned,
        recommendations,
        attachments,
        created_by,
        created_at,
    }
}

#[cfg(test)]
#[path = "rex_test.rs"]
mod tests;
