//! Maintenance window service — window CRUD and anomaly tracking.
//!
//! DESIGN
//! ======
//! Windows and anomalies are the read-mostly context that REX capture hangs
//! off. Status values are stored as text and round-tripped through typed
//! enums; a stored value that no longer parses is surfaced as a decode error
//! rather than silently coerced.

use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("maintenance window not found: {0}")]
    NotFound(Uuid),
    #[error("unknown status value in store: {0}")]
    UnknownStatus(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lifecycle status of a maintenance window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl WindowStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(Self::Planned),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Lifecycle status of an anomaly tracked against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyStatus {
    Open,
    InProgress,
    Treated,
    Closed,
}

impl AnomalyStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Treated => "treated",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "treated" => Some(Self::Treated),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Treated and closed anomalies count as resolved.
    #[must_use]
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Treated | Self::Closed)
    }
}

/// Row returned from window queries.
#[derive(Debug, Clone)]
pub struct WindowRow {
    pub id: Uuid,
    pub title: String,
    pub schedule_start: OffsetDateTime,
    pub schedule_end: OffsetDateTime,
    pub status: WindowStatus,
}

/// Row returned from anomaly queries.
#[derive(Debug, Clone)]
pub struct AnomalyRow {
    pub id: Uuid,
    pub window_id: Uuid,
    pub title: String,
    pub status: AnomalyStatus,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// WINDOW CRUD
// =============================================================================

/// Create a new maintenance window in `planned` status.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn create_window(
    pool: &PgPool,
    title: &str,
    schedule_start: OffsetDateTime,
    schedule_end: OffsetDateTime,
) -> Result<WindowRow, WindowError> {
    let id = Uuid::new_v4();
    let status = WindowStatus::Planned;
    sqlx::query(
        "INSERT INTO maintenance_windows (id, title, schedule_start, schedule_end, status)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(title)
    .bind(schedule_start)
    .bind(schedule_end)
    .bind(status.as_str())
    .execute(pool)
    .await?;

    tracing::info!(%id, title, "created maintenance window");
    Ok(WindowRow { id, title: title.to_string(), schedule_start, schedule_end, status })
}

/// List all windows, most recently scheduled first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_windows(pool: &PgPool) -> Result<Vec<WindowRow>, WindowError> {
    let rows = sqlx::query_as::<_, (Uuid, String, OffsetDateTime, OffsetDateTime, String)>(
        "SELECT id, title, schedule_start, schedule_end, status
         FROM maintenance_windows
         ORDER BY schedule_start DESC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(window_from_row).collect()
}

/// Fetch one window by ID.
///
/// # Errors
///
/// Returns `NotFound` if no window has the given ID.
pub async fn get_window(pool: &PgPool, window_id: Uuid) -> Result<WindowRow, WindowError> {
    let row = sqlx::query_as::<_, (Uuid, String, OffsetDateTime, OffsetDateTime, String)>(
        "SELECT id, title, schedule_start, schedule_end, status
         FROM maintenance_windows WHERE id = $1",
    )
    .bind(window_id)
    .fetch_optional(pool)
    .await?
    .ok_or(WindowError::NotFound(window_id))?;

    window_from_row(row)
}

/// Update a window's lifecycle status.
///
/// # Errors
///
/// Returns `NotFound` if no window has the given ID.
pub async fn set_window_status(
    pool: &PgPool,
    window_id: Uuid,
    status: WindowStatus,
) -> Result<(), WindowError> {
    let result = sqlx::query("UPDATE maintenance_windows SET status = $2 WHERE id = $1")
        .bind(window_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(WindowError::NotFound(window_id));
    }
    tracing::info!(%window_id, status = status.as_str(), "updated window status");
    Ok(())
}

/// True if the window exists.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn window_exists(pool: &PgPool, window_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM maintenance_windows WHERE id = $1)")
        .bind(window_id)
        .fetch_one(pool)
        .await
}

// =============================================================================
// ANOMALIES
// =============================================================================

/// Record an anomaly against a window.
///
/// # Errors
///
/// Returns `NotFound` if the window does not exist.
pub async fn record_anomaly(
    pool: &PgPool,
    window_id: Uuid,
    title: &str,
    status: AnomalyStatus,
    now: OffsetDateTime,
) -> Result<AnomalyRow, WindowError> {
    if !window_exists(pool, window_id).await? {
        return Err(WindowError::NotFound(window_id));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO anomalies (id, window_id, title, status, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(window_id)
    .bind(title)
    .bind(status.as_str())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(AnomalyRow { id, window_id, title: title.to_string(), status, created_at: now })
}

/// List a window's anomalies in creation order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_anomalies(pool: &PgPool, window_id: Uuid) -> Result<Vec<AnomalyRow>, WindowError> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, String, String, OffsetDateTime)>(
        "SELECT id, window_id, title, status, created_at
         FROM anomalies WHERE window_id = $1
         ORDER BY created_at ASC, id ASC",
    )
    .bind(window_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, window_id, title, status, created_at)| {
            let status =
                AnomalyStatus::from_str(&status).ok_or(WindowError::UnknownStatus(status))?;
            Ok(AnomalyRow { id, window_id, title, status, created_at })
        })
        .collect()
}

/// Count anomalies that have been treated or closed.
#[must_use]
pub fn resolved_anomaly_count(anomalies: &[AnomalyRow]) -> usize {
    anomalies.iter().filter(|a| a.status.is_resolved()).count()
}

// =============================================================================
// HELPERS
// =============================================================================

fn window_from_row(
    row: (Uuid, String, OffsetDateTime, OffsetDateTime, String),
) -> Result<WindowRow, WindowError> {
    let (id, title, schedule_start, schedule_end, status) = row;
    let status = WindowStatus::from_str(&status).ok_or(WindowError::UnknownStatus(status))?;
    Ok(WindowRow { id, title, schedule_start, schedule_end, status })
}

#[cfg(test)]
#[path = "window_test.rs"]
mod tests;
