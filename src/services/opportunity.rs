//! REX opportunity detection.
//!
//! DESIGN
//! ======
//! A window is a capture opportunity once its work is over (completed, or its
//! planned period has elapsed) and it accumulated at least one anomaly — a
//! window without anomalies has nothing to learn from. Everything here is a
//! pure function of window state and a caller-supplied clock instant, so the
//! route layer decides what "now" means.

use time::OffsetDateTime;
use uuid::Uuid;

use super::rex::{self, RexRecord};
use super::window::{self, AnomalyRow, WindowRow, WindowStatus};

/// Presentation-facing summary of a window's REX situation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpportunitySummary {
    pub window_id: Uuid,
    /// True when a REX should be suggested for this window.
    pub eligible: bool,
    pub anomaly_count: usize,
    pub resolved_anomaly_count: usize,
    pub rex_count: usize,
    pub last_rex_at: Option<OffsetDateTime>,
    /// Client-side navigation target for the full REX creation view.
    pub compose_path: String,
}

/// True iff the window's work is over and it has at least one anomaly.
#[must_use]
pub fn is_opportunity(window: &WindowRow, anomaly_count: usize, now: OffsetDateTime) -> bool {
    let over = window.status == WindowStatus::Completed || window.schedule_end < now;
    over && anomaly_count > 0
}

/// Bundle the opportunity flag with the counts the caller renders alongside it.
/// `records` may span several windows; only those attached to `window` count.
#[must_use]
pub fn assess(
    window: &WindowRow,
    anomalies: &[AnomalyRow],
    records: &[RexRecord],
    now: OffsetDateTime,
) -> OpportunitySummary {
    let window_records = rex::filter_by_window(records, window.id);
    OpportunitySummary {
        window_id: window.id,
        eligible: is_opportunity(window, anomalies.len(), now),
        anomaly_count: anomalies.len(),
        resolved_anomaly_count: window::resolved_anomaly_count(anomalies),
        rex_count: window_records.len(),
        last_rex_at: rex::last_record_timestamp(&window_records),
        compose_path: compose_rex_path(window.id),
    }
}

/// Navigation target for the full REX editor, carrying the source context.
#[must_use]
pub fn compose_rex_path(window_id: Uuid) -> String {
    format!("/rex/new?source=maintenance&windowId={window_id}")
}

#[cfg(test)]
#[path = "opportunity_test.rs"]
mod tests;
