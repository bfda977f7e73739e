use super::*;
use crate::services::rex::RexDraft;
use crate::services::window::AnomalyStatus;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

fn sample_window(status: WindowStatus, schedule_end: OffsetDateTime) -> WindowRow {
    WindowRow {
        id: Uuid::new_v4(),
        title: "Kiln K-2 refractory repair".into(),
        schedule_start: datetime!(2026-02-20 06:00 UTC),
        schedule_end,
        status,
    }
}

fn anomaly(window_id: Uuid, status: AnomalyStatus) -> AnomalyRow {
    AnomalyRow {
        id: Uuid::new_v4(),
        window_id,
        title: "refractory spalling".into(),
        status,
        created_at: datetime!(2026-02-21 10:00 UTC),
    }
}

fn record(window_id: Uuid, created_at: OffsetDateTime) -> RexRecord {
    rex::build_record(
        &RexDraft {
            summary: "unexpected brick degradation".into(),
            root_cause: "thermal cycling beyond design envelope".into(),
            ..RexDraft::default()
        },
        window_id,
        "m.okafor",
        created_at,
    )
    .expect("valid draft should build")
}

#[test]
fn no_anomalies_is_never_an_opportunity() {
    // Completed AND past its end date — still nothing to report on.
    let window = sample_window(WindowStatus::Completed, datetime!(2026-02-25 18:00 UTC));
    assert!(!is_opportunity(&window, 0, NOW));
}

#[test]
fn completed_window_with_anomaly_is_an_opportunity_regardless_of_dates() {
    let window = sample_window(WindowStatus::Completed, datetime!(2026-06-30 18:00 UTC));
    assert!(window.schedule_end > NOW);
    assert!(is_opportunity(&window, 1, NOW));
}

#[test]
fn elapsed_window_with_anomalies_is_an_opportunity_even_if_not_completed() {
    let window = sample_window(WindowStatus::InProgress, datetime!(2026-02-25 18:00 UTC));
    assert!(is_opportunity(&window, 3, NOW));
}

#[test]
fn open_window_before_end_is_not_an_opportunity() {
    let window = sample_window(WindowStatus::InProgress, datetime!(2026-06-30 18:00 UTC));
    assert!(!is_opportunity(&window, 3, NOW));
}

#[test]
fn compose_rex_path_carries_source_and_window_id() {
    let window_id = Uuid::new_v4();
    assert_eq!(
        compose_rex_path(window_id),
        format!("/rex/new?source=maintenance&windowId={window_id}")
    );
}

#[test]
fn assess_bundles_counts_and_last_timestamp() {
    let window = sample_window(WindowStatus::Completed, datetime!(2026-02-25 18:00 UTC));
    let anomalies = vec![
        anomaly(window.id, AnomalyStatus::Closed),
        anomaly(window.id, AnomalyStatus::Open),
        anomaly(window.id, AnomalyStatus::Treated),
    ];
    let records = vec![
        record(window.id, datetime!(2026-02-26 09:00 UTC)),
        record(window.id, datetime!(2026-02-27 16:30 UTC)),
    ];

    let summary = assess(&window, &anomalies, &records, NOW);
    assert!(summary.eligible);
    assert_eq!(summary.window_id, window.id);
    assert_eq!(summary.anomaly_count, 3);
    assert_eq!(summary.resolved_anomaly_count, 2);
    assert_eq!(summary.rex_count, 2);
    assert_eq!(summary.last_rex_at, Some(datetime!(2026-02-27 16:30 UTC)));
    assert_eq!(summary.compose_path, compose_rex_path(window.id));
}

#[test]
fn assess_ignores_records_from_other_windows() {
    let window = sample_window(WindowStatus::Completed, datetime!(2026-02-25 18:00 UTC));
    let records = vec![
        record(window.id, datetime!(2026-02-26 09:00 UTC)),
        record(Uuid::new_v4(), datetime!(2026-02-28 09:00 UTC)),
    ];

    let summary = assess(&window, &[anomaly(window.id, AnomalyStatus::Open)], &records, NOW);
    assert_eq!(summary.rex_count, 1);
    assert_eq!(summary.last_rex_at, Some(datetime!(2026-02-26 09:00 UTC)));
}

#[test]
fn assess_with_no_records_has_no_last_timestamp() {
    let window = sample_window(WindowStatus::Planned, datetime!(2026-06-30 18:00 UTC));
    let summary = assess(&window, &[], &[], NOW);
    assert!(!summary.eligible);
    assert_eq!(summary.rex_count, 0);
    assert_eq!(summary.last_rex_at, None);
}
