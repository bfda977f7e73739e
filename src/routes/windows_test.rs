use super::*;
use time::macros::datetime;

#[test]
fn window_error_response_maps_not_found() {
    let id = Uuid::new_v4();
    let (status, body) = window_error_response(&window::WindowError::NotFound(id));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.0["error"], "E_WINDOW_NOT_FOUND");
    assert!(body.0["message"].as_str().unwrap().contains(&id.to_string()));
}

#[test]
fn window_error_response_hides_internal_details() {
    let err = window::WindowError::UnknownStatus("archived".into());
    let (status, body) = window_error_response(&err);
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.0["error"], "E_DATABASE");
    assert_eq!(body.0["message"], "internal error");
}

#[test]
fn window_detail_response_flattens_window_fields() {
    let row = WindowRow {
        id: Uuid::new_v4(),
        title: "Press line P-7 retrofit".into(),
        schedule_start: datetime!(2026-01-12 06:00 UTC),
        schedule_end: datetime!(2026-01-16 18:00 UTC),
        status: WindowStatus::Completed,
    };
    let detail = WindowDetailResponse {
        window: to_window_response(row.clone()),
        anomalies: vec![to_anomaly_response(AnomalyRow {
            id: Uuid::new_v4(),
            window_id: row.id,
            title: "misaligned guide rail".into(),
            status: AnomalyStatus::Treated,
            created_at: datetime!(2026-01-13 09:30 UTC),
        })],
    };

    let value = serde_json::to_value(&detail).unwrap();
    assert_eq!(value["title"], "Press line P-7 retrofit");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["anomalies"][0]["status"], "treated");
}

#[test]
fn to_window_response_renders_status_as_text() {
    let row = WindowRow {
        id: Uuid::new_v4(),
        title: "Crane inspection".into(),
        schedule_start: datetime!(2026-02-01 06:00 UTC),
        schedule_end: datetime!(2026-02-01 18:00 UTC),
        status: WindowStatus::InProgress,
    };
    let response = to_window_response(row);
    assert_eq!(response.status, "in_progress");
}
