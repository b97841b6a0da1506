//! Integration tests for RestRemoteApi
//!
//! Uses wiremock to stand in for the calendar service and verifies the
//! endpoint mapping plus the network-vs-rejection error normalization the
//! sync orchestrator's queueing policy depends on.

use chrono::NaiveDate;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agrisync_api::{ApiClient, RestRemoteApi};
use agrisync_core::domain::calendar::{Calendar, Event};
use agrisync_core::domain::newtypes::{CalendarId, EventId, OwnerId};
use agrisync_core::ports::{IRemoteApi, RemoteError};

// ============================================================================
// Test helpers
// ============================================================================

/// Starts a mock calendar service and returns an adapter pointed at it
async fn setup() -> (MockServer, RestRemoteApi) {
    let server = MockServer::start().await;
    let client = ApiClient::new(server.uri())
        .unwrap()
        .with_token("test-access-token");
    (server, RestRemoteApi::new(client))
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn local_calendar() -> Calendar {
    Calendar::new(
        OwnerId::new("farmer-1").unwrap(),
        "maize",
        date("2025-03-15"),
        date("2025-08-30"),
    )
    .unwrap()
}

fn canonical_calendar_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "owner": "farmer-1",
        "crop": "maize",
        "planting_date": "2025-03-15",
        "harvest_date": "2025-08-30",
        "events": []
    })
}

// ============================================================================
// Calendar endpoints
// ============================================================================

#[tokio::test]
async fn test_create_calendar_returns_canonical_record() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/calendars"))
        .and(header("authorization", "Bearer test-access-token"))
        .and(body_partial_json(serde_json::json!({"crop": "maize"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(canonical_calendar_json("cal-001")))
        .mount(&server)
        .await;

    let created = api.create_calendar(&local_calendar()).await.unwrap();
    assert_eq!(created.id.unwrap().as_str(), "cal-001");
    assert_eq!(created.crop, "maize");
}

#[tokio::test]
async fn test_update_calendar_puts_to_id_path() {
    let (server, api) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/calendars/cal-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canonical_calendar_json("cal-001")))
        .mount(&server)
        .await;

    let mut cal = local_calendar();
    cal.id = Some(CalendarId::new("cal-001").unwrap());

    let updated = api.update_calendar(&cal).await.unwrap();
    assert_eq!(updated.id.unwrap().as_str(), "cal-001");
}

#[tokio::test]
async fn test_update_calendar_without_id_is_rejected_locally() {
    let (_server, api) = setup().await;

    let err = api.update_calendar(&local_calendar()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn test_list_calendars() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/calendars"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            canonical_calendar_json("cal-001"),
            canonical_calendar_json("cal-002"),
        ])))
        .mount(&server)
        .await;

    let calendars = api.list_calendars().await.unwrap();
    assert_eq!(calendars.len(), 2);
    assert_eq!(calendars[1].id.as_ref().unwrap().as_str(), "cal-002");
}

// ============================================================================
// Event endpoints
// ============================================================================

#[tokio::test]
async fn test_create_event_returns_server_id() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/calendars/cal-001/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "evt-100",
            "calendar_id": "cal-001",
            "kind": "irrigation",
            "date": "2025-05-10"
        })))
        .mount(&server)
        .await;

    let cal_id = CalendarId::new("cal-001").unwrap();
    let event = Event::new(cal_id.clone(), "irrigation", date("2025-05-10")).unwrap();

    let created = api.create_event(&cal_id, &event).await.unwrap();
    assert_eq!(created.id.unwrap().as_str(), "evt-100");
}

#[tokio::test]
async fn test_update_event_puts_to_nested_path() {
    let (server, api) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/calendars/cal-001/events/evt-100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "evt-100",
            "calendar_id": "cal-001",
            "kind": "irrigation",
            "date": "2025-05-12"
        })))
        .mount(&server)
        .await;

    let cal_id = CalendarId::new("cal-001").unwrap();
    let mut event = Event::new(cal_id.clone(), "irrigation", date("2025-05-12")).unwrap();
    event.id = Some(EventId::new("evt-100").unwrap());

    let updated = api.update_event(&cal_id, &event).await.unwrap();
    assert_eq!(updated.date, date("2025-05-12"));
}

#[tokio::test]
async fn test_delete_event_success() {
    let (server, api) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/calendars/cal-001/events/evt-100"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let cal_id = CalendarId::new("cal-001").unwrap();
    let evt_id = EventId::new("evt-100").unwrap();
    api.delete_event(&cal_id, &evt_id).await.unwrap();
}

#[tokio::test]
async fn test_delete_event_missing_remotely_is_success() {
    let (server, api) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/calendars/cal-001/events/evt-gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cal_id = CalendarId::new("cal-001").unwrap();
    let evt_id = EventId::new("evt-gone").unwrap();

    // Idempotent delete: the record being gone already is not an error
    api.delete_event(&cal_id, &evt_id).await.unwrap();
}

#[tokio::test]
async fn test_delete_event_forbidden_is_rejected() {
    let (server, api) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/calendars/cal-001/events/evt-100"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let cal_id = CalendarId::new("cal-001").unwrap();
    let evt_id = EventId::new("evt-100").unwrap();

    let err = api.delete_event(&cal_id, &evt_id).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { status: 403, .. }));
}

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn test_validation_error_is_rejection_with_message() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/calendars"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "harvest date precedes planting date"
        })))
        .mount(&server)
        .await;

    let err = api.create_calendar(&local_calendar()).await.unwrap_err();
    match err {
        RemoteError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "harvest date precedes planting date");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_network_failure() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/calendars"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = api.create_calendar(&local_calendar()).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_throttling_is_network_failure() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/calendars"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = api.list_calendars().await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    // Nothing listens on this port
    let client = ApiClient::new("http://127.0.0.1:1")
        .unwrap()
        .with_token("test-access-token");
    let api = RestRemoteApi::new(client);

    let err = api.list_calendars().await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_malformed_success_body_is_network_failure() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/calendars"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api.list_calendars().await.unwrap_err();
    assert!(err.is_network());
}
