//! Integration tests for SqliteLocalStore and SqliteChangeLog
//!
//! These tests verify the ILocalStore and IChangeLog port contracts using
//! an in-memory SQLite database. Each test function creates a fresh
//! database to ensure test isolation.

use chrono::{NaiveDate, Utc};

use agrisync_core::domain::calendar::{Calendar, Event};
use agrisync_core::domain::newtypes::{CalendarId, ChangeId, EventId, OwnerId};
use agrisync_core::domain::pending::ChangeKind;
use agrisync_core::ports::{IChangeLog, ILocalStore};
use agrisync_store::{DatabasePool, SqliteChangeLog, SqliteLocalStore};

// ============================================================================
// Test helpers
// ============================================================================

/// Create a fresh in-memory store + change log for each test
async fn setup() -> (SqliteLocalStore, SqliteChangeLog) {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    (
        SqliteLocalStore::new(pool.pool().clone()),
        SqliteChangeLog::new(pool.pool().clone()),
    )
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn test_calendar(crop: &str) -> Calendar {
    Calendar::new(
        OwnerId::new("farmer-1").unwrap(),
        crop,
        date("2025-03-15"),
        date("2025-08-30"),
    )
    .unwrap()
}

fn synced_calendar(id: &str, crop: &str) -> Calendar {
    let mut cal = test_calendar(crop);
    cal.id = Some(CalendarId::new(id).unwrap());
    cal
}

fn test_event(calendar_id: &str, kind: &str, day: &str) -> Event {
    Event::new(CalendarId::new(calendar_id).unwrap(), kind, date(day)).unwrap()
}

// ============================================================================
// Calendar tests
// ============================================================================

#[tokio::test]
async fn test_put_and_get_calendar() {
    let (store, _) = setup().await;
    let cal = synced_calendar("cal-1", "maize");

    store.put_calendar(&cal).await.unwrap();

    let retrieved = store.get_calendar("cal-1").await.unwrap();
    assert_eq!(retrieved, Some(cal));
}

#[tokio::test]
async fn test_get_calendar_not_found() {
    let (store, _) = setup().await;

    let result = store.get_calendar("missing").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_put_calendar_overwrites_whole_record() {
    let (store, _) = setup().await;
    let mut cal = synced_calendar("cal-1", "maize");
    store.put_calendar(&cal).await.unwrap();

    // Same key, new content - no field-by-field merge
    cal.crop = "sorghum".to_string();
    cal.events = vec![test_event("cal-1", "irrigation", "2025-05-10")];
    store.put_calendar(&cal).await.unwrap();

    let retrieved = store.get_calendar("cal-1").await.unwrap().unwrap();
    assert_eq!(retrieved.crop, "sorghum");
    assert_eq!(retrieved.events.len(), 1);
}

#[tokio::test]
async fn test_local_only_calendar_keyed_by_client_ref() {
    let (store, _) = setup().await;
    let cal = test_calendar("coffee");
    let key = cal.storage_key();

    store.put_calendar(&cal).await.unwrap();

    let retrieved = store.get_calendar(&key).await.unwrap().unwrap();
    assert!(retrieved.is_local_only());
    assert_eq!(retrieved.client_ref, cal.client_ref);
}

#[tokio::test]
async fn test_calendars_for_owner_uses_index() {
    let (store, _) = setup().await;
    store
        .put_calendar(&synced_calendar("cal-1", "maize"))
        .await
        .unwrap();

    let mut other = synced_calendar("cal-2", "beans");
    other.owner = OwnerId::new("farmer-2").unwrap();
    store.put_calendar(&other).await.unwrap();

    let mine = store
        .calendars_for_owner(&OwnerId::new("farmer-1").unwrap())
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].crop, "maize");
}

#[tokio::test]
async fn test_delete_calendar_idempotent() {
    let (store, _) = setup().await;
    store
        .put_calendar(&synced_calendar("cal-1", "maize"))
        .await
        .unwrap();

    store.delete_calendar("cal-1").await.unwrap();
    assert!(store.get_calendar("cal-1").await.unwrap().is_none());

    // Second delete of the same key is a no-op, not an error
    store.delete_calendar("cal-1").await.unwrap();
}

#[tokio::test]
async fn test_replace_calendars_wholesale() {
    let (store, _) = setup().await;
    store
        .put_calendar(&synced_calendar("cal-1", "maize"))
        .await
        .unwrap();
    store
        .put_calendar(&synced_calendar("cal-2", "beans"))
        .await
        .unwrap();

    // Authoritative refresh: cal-1 gone, cal-3 new
    let fresh = vec![
        synced_calendar("cal-2", "beans"),
        synced_calendar("cal-3", "coffee"),
    ];
    store.replace_calendars(&fresh).await.unwrap();

    let all = store.calendars().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(store.get_calendar("cal-1").await.unwrap().is_none());
    assert!(store.get_calendar("cal-3").await.unwrap().is_some());
}

#[tokio::test]
async fn test_replace_calendars_with_empty_list() {
    let (store, _) = setup().await;
    store
        .put_calendar(&synced_calendar("cal-1", "maize"))
        .await
        .unwrap();

    store.replace_calendars(&[]).await.unwrap();
    assert!(store.calendars().await.unwrap().is_empty());
}

// ============================================================================
// Event tests
// ============================================================================

#[tokio::test]
async fn test_put_and_get_event() {
    let (store, _) = setup().await;
    let mut event = test_event("cal-1", "irrigation", "2025-05-10");
    event.id = Some(EventId::new("evt-1").unwrap());

    store.put_event(&event).await.unwrap();

    let retrieved = store.get_event("evt-1").await.unwrap();
    assert_eq!(retrieved, Some(event));
}

#[tokio::test]
async fn test_events_for_calendar() {
    let (store, _) = setup().await;
    store
        .put_event(&test_event("cal-1", "irrigation", "2025-05-10"))
        .await
        .unwrap();
    store
        .put_event(&test_event("cal-1", "pruning", "2025-06-01"))
        .await
        .unwrap();
    store
        .put_event(&test_event("cal-2", "irrigation", "2025-05-10"))
        .await
        .unwrap();

    let events = store
        .events_for(&CalendarId::new("cal-1").unwrap())
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_events_on_date() {
    let (store, _) = setup().await;
    store
        .put_event(&test_event("cal-1", "irrigation", "2025-05-10"))
        .await
        .unwrap();
    store
        .put_event(&test_event("cal-1", "fertilization", "2025-05-10"))
        .await
        .unwrap();
    store
        .put_event(&test_event("cal-1", "pruning", "2025-06-01"))
        .await
        .unwrap();

    let events = store
        .events_on(&CalendarId::new("cal-1").unwrap(), date("2025-05-10"))
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_delete_event_idempotent() {
    let (store, _) = setup().await;
    let mut event = test_event("cal-1", "irrigation", "2025-05-10");
    event.id = Some(EventId::new("evt-1").unwrap());
    store.put_event(&event).await.unwrap();

    store.delete_event("evt-1").await.unwrap();
    assert!(store.get_event("evt-1").await.unwrap().is_none());

    store.delete_event("evt-1").await.unwrap();
    store.delete_event("never-existed").await.unwrap();
}

// ============================================================================
// Change log tests
// ============================================================================

#[tokio::test]
async fn test_append_assigns_increasing_ids() {
    let (_, log) = setup().await;

    let first = log
        .append(ChangeKind::CreateCalendar {
            calendar: test_calendar("maize"),
        })
        .await
        .unwrap();
    let second = log
        .append(ChangeKind::DeleteEvent {
            calendar_id: CalendarId::new("cal-1").unwrap(),
            event_id: EventId::new("evt-1").unwrap(),
        })
        .await
        .unwrap();

    assert!(second.id > first.id);
    assert_eq!(log.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_all_preserves_insertion_order() {
    let (_, log) = setup().await;
    let cal_id = CalendarId::new("cal-1").unwrap();

    log.append(ChangeKind::CreateEvent {
        calendar_id: cal_id.clone(),
        event: test_event("cal-1", "irrigation", "2025-05-10"),
    })
    .await
    .unwrap();
    log.append(ChangeKind::UpdateEvent {
        calendar_id: cal_id.clone(),
        event: test_event("cal-1", "irrigation", "2025-05-11"),
    })
    .await
    .unwrap();
    log.append(ChangeKind::DeleteEvent {
        calendar_id: cal_id,
        event_id: EventId::new("evt-1").unwrap(),
    })
    .await
    .unwrap();

    let entries = log.list_all().await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.kind.name()).collect();
    assert_eq!(names, vec!["create_event", "update_event", "delete_event"]);
}

#[tokio::test]
async fn test_entry_roundtrips_payload() {
    let (_, log) = setup().await;
    let event = test_event("cal-1", "irrigation", "2025-05-10");

    log.append(ChangeKind::CreateEvent {
        calendar_id: CalendarId::new("cal-1").unwrap(),
        event: event.clone(),
    })
    .await
    .unwrap();

    let entries = log.list_all().await.unwrap();
    match &entries[0].kind {
        ChangeKind::CreateEvent { event: stored, .. } => assert_eq!(stored, &event),
        other => panic!("unexpected kind: {}", other.name()),
    }
}

#[tokio::test]
async fn test_clear() {
    let (_, log) = setup().await;
    log.append(ChangeKind::CreateCalendar {
        calendar: test_calendar("maize"),
    })
    .await
    .unwrap();

    log.clear().await.unwrap();
    assert_eq!(log.count().await.unwrap(), 0);
    assert!(log.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_through_keeps_later_entries() {
    let (_, log) = setup().await;
    let cal_id = CalendarId::new("cal-1").unwrap();

    let first = log
        .append(ChangeKind::CreateEvent {
            calendar_id: cal_id.clone(),
            event: test_event("cal-1", "irrigation", "2025-05-10"),
        })
        .await
        .unwrap();
    let second = log
        .append(ChangeKind::DeleteEvent {
            calendar_id: cal_id,
            event_id: EventId::new("evt-2").unwrap(),
        })
        .await
        .unwrap();

    log.clear_through(first.id).await.unwrap();

    let remaining = log.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
}

#[tokio::test]
async fn test_ids_not_reused_after_clear() {
    let (_, log) = setup().await;

    let before = log
        .append(ChangeKind::CreateCalendar {
            calendar: test_calendar("maize"),
        })
        .await
        .unwrap();
    log.clear().await.unwrap();

    let after = log
        .append(ChangeKind::CreateCalendar {
            calendar: test_calendar("beans"),
        })
        .await
        .unwrap();

    // AUTOINCREMENT: identifiers stay strictly increasing across clears
    assert!(after.id > before.id);
}

#[tokio::test]
async fn test_clear_through_older_id_is_noop() {
    let (_, log) = setup().await;

    let entry = log
        .append(ChangeKind::CreateCalendar {
            calendar: test_calendar("maize"),
        })
        .await
        .unwrap();

    log.clear_through(ChangeId::new(entry.id.value() - 1))
        .await
        .unwrap();
    assert_eq!(log.count().await.unwrap(), 1);
}

// ============================================================================
// Sync bookkeeping tests
// ============================================================================

#[tokio::test]
async fn test_last_sync_initially_none() {
    let (store, _) = setup().await;
    assert!(store.last_sync().await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_and_read_sync_timestamp() {
    let (store, _) = setup().await;
    let at = Utc::now();

    store.record_sync(at).await.unwrap();

    let read = store.last_sync().await.unwrap().unwrap();
    // RFC 3339 roundtrip preserves the instant
    assert_eq!(read.timestamp_millis(), at.timestamp_millis());
}

#[tokio::test]
async fn test_record_sync_overwrites() {
    let (store, _) = setup().await;
    let first = Utc::now();
    store.record_sync(first).await.unwrap();

    let second = first + chrono::Duration::minutes(5);
    store.record_sync(second).await.unwrap();

    let read = store.last_sync().await.unwrap().unwrap();
    assert_eq!(read.timestamp_millis(), second.timestamp_millis());
}
