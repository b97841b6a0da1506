//! Calendar and Event domain entities
//!
//! A [`Calendar`] is one farming season for a single crop: planting date,
//! harvest date, and an embedded ordered list of dated activities
//! ([`Event`]s). The server is the source of truth for identifiers; records
//! created offline carry no server id until their queued creation drains.
//!
//! Both entities are overwritten whole on every successful operation —
//! there is no field-by-field merge anywhere in the system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{CalendarId, ClientRef, EventId, OwnerId};

// ============================================================================
// Event
// ============================================================================

/// A dated activity belonging to exactly one Calendar
///
/// Create, update, and delete are independent operations, each producing
/// its own pending-log entry when queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned identifier (None until first successful remote creation)
    pub id: Option<EventId>,
    /// Client-generated reference; the local storage key while `id` is absent
    #[serde(default)]
    pub client_ref: ClientRef,
    /// The calendar this event belongs to
    pub calendar_id: CalendarId,
    /// Activity kind (e.g. "irrigation", "fertilization", "pruning")
    pub kind: String,
    /// The day the activity is scheduled for
    pub date: NaiveDate,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Event {
    /// Creates a new local event with no server identifier
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationFailed` if `kind` is empty.
    pub fn new(
        calendar_id: CalendarId,
        kind: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let kind = kind.into();
        if kind.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "Event kind cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: None,
            client_ref: ClientRef::new(),
            calendar_id,
            kind,
            date,
            notes: None,
        })
    }

    /// Sets free-form notes (builder style)
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns true if the event has never been created remotely
    pub fn is_local_only(&self) -> bool {
        self.id.is_none()
    }

    /// The key this event is stored under locally
    ///
    /// The server identifier once known, otherwise the client reference.
    pub fn storage_key(&self) -> String {
        match &self.id {
            Some(id) => id.as_str().to_string(),
            None => self.client_ref.to_string(),
        }
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// A farming season record for a single crop
///
/// Created locally (possibly without a server-assigned identifier),
/// mutated by save operations, and superseded wholesale whenever a full
/// remote fetch succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Server-assigned identifier (None until first successful remote creation)
    pub id: Option<CalendarId>,
    /// Client-generated reference; the local storage key while `id` is absent
    #[serde(default)]
    pub client_ref: ClientRef,
    /// The account this season belongs to
    pub owner: OwnerId,
    /// Crop name (e.g. "maize", "coffee")
    pub crop: String,
    /// First day of the season
    pub planting_date: NaiveDate,
    /// Expected last day of the season
    pub harvest_date: NaiveDate,
    /// Embedded ordered list of season activities
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Calendar {
    /// Creates a new local calendar with no server identifier
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationFailed` if `crop` is empty, or
    /// `DomainError::InvalidSeasonRange` if the harvest date precedes the
    /// planting date.
    pub fn new(
        owner: OwnerId,
        crop: impl Into<String>,
        planting_date: NaiveDate,
        harvest_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let crop = crop.into();
        if crop.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "Crop name cannot be empty".to_string(),
            ));
        }
        if harvest_date < planting_date {
            return Err(DomainError::InvalidSeasonRange {
                planting: planting_date.to_string(),
                harvest: harvest_date.to_string(),
            });
        }

        Ok(Self {
            id: None,
            client_ref: ClientRef::new(),
            owner,
            crop,
            planting_date,
            harvest_date,
            events: Vec::new(),
        })
    }

    /// Returns true if the calendar has never been created remotely
    pub fn is_local_only(&self) -> bool {
        self.id.is_none()
    }

    /// The key this calendar is stored under locally
    ///
    /// The server identifier once known, otherwise the client reference.
    pub fn storage_key(&self) -> String {
        match &self.id {
            Some(id) => id.as_str().to_string(),
            None => self.client_ref.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn test_calendar() -> Calendar {
        Calendar::new(
            OwnerId::new("farmer-1").unwrap(),
            "maize",
            date("2025-03-15"),
            date("2025-08-30"),
        )
        .unwrap()
    }

    mod calendar_tests {
        use super::*;

        #[test]
        fn test_new() {
            let cal = test_calendar();
            assert!(cal.is_local_only());
            assert_eq!(cal.crop, "maize");
            assert!(cal.events.is_empty());
        }

        #[test]
        fn test_empty_crop_rejected() {
            let result = Calendar::new(
                OwnerId::new("farmer-1").unwrap(),
                "  ",
                date("2025-03-15"),
                date("2025-08-30"),
            );
            assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
        }

        #[test]
        fn test_inverted_season_rejected() {
            let result = Calendar::new(
                OwnerId::new("farmer-1").unwrap(),
                "maize",
                date("2025-08-30"),
                date("2025-03-15"),
            );
            assert!(matches!(
                result,
                Err(DomainError::InvalidSeasonRange { .. })
            ));
        }

        #[test]
        fn test_storage_key_prefers_server_id() {
            let mut cal = test_calendar();
            assert_eq!(cal.storage_key(), cal.client_ref.to_string());

            cal.id = Some(CalendarId::new("cal-77").unwrap());
            assert_eq!(cal.storage_key(), "cal-77");
        }

        #[test]
        fn test_serialization_roundtrip() {
            let cal = test_calendar();
            let json = serde_json::to_string(&cal).unwrap();
            let back: Calendar = serde_json::from_str(&json).unwrap();
            assert_eq!(back, cal);
        }

        #[test]
        fn test_deserialize_without_client_ref() {
            // Server payloads carry no client_ref; a fresh one is generated.
            let json = r#"{
                "id": "cal-1",
                "owner": "farmer-1",
                "crop": "coffee",
                "planting_date": "2025-04-01",
                "harvest_date": "2025-11-01"
            }"#;
            let cal: Calendar = serde_json::from_str(json).unwrap();
            assert_eq!(cal.id.unwrap().as_str(), "cal-1");
            assert!(cal.events.is_empty());
        }
    }

    mod event_tests {
        use super::*;

        #[test]
        fn test_new() {
            let event = Event::new(
                CalendarId::new("cal-1").unwrap(),
                "irrigation",
                date("2025-05-10"),
            )
            .unwrap();

            assert!(event.is_local_only());
            assert_eq!(event.kind, "irrigation");
            assert!(event.notes.is_none());
        }

        #[test]
        fn test_empty_kind_rejected() {
            let result = Event::new(CalendarId::new("cal-1").unwrap(), "", date("2025-05-10"));
            assert!(result.is_err());
        }

        #[test]
        fn test_with_notes() {
            let event = Event::new(
                CalendarId::new("cal-1").unwrap(),
                "fertilization",
                date("2025-06-01"),
            )
            .unwrap()
            .with_notes("north field only");

            assert_eq!(event.notes.as_deref(), Some("north field only"));
        }

        #[test]
        fn test_storage_key_prefers_server_id() {
            let mut event = Event::new(
                CalendarId::new("cal-1").unwrap(),
                "irrigation",
                date("2025-05-10"),
            )
            .unwrap();
            assert_eq!(event.storage_key(), event.client_ref.to_string());

            event.id = Some(EventId::new("evt-3").unwrap());
            assert_eq!(event.storage_key(), "evt-3");
        }
    }
}
