//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// Server-assigned identifiers
// ============================================================================

/// Server-assigned identifier for a Calendar
///
/// Absent on records that have never been successfully created remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarId(String);

impl CalendarId {
    /// Create a CalendarId, rejecting empty strings
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId(
                "CalendarId cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CalendarId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CalendarId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Server-assigned identifier for an Event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create an EventId, rejecting empty strings
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId("EventId cannot be empty".to_string()));
        }
        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of the owning user account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an OwnerId, rejecting empty strings
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId("OwnerId cannot be empty".to_string()));
        }
        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// Client-side identifiers
// ============================================================================

/// Client-generated reference for a record that may not yet exist remotely
///
/// Serves as the local storage key until the server assigns a canonical
/// identifier. Stable for the lifetime of the local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRef(Uuid);

impl ClientRef {
    /// Create a new random ClientRef
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a ClientRef from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClientRef {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ClientRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid ClientRef: {e}")))
    }
}

/// Identifier of a pending-change entry
///
/// Assigned by the change log on append. Strictly increasing and unique
/// for the lifetime of the local store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChangeId(i64);

impl ChangeId {
    /// Create a ChangeId from a raw log sequence number
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw sequence number
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl Display for ChangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_id_valid() {
        let id = CalendarId::new("cal-001").unwrap();
        assert_eq!(id.as_str(), "cal-001");
        assert_eq!(id.to_string(), "cal-001");
    }

    #[test]
    fn test_calendar_id_empty_rejected() {
        assert!(CalendarId::new("").is_err());
        assert!(CalendarId::new("   ").is_err());
    }

    #[test]
    fn test_event_id_valid() {
        let id = EventId::new("evt-42").unwrap();
        assert_eq!(id.as_str(), "evt-42");
    }

    #[test]
    fn test_event_id_empty_rejected() {
        assert!(EventId::new("").is_err());
    }

    #[test]
    fn test_owner_id_from_str() {
        let id: OwnerId = "farmer-7".parse().unwrap();
        assert_eq!(id.as_str(), "farmer-7");
    }

    #[test]
    fn test_client_ref_unique() {
        let a = ClientRef::new();
        let b = ClientRef::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_client_ref_roundtrip() {
        let original = ClientRef::new();
        let parsed: ClientRef = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_client_ref_invalid() {
        let result: Result<ClientRef, _> = "not-a-uuid".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_change_id_ordering() {
        assert!(ChangeId::new(1) < ChangeId::new(2));
        assert_eq!(ChangeId::new(5).value(), 5);
    }

    #[test]
    fn test_serde_transparent() {
        let id = CalendarId::new("cal-9").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"cal-9\"");

        let back: CalendarId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
