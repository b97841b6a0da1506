//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including identifier validation and date-range checks.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid identifier format or content
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Harvest date precedes the planting date
    #[error("Invalid season range: harvest {harvest} precedes planting {planting}")]
    InvalidSeasonRange {
        /// The planting date as supplied
        planting: String,
        /// The harvest date as supplied
        harvest: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidId("empty".to_string());
        assert_eq!(err.to_string(), "Invalid identifier: empty");

        let err = DomainError::InvalidSeasonRange {
            planting: "2025-05-01".to_string(),
            harvest: "2025-04-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid season range: harvest 2025-04-01 precedes planting 2025-05-01"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::ValidationFailed("x".to_string());
        let err2 = DomainError::ValidationFailed("x".to_string());
        let err3 = DomainError::ValidationFailed("y".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
