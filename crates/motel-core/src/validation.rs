//! # Validation Module
//!
//! Input validation for Motel Ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (serde)                                         │
//! │  └── Type validation (deserialization, enum names)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules, checked before any transaction opens              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (amounts > 0, occupation window)                │
//! │  ├── Partial UNIQUE index (single open till)                           │
//! │  └── Triggers (immutable ledger rows)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use motel_core::validation::{validate_amount_cents, validate_concept};
//!
//! assert!(validate_amount_cents("amount", 2500).is_ok());
//! assert!(validate_amount_cents("amount", 0).is_err());
//! assert!(validate_concept("Cleaning supplies").is_ok());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{MAX_CONCEPT_LENGTH, MAX_RENT_DURATION_HOURS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_VEHICLE_INFO_LENGTH: usize = 255;
const MAX_NAME_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 1000;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money amount that must be strictly positive.
///
/// Applies to payments, renewals, cash movements and room prices.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates the cash a till starts with. Zero is allowed.
pub fn validate_opening_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening_amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a rental or renewal block length in hours.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed MAX_RENT_DURATION_HOURS (168)
pub fn validate_rent_duration(hours: i64) -> ValidationResult<()> {
    if hours <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "rent_duration".to_string(),
        });
    }

    if hours > MAX_RENT_DURATION_HOURS {
        return Err(ValidationError::OutOfRange {
            field: "rent_duration".to_string(),
            min: 1,
            max: MAX_RENT_DURATION_HOURS,
        });
    }

    Ok(())
}

/// Validates a door number.
pub fn validate_room_number(number: i64) -> ValidationResult<()> {
    if number <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a cash movement concept: non-empty, at most 255 characters.
pub fn validate_concept(concept: &str) -> ValidationResult<()> {
    require_text("concept", concept, MAX_CONCEPT_LENGTH)
}

/// Validates the vehicle description attached to a payment.
/// Empty is accepted; only the length is bounded.
pub fn validate_vehicle_info(vehicle_info: &str) -> ValidationResult<()> {
    if vehicle_info.trim().chars().count() > MAX_VEHICLE_INFO_LENGTH {
        return Err(ValidationError::TooLong {
            field: "vehicle_info".to_string(),
            max: MAX_VEHICLE_INFO_LENGTH,
        });
    }

    Ok(())
}

pub fn validate_employee_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, MAX_NAME_LENGTH)
}

/// Validates optional till comments. Empty is fine.
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => {
            Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LENGTH,
            })
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Time Validators
// =============================================================================

/// A shift must end after it starts.
pub fn validate_shift_window(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<()> {
    if end <= start {
        return Err(ValidationError::InvalidFormat {
            field: "end_time".to_string(),
            reason: "must be after start_time".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("amount", 1).is_ok());
        assert!(validate_amount_cents("amount", 12345).is_ok());

        assert!(matches!(
            validate_amount_cents("amount", 0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_amount_cents("amount", -100).is_err());
    }

    #[test]
    fn test_validate_opening_amount() {
        assert!(validate_opening_amount(0).is_ok());
        assert!(validate_opening_amount(50000).is_ok());
        assert!(validate_opening_amount(-1).is_err());
    }

    #[test]
    fn test_validate_rent_duration() {
        assert!(validate_rent_duration(1).is_ok());
        assert!(validate_rent_duration(4).is_ok());
        assert!(validate_rent_duration(168).is_ok());

        assert!(validate_rent_duration(0).is_err());
        assert!(validate_rent_duration(-4).is_err());
        assert!(validate_rent_duration(169).is_err());
    }

    #[test]
    fn test_validate_concept() {
        assert!(validate_concept("Room-12 ABC-123 4h").is_ok());
        assert!(validate_concept(&"x".repeat(255)).is_ok());

        assert!(validate_concept("").is_err());
        assert!(validate_concept("   ").is_err());
        assert!(validate_concept(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_concept_counts_characters() {
        // 255 two-byte characters are still 255 characters
        assert!(validate_concept(&"ñ".repeat(255)).is_ok());
    }

    #[test]
    fn test_validate_vehicle_info() {
        assert!(validate_vehicle_info("Red sedan ABC-123").is_ok());
        assert!(validate_vehicle_info("").is_ok());
        assert!(validate_vehicle_info("   ").is_ok());
        assert!(validate_vehicle_info(&"x".repeat(MAX_VEHICLE_INFO_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_room_number() {
        assert!(validate_room_number(1).is_ok());
        assert!(validate_room_number(0).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("")).is_ok());
        assert!(validate_description(Some(&"x".repeat(1001))).is_err());
    }

    #[test]
    fn test_validate_shift_window() {
        let start = Utc.with_ymd_and_hms(2024, 8, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 8, 1, 16, 0, 0).unwrap();
        assert!(validate_shift_window(start, end).is_ok());
        assert!(validate_shift_window(end, start).is_err());
        assert!(validate_shift_window(start, start).is_err());
    }
}
