// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Input validation for workflow operations.
//!
//! Validation failures are never retried automatically; they are
//! surfaced to the caller for correction.

use crate::booking::BookingDraft;
use crate::error::DomainError;
use time::Date;
use time::format_description::well_known::Iso8601;

/// Parses an ISO 8601 calendar date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid
/// ISO 8601 date.
pub fn parse_date(date_string: &str) -> Result<Date, DomainError> {
    Date::parse(date_string, &Iso8601::DEFAULT).map_err(|e| DomainError::DateParseError {
        date_string: date_string.to_string(),
        error: e.to_string(),
    })
}

/// Validates a booking draft before submission.
///
/// Checks that required text fields are present, that both dates parse,
/// that the end date does not precede the start date, and that the
/// passenger count is at least one.
///
/// # Errors
///
/// Returns the first validation failure encountered.
pub fn validate_booking_draft(draft: &BookingDraft) -> Result<(), DomainError> {
    if draft.requester.trim().is_empty() {
        return Err(DomainError::EmptyField { field: "requester" });
    }
    if draft.purpose.trim().is_empty() {
        return Err(DomainError::EmptyField { field: "purpose" });
    }
    if draft.destination.trim().is_empty() {
        return Err(DomainError::EmptyField {
            field: "destination",
        });
    }

    let start: Date = parse_date(&draft.start_date)?;
    let end: Date = parse_date(&draft.end_date)?;

    if end < start {
        return Err(DomainError::InvalidDateRange {
            start_date: draft.start_date.clone(),
            end_date: draft.end_date.clone(),
        });
    }

    if draft.passengers < 1 {
        return Err(DomainError::InvalidPassengerCount {
            count: draft.passengers,
        });
    }

    Ok(())
}

/// Validates an external resource provider description.
///
/// # Errors
///
/// Returns `DomainError::InvalidProvider` if the description is empty.
pub fn validate_external_provider(provider: &str) -> Result<(), DomainError> {
    if provider.trim().is_empty() {
        return Err(DomainError::InvalidProvider(String::from(
            "provider description must not be empty",
        )));
    }
    Ok(())
}

/// Validates an end odometer reading against the reading recorded at
/// trip start.
///
/// Readings are never silently clamped.
///
/// # Errors
///
/// Returns `DomainError::InvalidOdometerReading` if the end reading is
/// below the start reading.
pub const fn validate_end_odometer(start: u32, reading: u32) -> Result<(), DomainError> {
    if reading < start {
        return Err(DomainError::InvalidOdometerReading { reading, start });
    }
    Ok(())
}
