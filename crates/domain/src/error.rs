// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Failed to parse a date from a string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// The booking end date precedes the start date.
    InvalidDateRange {
        /// The requested start date.
        start_date: String,
        /// The requested end date.
        end_date: String,
    },
    /// The passenger count is below the minimum of one.
    InvalidPassengerCount {
        /// The invalid count value.
        count: u32,
    },
    /// A required text field is empty.
    EmptyField {
        /// The name of the empty field.
        field: &'static str,
    },
    /// The external resource provider description is empty.
    InvalidProvider(String),
    /// A status string could not be parsed.
    InvalidStatus(String),
    /// The requested status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// Booking does not exist.
    BookingNotFound(i64),
    /// Vehicle does not exist.
    VehicleNotFound(i64),
    /// Driver does not exist.
    DriverNotFound(i64),
    /// Trip does not exist.
    TripNotFound(i64),
    /// A resource is committed to another non-terminal booking or active trip.
    ResourceUnavailable {
        /// The resource kind ("vehicle" or "driver").
        resource: &'static str,
        /// The resource identifier.
        id: i64,
        /// What currently holds the resource.
        held_by: String,
    },
    /// A resource is referenced by an active trip.
    ResourceBusy {
        /// The resource kind ("vehicle" or "driver").
        resource: &'static str,
        /// The resource identifier.
        id: i64,
        /// The active trip holding the resource.
        trip_id: i64,
    },
    /// The end odometer reading is below the reading recorded at trip start.
    InvalidOdometerReading {
        /// The submitted end reading.
        reading: u32,
        /// The reading recorded at trip start.
        start: u32,
    },
    /// A trip start names a booking allocated to a different vehicle/driver pair.
    AllocationMismatch {
        /// The booking whose allocation does not match.
        booking_id: i64,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidDateRange {
                start_date,
                end_date,
            } => {
                write!(
                    f,
                    "End date {end_date} precedes start date {start_date}"
                )
            }
            Self::InvalidPassengerCount { count } => {
                write!(f, "Invalid passenger count: {count}. Must be at least 1")
            }
            Self::EmptyField { field } => write!(f, "Field '{field}' must not be empty"),
            Self::InvalidProvider(msg) => {
                write!(f, "Invalid external resource provider: {msg}")
            }
            Self::InvalidStatus(status) => write!(f, "Invalid status: '{status}'"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::BookingNotFound(id) => write!(f, "Booking {id} not found"),
            Self::VehicleNotFound(id) => write!(f, "Vehicle {id} not found"),
            Self::DriverNotFound(id) => write!(f, "Driver {id} not found"),
            Self::TripNotFound(id) => write!(f, "Trip {id} not found"),
            Self::ResourceUnavailable {
                resource,
                id,
                held_by,
            } => {
                write!(f, "{resource} {id} is unavailable: held by {held_by}")
            }
            Self::ResourceBusy {
                resource,
                id,
                trip_id,
            } => {
                write!(f, "{resource} {id} is busy in active trip {trip_id}")
            }
            Self::InvalidOdometerReading { reading, start } => {
                write!(
                    f,
                    "End odometer reading {reading} is below the start reading {start}"
                )
            }
            Self::AllocationMismatch { booking_id } => {
                write!(
                    f,
                    "Booking {booking_id} was not allocated this vehicle/driver pair"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
