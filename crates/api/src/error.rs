// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use fleet_core::CoreError;
use fleet_domain::DomainError;
use fleet_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent
/// the API contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The requested lifecycle transition is not valid from the current
    /// status.
    InvalidTransition {
        /// A human-readable description of the refused transition.
        message: String,
    },
    /// A resource is reserved by another booking.
    ResourceUnavailable {
        /// A human-readable description of the hold.
        message: String,
    },
    /// A resource is busy on an active trip.
    ResourceBusy {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An odometer reading was rejected.
    InvalidReading {
        /// A human-readable description of the rejected reading.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidTransition { message } => {
                write!(f, "Invalid transition: {message}")
            }
            Self::ResourceUnavailable { message } => {
                write!(f, "Resource unavailable: {message}")
            }
            Self::ResourceBusy { message } => {
                write!(f, "Resource busy: {message}")
            }
            Self::InvalidReading { message } => {
                write!(f, "Invalid reading: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not
/// leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::InvalidDateRange {
            start_date,
            end_date,
        } => ApiError::InvalidInput {
            field: String::from("end_date"),
            message: format!("End date {end_date} is before start date {start_date}"),
        },
        DomainError::InvalidPassengerCount { count } => ApiError::InvalidInput {
            field: String::from("passengers"),
            message: format!("Invalid passenger count: {count}. Must be at least 1"),
        },
        DomainError::EmptyField { field } => ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("Field cannot be empty"),
        },
        DomainError::InvalidProvider(msg) => ApiError::InvalidInput {
            field: String::from("provider"),
            message: msg,
        },
        DomainError::InvalidStatus(status) => ApiError::Internal {
            message: format!("Unrecognized status '{status}' in stored record"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => ApiError::InvalidTransition {
            message: format!("Cannot move from '{from}' to '{to}': {reason}"),
        },
        DomainError::BookingNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {id} does not exist"),
        },
        DomainError::VehicleNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Vehicle"),
            message: format!("Vehicle {id} does not exist"),
        },
        DomainError::DriverNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Driver"),
            message: format!("Driver {id} does not exist"),
        },
        DomainError::TripNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Trip"),
            message: format!("Trip {id} does not exist"),
        },
        DomainError::ResourceUnavailable {
            resource,
            id,
            held_by,
        } => ApiError::ResourceUnavailable {
            message: format!("{resource} {id} is reserved by {held_by}"),
        },
        DomainError::ResourceBusy {
            resource,
            id,
            trip_id,
        } => ApiError::ResourceBusy {
            message: format!("{resource} {id} is busy on active trip {trip_id}"),
        },
        DomainError::InvalidOdometerReading { reading, start } => ApiError::InvalidReading {
            message: format!(
                "End odometer {reading} is below the trip start reading {start}"
            ),
        },
        DomainError::AllocationMismatch { booking_id } => ApiError::InvalidTransition {
            message: format!(
                "Booking {booking_id} does not carry an internal allocation for this pair"
            ),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Commit-time conflicts surface as the same contract errors as their
/// check-time counterparts; callers cannot tell which side of the
/// transaction lost the race, and do not need to.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::StaleStatus {
            booking_id,
            expected,
        } => ApiError::InvalidTransition {
            message: format!("Booking {booking_id} is no longer in status '{expected}'"),
        },
        PersistenceError::TripNotActive(trip_id) => ApiError::InvalidTransition {
            message: format!("Trip {trip_id} is not active"),
        },
        PersistenceError::ResourceReserved {
            resource,
            id,
            held_by,
        } => ApiError::ResourceUnavailable {
            message: format!("{resource} {id} is reserved by booking {held_by}"),
        },
        PersistenceError::ResourceBusy {
            resource,
            id,
            trip_id,
        } => ApiError::ResourceBusy {
            message: format!("{resource} {id} is busy on active trip {trip_id}"),
        },
        PersistenceError::NotFound(message) => ApiError::NotFound {
            resource_type: String::from("Record"),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
