// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Initialization error.
    InitializationError(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored row could not be reconstructed into a domain value.
    ReconstructionError(String),
    /// The requested resource was not found.
    NotFound(String),
    /// A booking's status changed since the transition was computed.
    ///
    /// The guarded update found the booking no longer in the expected
    /// status, so the commit was refused. The caller must re-fetch and
    /// retry against current state.
    StaleStatus {
        /// The booking whose commit was refused.
        booking_id: i64,
        /// The status the transition expected to find.
        expected: String,
    },
    /// The trip is no longer active.
    TripNotActive(i64),
    /// A resource acquired a reservation between check and commit.
    ResourceReserved {
        /// The resource kind ("vehicle" or "driver").
        resource: String,
        /// The resource identifier.
        id: i64,
        /// The booking holding the reservation.
        held_by: i64,
    },
    /// A resource became busy on an active trip between check and commit.
    ResourceBusy {
        /// The resource kind ("vehicle" or "driver").
        resource: String,
        /// The resource identifier.
        id: i64,
        /// The active trip using the resource.
        trip_id: i64,
    },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::ReconstructionError(msg) => write!(f, "Reconstruction error: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::StaleStatus {
                booking_id,
                expected,
            } => write!(
                f,
                "Booking {booking_id} is no longer in status '{expected}'"
            ),
            Self::TripNotActive(trip_id) => write!(f, "Trip {trip_id} is not active"),
            Self::ResourceReserved {
                resource,
                id,
                held_by,
            } => write!(
                f,
                "{resource} {id} is reserved by booking {held_by}"
            ),
            Self::ResourceBusy {
                resource,
                id,
                trip_id,
            } => write!(f, "{resource} {id} is busy on active trip {trip_id}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
