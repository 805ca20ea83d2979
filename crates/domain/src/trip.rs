// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip execution states and records.
//!
//! A trip is the physical execution of one approved booking. At any
//! instant a vehicle or driver is referenced by at most one `active`
//! trip; that is the busy flag the trip tracker maintains.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trip execution states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// The trip is underway; vehicle and driver are busy.
    Active,
    /// The trip has ended (terminal); the record is immutable.
    Completed,
}

impl TripStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from its string representation.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl FromStr for TripStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The physical execution of one approved booking.
///
/// The start odometer reading is copied from the vehicle's last known
/// reading when the trip starts; the end reading, once set, must not be
/// below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// The trip identifier (`None` until persisted).
    pub trip_id: Option<i64>,
    /// The vehicle being driven.
    pub vehicle_id: i64,
    /// The driver at the wheel.
    pub driver_id: i64,
    /// The booking this trip executes, if any.
    pub booking_id: Option<i64>,
    /// The vehicle odometer reading at trip start, in kilometres.
    pub start_odometer: u32,
    /// The odometer reading at trip end (`None` while active).
    pub end_odometer: Option<u32>,
    /// When the trip started (ISO 8601).
    pub started_at: String,
    /// When the trip ended (`None` while active).
    pub ended_at: Option<String>,
    /// The current execution status.
    pub status: TripStatus,
}

impl Trip {
    /// Returns the driven distance in kilometres, if the trip is
    /// completed and its readings are consistent.
    #[must_use]
    pub fn distance_km(&self) -> Option<u32> {
        self.end_odometer
            .and_then(|end| end.checked_sub(self.start_odometer))
    }

    /// Returns a compact string description of the trip state for audit
    /// snapshots.
    #[must_use]
    pub fn snapshot_data(&self) -> String {
        format!(
            "trip_id={},status={},vehicle={},driver={},odometer={}..{}",
            self.trip_id.map_or_else(|| String::from("new"), |id| id.to_string()),
            self.status.as_str(),
            self.vehicle_id,
            self.driver_id,
            self.start_odometer,
            self.end_odometer
                .map_or_else(|| String::from("open"), |end| end.to_string()),
        )
    }
}
