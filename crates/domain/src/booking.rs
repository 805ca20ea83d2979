// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking lifecycle states and transition logic.
//!
//! A booking moves through sequential human approvals before it may be
//! allocated a vehicle and driver. Transitions are caller-initiated only;
//! the system never advances a booking based on time alone.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Booking lifecycle states.
///
/// The only legal paths are
/// `pending_supervisor → pending_allocation → approved` and a jump to
/// `rejected` from either pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting the supervisor decision.
    PendingSupervisor,
    /// Supervisor approved; awaiting vehicle/driver allocation.
    PendingAllocation,
    /// Allocated and ready for trip execution (terminal success).
    Approved,
    /// Refused by a supervisor or allocator (terminal failure).
    Rejected,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingSupervisor => "pending_supervisor",
            Self::PendingAllocation => "pending_allocation",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from its string representation.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending_supervisor" => Ok(Self::PendingSupervisor),
            "pending_allocation" => Ok(Self::PendingAllocation),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// Transition attempts on a terminal state always fail; nothing in the
    /// lifecycle is an idempotent no-op, so callers must re-fetch current
    /// state before retrying.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::PendingSupervisor => {
                matches!(new_status, Self::PendingAllocation | Self::Rejected)
            }
            Self::PendingAllocation => matches!(new_status, Self::Approved | Self::Rejected),
            Self::Approved | Self::Rejected => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by booking lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Details of a vehicle/driver sourced outside the fleet.
///
/// Recorded instead of registry references when no internal resource is
/// available and the booking is not self-drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResource {
    /// The external provider description (must not be empty).
    pub provider: String,
    /// Optional free-text details (contract reference, contact, plate).
    pub details: Option<String>,
}

impl ExternalResource {
    /// Creates a new external resource record.
    #[must_use]
    pub const fn new(provider: String, details: Option<String>) -> Self {
        Self { provider, details }
    }
}

/// The raw, unvalidated input for a new booking.
///
/// Dates are ISO 8601 strings as received at the boundary; validation
/// parses and range-checks them before a `Booking` is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// The identity of the requester.
    pub requester: String,
    /// The requested start date (ISO 8601).
    pub start_date: String,
    /// The requested end date (ISO 8601, must not precede the start).
    pub end_date: String,
    /// The purpose of the trip (also the cost-center key).
    pub purpose: String,
    /// The destination.
    pub destination: String,
    /// The passenger count (must be at least 1).
    pub passengers: u32,
    /// Whether the requester intends to drive.
    pub self_drive: bool,
    /// An optional preferred vehicle, advisory only.
    pub preferred_vehicle: Option<i64>,
}

/// A requested trip moving through the approval and allocation workflow.
///
/// Bookings are never physically deleted; terminal records are retained
/// for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// The booking identifier (`None` until persisted).
    pub booking_id: Option<i64>,
    /// The identity of the requester.
    pub requester: String,
    /// The requested start date (ISO 8601).
    pub start_date: String,
    /// The requested end date (ISO 8601).
    pub end_date: String,
    /// The purpose of the trip.
    pub purpose: String,
    /// The destination.
    pub destination: String,
    /// The passenger count.
    pub passengers: u32,
    /// Whether the requester intends to drive.
    pub self_drive: bool,
    /// An optional preferred vehicle, advisory only.
    pub preferred_vehicle: Option<i64>,
    /// The allocated vehicle (set at allocation).
    pub vehicle_id: Option<i64>,
    /// The allocated driver (set at allocation).
    pub driver_id: Option<i64>,
    /// External resource details (set at external allocation).
    pub external: Option<ExternalResource>,
    /// The current lifecycle status.
    pub status: BookingStatus,
    /// The identity of the approving supervisor.
    pub supervisor: Option<String>,
    /// The rejection reason, if rejected.
    pub rejection_reason: Option<String>,
    /// When the booking was submitted (ISO 8601).
    pub created_at: String,
}

impl Booking {
    /// Builds a new booking in the initial `pending_supervisor` state
    /// from an already-validated draft.
    #[must_use]
    pub fn from_draft(draft: BookingDraft, created_at: String) -> Self {
        Self {
            booking_id: None,
            requester: draft.requester,
            start_date: draft.start_date,
            end_date: draft.end_date,
            purpose: draft.purpose,
            destination: draft.destination,
            passengers: draft.passengers,
            self_drive: draft.self_drive,
            preferred_vehicle: draft.preferred_vehicle,
            vehicle_id: None,
            driver_id: None,
            external: None,
            status: BookingStatus::PendingSupervisor,
            supervisor: None,
            rejection_reason: None,
            created_at,
        }
    }

    /// Returns a compact string description of the booking state for
    /// audit snapshots.
    #[must_use]
    pub fn snapshot_data(&self) -> String {
        format!(
            "booking_id={},status={},vehicle={},driver={},external={}",
            self.booking_id.map_or_else(|| String::from("new"), |id| id.to_string()),
            self.status.as_str(),
            self.vehicle_id.map_or_else(|| String::from("none"), |id| id.to_string()),
            self.driver_id.map_or_else(|| String::from("none"), |id| id.to_string()),
            self.external
                .as_ref()
                .map_or("none", |ext| ext.provider.as_str()),
        )
    }
}
