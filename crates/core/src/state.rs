// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleet_audit::AuditEvent;
use fleet_domain::{Booking, BookingStatus, Trip, Vehicle};

/// The observed holds on a candidate vehicle/driver pair.
///
/// Availability is derived from current bookings and trips, never stored
/// on the resources themselves. A snapshot read outside a transaction is
/// advisory only; the persistence layer re-derives it inside the
/// transaction that commits the allocation or trip start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceAvailability {
    /// The booking holding a reservation on the vehicle, if any.
    pub vehicle_reserved_by: Option<i64>,
    /// The active trip using the vehicle, if any.
    pub vehicle_active_trip: Option<i64>,
    /// The booking holding a reservation on the driver, if any.
    pub driver_reserved_by: Option<i64>,
    /// The active trip the driver is on, if any.
    pub driver_active_trip: Option<i64>,
}

impl ResourceAvailability {
    /// An availability snapshot with no holds at all.
    #[must_use]
    pub const fn unheld() -> Self {
        Self {
            vehicle_reserved_by: None,
            vehicle_active_trip: None,
            driver_reserved_by: None,
            driver_active_trip: None,
        }
    }
}

/// The result of a successful booking submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSubmission {
    /// The new booking, not yet persisted.
    pub booking: Booking,
    /// The audit event recording the submission.
    pub audit_event: AuditEvent,
}

/// The result of a successful booking lifecycle transition.
///
/// Transitions are atomic: they either succeed completely or fail
/// without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTransition {
    /// The booking after the transition.
    pub booking: Booking,
    /// The status the booking held before the transition.
    ///
    /// The persistence layer uses this as the guard when committing the
    /// transition, so a concurrent change makes the commit fail instead
    /// of silently overwriting it.
    pub previous_status: BookingStatus,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of a successful trip start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripStart {
    /// The new active trip, not yet persisted.
    pub trip: Trip,
    /// The audit event recording the start.
    pub audit_event: AuditEvent,
}

/// The result of a successful trip completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripCompletion {
    /// The completed trip.
    pub trip: Trip,
    /// The vehicle with its odometer advanced to the end reading.
    pub vehicle: Vehicle,
    /// The audit event recording the completion.
    pub audit_event: AuditEvent,
}
