// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::state::{
    BookingSubmission, BookingTransition, ResourceAvailability, TripCompletion, TripStart,
};
use fleet_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot, Subject};
use fleet_domain::{
    Booking, BookingDraft, BookingStatus, DomainError, Driver, ExternalResource, Trip, TripStatus,
    Vehicle, validate_booking_draft, validate_end_odometer, validate_external_provider,
};

fn booking_subject(booking: &Booking) -> Subject {
    Subject::new(String::from("booking"), booking.booking_id)
}

fn trip_subject(trip: &Trip) -> Subject {
    Subject::new(String::from("trip"), trip.trip_id)
}

/// Validates a draft and produces a new booking in the initial
/// `pending_supervisor` state.
///
/// # Arguments
///
/// * `draft` - The raw booking input
/// * `created_at` - The submission timestamp (ISO 8601)
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(BookingSubmission)` containing the new booking and audit event
/// * `Err(CoreError)` if the draft is invalid
///
/// # Errors
///
/// Returns an error if the draft violates validation rules (missing
/// fields, unparseable dates, end before start, zero passengers).
pub fn submit_booking(
    draft: BookingDraft,
    created_at: String,
    actor: Actor,
    cause: Cause,
) -> Result<BookingSubmission, CoreError> {
    validate_booking_draft(&draft)?;

    let booking: Booking = Booking::from_draft(draft, created_at);

    let before: StateSnapshot = StateSnapshot::new(String::from("absent"));
    let after: StateSnapshot = StateSnapshot::new(booking.snapshot_data());
    let action: Action = Action::new(
        String::from("SubmitBooking"),
        Some(format!(
            "Submitted booking for {} ({} to {})",
            booking.destination, booking.start_date, booking.end_date
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        booking_subject(&booking),
        before,
        after,
    );

    Ok(BookingSubmission {
        booking,
        audit_event,
    })
}

/// Records the supervisor decision, moving a booking from
/// `pending_supervisor` to `pending_allocation`.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `supervisor` - The identity of the approving supervisor
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the booking is not awaiting the supervisor
/// decision.
pub fn approve_booking(
    booking: &Booking,
    supervisor: String,
    actor: Actor,
    cause: Cause,
) -> Result<BookingTransition, CoreError> {
    booking
        .status
        .validate_transition(BookingStatus::PendingAllocation)?;

    let before: StateSnapshot = StateSnapshot::new(booking.snapshot_data());

    let mut new_booking: Booking = booking.clone();
    new_booking.status = BookingStatus::PendingAllocation;
    new_booking.supervisor = Some(supervisor.clone());

    let after: StateSnapshot = StateSnapshot::new(new_booking.snapshot_data());
    let action: Action = Action::new(
        String::from("ApproveBooking"),
        Some(format!("Supervisor {supervisor} approved the request")),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        booking_subject(booking),
        before,
        after,
    );

    Ok(BookingTransition {
        booking: new_booking,
        previous_status: booking.status,
        audit_event,
    })
}

/// Rejects a booking from either pending state.
///
/// A rejection reason is mandatory; the terminal record must explain
/// itself without consulting the actor.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `reason` - The rejection reason (must not be empty)
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the reason is empty or the booking is already
/// terminal.
pub fn reject_booking(
    booking: &Booking,
    reason: String,
    actor: Actor,
    cause: Cause,
) -> Result<BookingTransition, CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::DomainViolation(DomainError::EmptyField {
            field: "reason",
        }));
    }

    booking.status.validate_transition(BookingStatus::Rejected)?;

    let before: StateSnapshot = StateSnapshot::new(booking.snapshot_data());

    let mut new_booking: Booking = booking.clone();
    new_booking.status = BookingStatus::Rejected;
    new_booking.rejection_reason = Some(reason.clone());

    let after: StateSnapshot = StateSnapshot::new(new_booking.snapshot_data());
    let action: Action = Action::new(String::from("RejectBooking"), Some(reason));
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        booking_subject(booking),
        before,
        after,
    );

    Ok(BookingTransition {
        booking: new_booking,
        previous_status: booking.status,
        audit_event,
    })
}

/// Checks a candidate resource pair against the observed holds.
fn check_pair_free(
    vehicle: &Vehicle,
    driver: &Driver,
    availability: ResourceAvailability,
) -> Result<(), DomainError> {
    let vehicle_id: i64 = vehicle.vehicle_id.unwrap_or_default();
    let driver_id: i64 = driver.driver_id.unwrap_or_default();

    if let Some(trip_id) = availability.vehicle_active_trip {
        return Err(DomainError::ResourceBusy {
            resource: "vehicle",
            id: vehicle_id,
            trip_id,
        });
    }
    if let Some(booking_id) = availability.vehicle_reserved_by {
        return Err(DomainError::ResourceUnavailable {
            resource: "vehicle",
            id: vehicle_id,
            held_by: format!("booking {booking_id}"),
        });
    }
    if let Some(trip_id) = availability.driver_active_trip {
        return Err(DomainError::ResourceBusy {
            resource: "driver",
            id: driver_id,
            trip_id,
        });
    }
    if let Some(booking_id) = availability.driver_reserved_by {
        return Err(DomainError::ResourceUnavailable {
            resource: "driver",
            id: driver_id,
            held_by: format!("booking {booking_id}"),
        });
    }
    Ok(())
}

/// Allocates an internal vehicle and driver to a booking, moving it from
/// `pending_allocation` to `approved`.
///
/// The availability snapshot passed here reflects the holds observed by
/// the caller; the persistence layer re-derives it inside the commit
/// transaction, so of two racing allocators exactly one wins.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `vehicle` - The candidate vehicle
/// * `driver` - The candidate driver
/// * `availability` - The observed holds on the pair
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The booking is not awaiting allocation
/// - Either resource is reserved by another booking
/// - Either resource is busy on an active trip
pub fn allocate_booking(
    booking: &Booking,
    vehicle: &Vehicle,
    driver: &Driver,
    availability: ResourceAvailability,
    actor: Actor,
    cause: Cause,
) -> Result<BookingTransition, CoreError> {
    booking.status.validate_transition(BookingStatus::Approved)?;

    check_pair_free(vehicle, driver, availability)?;

    let before: StateSnapshot = StateSnapshot::new(booking.snapshot_data());

    let mut new_booking: Booking = booking.clone();
    new_booking.status = BookingStatus::Approved;
    new_booking.vehicle_id = vehicle.vehicle_id;
    new_booking.driver_id = driver.driver_id;

    let after: StateSnapshot = StateSnapshot::new(new_booking.snapshot_data());
    let action: Action = Action::new(
        String::from("AllocateBooking"),
        Some(format!(
            "Allocated vehicle {} ({}) and driver {}",
            vehicle.vehicle_id.unwrap_or_default(),
            vehicle.plate,
            driver.driver_id.unwrap_or_default()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        booking_subject(booking),
        before,
        after,
    );

    Ok(BookingTransition {
        booking: new_booking,
        previous_status: booking.status,
        audit_event,
    })
}

/// Fulfils a booking with an externally-sourced vehicle, moving it from
/// `pending_allocation` to `approved` without holding any internal
/// resource.
///
/// # Arguments
///
/// * `booking` - The current booking (immutable)
/// * `provider` - The external provider description (must not be empty)
/// * `details` - Optional free-text details
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the provider description is empty or the booking
/// is not awaiting allocation.
pub fn allocate_external(
    booking: &Booking,
    provider: String,
    details: Option<String>,
    actor: Actor,
    cause: Cause,
) -> Result<BookingTransition, CoreError> {
    validate_external_provider(&provider)?;
    booking.status.validate_transition(BookingStatus::Approved)?;

    let before: StateSnapshot = StateSnapshot::new(booking.snapshot_data());

    let mut new_booking: Booking = booking.clone();
    new_booking.status = BookingStatus::Approved;
    new_booking.external = Some(ExternalResource::new(provider.clone(), details));

    let after: StateSnapshot = StateSnapshot::new(new_booking.snapshot_data());
    let action: Action = Action::new(
        String::from("AllocateExternal"),
        Some(format!("Fulfilled externally via {provider}")),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        booking_subject(booking),
        before,
        after,
    );

    Ok(BookingTransition {
        booking: new_booking,
        previous_status: booking.status,
        audit_event,
    })
}

/// Starts a trip on a vehicle/driver pair, optionally executing an
/// approved booking.
///
/// The trip's start odometer is copied from the vehicle's last known
/// reading. Reservation by the executing booking itself does not block
/// the start; a reservation held by any other booking does.
///
/// # Arguments
///
/// * `booking` - The booking being executed, if any
/// * `vehicle` - The vehicle being driven
/// * `driver` - The driver at the wheel
/// * `availability` - The observed holds on the pair
/// * `started_at` - The start timestamp (ISO 8601)
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The booking is present but not approved
/// - The booking was fulfilled externally or allocated a different pair
/// - Either resource is busy on an active trip
/// - Either resource is reserved by another booking
pub fn start_trip(
    booking: Option<&Booking>,
    vehicle: &Vehicle,
    driver: &Driver,
    availability: ResourceAvailability,
    started_at: String,
    actor: Actor,
    cause: Cause,
) -> Result<TripStart, CoreError> {
    let mut effective: ResourceAvailability = availability;

    if let Some(b) = booking {
        if b.status != BookingStatus::Approved {
            return Err(CoreError::DomainViolation(
                DomainError::InvalidStatusTransition {
                    from: b.status.as_str().to_string(),
                    to: String::from("active"),
                    reason: "trip may only start for an approved booking".to_string(),
                },
            ));
        }

        let booking_id: i64 = b.booking_id.unwrap_or_default();

        // An externally-fulfilled booking never executes an internal trip.
        if b.external.is_some()
            || b.vehicle_id != vehicle.vehicle_id
            || b.driver_id != driver.driver_id
        {
            return Err(CoreError::DomainViolation(DomainError::AllocationMismatch {
                booking_id,
            }));
        }

        // This booking's own reservation is the hold being consumed.
        if effective.vehicle_reserved_by == Some(booking_id) {
            effective.vehicle_reserved_by = None;
        }
        if effective.driver_reserved_by == Some(booking_id) {
            effective.driver_reserved_by = None;
        }
    }

    check_pair_free(vehicle, driver, effective)?;

    let trip: Trip = Trip {
        trip_id: None,
        vehicle_id: vehicle.vehicle_id.unwrap_or_default(),
        driver_id: driver.driver_id.unwrap_or_default(),
        booking_id: booking.and_then(|b| b.booking_id),
        start_odometer: vehicle.odometer_km,
        end_odometer: None,
        started_at,
        ended_at: None,
        status: TripStatus::Active,
    };

    let before: StateSnapshot = StateSnapshot::new(String::from("absent"));
    let after: StateSnapshot = StateSnapshot::new(trip.snapshot_data());
    let action: Action = Action::new(
        String::from("StartTrip"),
        Some(format!(
            "Started trip on vehicle {} at odometer {}",
            trip.vehicle_id, trip.start_odometer
        )),
    );
    let audit_event: AuditEvent =
        AuditEvent::new(actor, cause, action, trip_subject(&trip), before, after);

    Ok(TripStart { trip, audit_event })
}

/// Ends an active trip, recording the end odometer reading and advancing
/// the vehicle's last known reading.
///
/// # Arguments
///
/// * `trip` - The current trip (immutable)
/// * `vehicle` - The vehicle the trip runs on
/// * `end_odometer` - The reading at trip end
/// * `ended_at` - The end timestamp (ISO 8601)
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the trip is not active or the reading is below
/// the reading recorded at trip start.
pub fn end_trip(
    trip: &Trip,
    vehicle: &Vehicle,
    end_odometer: u32,
    ended_at: String,
    actor: Actor,
    cause: Cause,
) -> Result<TripCompletion, CoreError> {
    if trip.status.is_terminal() {
        return Err(CoreError::DomainViolation(
            DomainError::InvalidStatusTransition {
                from: trip.status.as_str().to_string(),
                to: TripStatus::Completed.as_str().to_string(),
                reason: "trip is already completed".to_string(),
            },
        ));
    }

    validate_end_odometer(trip.start_odometer, end_odometer)?;

    let before: StateSnapshot = StateSnapshot::new(trip.snapshot_data());

    let mut new_trip: Trip = trip.clone();
    new_trip.end_odometer = Some(end_odometer);
    new_trip.ended_at = Some(ended_at);
    new_trip.status = TripStatus::Completed;

    let mut new_vehicle: Vehicle = vehicle.clone();
    new_vehicle.odometer_km = end_odometer;

    let after: StateSnapshot = StateSnapshot::new(new_trip.snapshot_data());
    let action: Action = Action::new(
        String::from("EndTrip"),
        Some(format!(
            "Ended trip at odometer {end_odometer} ({} km driven)",
            new_trip.distance_km().unwrap_or_default()
        )),
    );
    let audit_event: AuditEvent =
        AuditEvent::new(actor, cause, action, trip_subject(trip), before, after);

    Ok(TripCompletion {
        trip: new_trip,
        vehicle: new_vehicle,
        audit_event,
    })
}
