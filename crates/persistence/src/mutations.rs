// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rusqlite::{Transaction, params};
use tracing::{debug, info};

use fleet_audit::AuditEvent;
use fleet_core::{
    BookingSubmission, BookingTransition, ResourceAvailability, TripCompletion, TripStart,
};
use fleet_domain::{Driver, Vehicle};

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::error::PersistenceError;
use crate::queries;

/// Persists an audit event within a transaction.
///
/// # Arguments
///
/// * `tx` - The active database transaction
/// * `event` - The audit event to persist
/// * `subject_id` - The subject row ID, once assigned
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    tx: &Transaction<'_>,
    event: &AuditEvent,
    subject_id: Option<i64>,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };
    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };
    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };
    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };
    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    tx.execute(
        "INSERT INTO audit_events (
            subject_kind, subject_id,
            actor_json, cause_json, action_json,
            before_snapshot_json, after_snapshot_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.subject.kind,
            subject_id.or(event.subject.id),
            serde_json::to_string(&actor_data)?,
            serde_json::to_string(&cause_data)?,
            serde_json::to_string(&action_data)?,
            serde_json::to_string(&before_data)?,
            serde_json::to_string(&after_data)?,
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

/// Inserts a vehicle into the registry along with its audit event.
///
/// # Returns
///
/// The vehicle ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails (including a duplicate plate).
pub fn insert_vehicle(
    tx: &Transaction<'_>,
    vehicle: &Vehicle,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    tx.execute(
        "INSERT INTO vehicles (name, plate, registration_expiry, insurance_expiry, odometer_km)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            vehicle.name,
            vehicle.plate,
            vehicle.registration_expiry,
            vehicle.insurance_expiry,
            vehicle.odometer_km,
        ],
    )?;
    let vehicle_id: i64 = tx.last_insert_rowid();

    let event_id: i64 = persist_audit_event(tx, event, Some(vehicle_id))?;
    debug!(vehicle_id, event_id, "Inserted vehicle");

    Ok(vehicle_id)
}

/// Inserts a driver into the registry along with its audit event.
///
/// # Returns
///
/// The driver ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails (including a duplicate identity).
pub fn insert_driver(
    tx: &Transaction<'_>,
    driver: &Driver,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    tx.execute(
        "INSERT INTO drivers (identity, name, license_class, license_expiry)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            driver.identity,
            driver.name,
            driver.license_class,
            driver.license_expiry,
        ],
    )?;
    let driver_id: i64 = tx.last_insert_rowid();

    let event_id: i64 = persist_audit_event(tx, event, Some(driver_id))?;
    debug!(driver_id, event_id, "Inserted driver");

    Ok(driver_id)
}

/// Persists a booking submission (booking row plus audit event).
///
/// # Returns
///
/// The booking ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn persist_submission(
    tx: &Transaction<'_>,
    submission: &BookingSubmission,
) -> Result<i64, PersistenceError> {
    let booking = &submission.booking;

    tx.execute(
        "INSERT INTO bookings (
            requester, start_date, end_date, purpose, destination, passengers,
            self_drive, preferred_vehicle, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            booking.requester,
            booking.start_date,
            booking.end_date,
            booking.purpose,
            booking.destination,
            booking.passengers,
            booking.self_drive,
            booking.preferred_vehicle,
            booking.status.as_str(),
            booking.created_at,
        ],
    )?;
    let booking_id: i64 = tx.last_insert_rowid();

    let event_id: i64 = persist_audit_event(tx, &submission.audit_event, Some(booking_id))?;
    info!(booking_id, event_id, "Persisted booking submission");

    Ok(booking_id)
}

/// Persists a supervisor decision, rejection, or external allocation.
///
/// The update is guarded on the status the transition was computed
/// against; if a concurrent change moved the booking first, the commit
/// is refused and nothing is written.
///
/// # Errors
///
/// Returns `StaleStatus` if the booking is no longer in the expected
/// status.
pub fn persist_decision(
    tx: &Transaction<'_>,
    transition: &BookingTransition,
) -> Result<(), PersistenceError> {
    let booking = &transition.booking;
    let booking_id: i64 = booking
        .booking_id
        .ok_or_else(|| PersistenceError::NotFound("Booking has no ID".to_string()))?;

    let (external_provider, external_details) = booking
        .external
        .as_ref()
        .map_or((None, None), |ext| {
            (Some(ext.provider.clone()), ext.details.clone())
        });

    let rows_affected: usize = tx.execute(
        "UPDATE bookings
         SET status = ?1, supervisor = ?2, rejection_reason = ?3,
             external_provider = ?4, external_details = ?5
         WHERE booking_id = ?6 AND status = ?7",
        params![
            booking.status.as_str(),
            booking.supervisor,
            booking.rejection_reason,
            external_provider,
            external_details,
            booking_id,
            transition.previous_status.as_str(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(PersistenceError::StaleStatus {
            booking_id,
            expected: transition.previous_status.as_str().to_string(),
        });
    }

    let event_id: i64 = persist_audit_event(tx, &transition.audit_event, Some(booking_id))?;
    info!(
        booking_id,
        event_id,
        status = booking.status.as_str(),
        "Persisted booking decision"
    );

    Ok(())
}

fn check_availability_unheld(
    availability: ResourceAvailability,
    vehicle_id: i64,
    driver_id: i64,
) -> Result<(), PersistenceError> {
    if let Some(trip_id) = availability.vehicle_active_trip {
        return Err(PersistenceError::ResourceBusy {
            resource: "vehicle".to_string(),
            id: vehicle_id,
            trip_id,
        });
    }
    if let Some(held_by) = availability.vehicle_reserved_by {
        return Err(PersistenceError::ResourceReserved {
            resource: "vehicle".to_string(),
            id: vehicle_id,
            held_by,
        });
    }
    if let Some(trip_id) = availability.driver_active_trip {
        return Err(PersistenceError::ResourceBusy {
            resource: "driver".to_string(),
            id: driver_id,
            trip_id,
        });
    }
    if let Some(held_by) = availability.driver_reserved_by {
        return Err(PersistenceError::ResourceReserved {
            resource: "driver".to_string(),
            id: driver_id,
            held_by,
        });
    }
    Ok(())
}

/// Persists an internal allocation.
///
/// Availability is re-derived inside this transaction before the guarded
/// update, so of two racing allocations of the same pair exactly one
/// commits; the other observes the hold or the stale status and fails
/// without side effects.
///
/// # Errors
///
/// Returns an error if either resource is held, or `StaleStatus` if the
/// booking already left `pending_allocation`.
pub fn persist_allocation(
    tx: &Transaction<'_>,
    transition: &BookingTransition,
) -> Result<(), PersistenceError> {
    let booking = &transition.booking;
    let booking_id: i64 = booking
        .booking_id
        .ok_or_else(|| PersistenceError::NotFound("Booking has no ID".to_string()))?;
    let vehicle_id: i64 = booking
        .vehicle_id
        .ok_or_else(|| PersistenceError::NotFound("Allocation has no vehicle".to_string()))?;
    let driver_id: i64 = booking
        .driver_id
        .ok_or_else(|| PersistenceError::NotFound("Allocation has no driver".to_string()))?;

    // Authoritative availability check inside the commit transaction.
    let availability: ResourceAvailability =
        queries::resource_availability(tx, vehicle_id, driver_id)?;
    check_availability_unheld(availability, vehicle_id, driver_id)?;

    let rows_affected: usize = tx.execute(
        "UPDATE bookings
         SET status = ?1, vehicle_id = ?2, driver_id = ?3
         WHERE booking_id = ?4 AND status = ?5",
        params![
            booking.status.as_str(),
            vehicle_id,
            driver_id,
            booking_id,
            transition.previous_status.as_str(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(PersistenceError::StaleStatus {
            booking_id,
            expected: transition.previous_status.as_str().to_string(),
        });
    }

    let event_id: i64 = persist_audit_event(tx, &transition.audit_event, Some(booking_id))?;
    info!(
        booking_id,
        vehicle_id, driver_id, event_id, "Persisted allocation"
    );

    Ok(())
}

/// Persists a trip start.
///
/// Busy and reservation holds are re-derived inside this transaction; a
/// reservation held by the executing booking itself is the hold being
/// consumed and does not block. The partial unique indexes on active
/// trips are the final backstop.
///
/// # Returns
///
/// The trip ID assigned by the database.
///
/// # Errors
///
/// Returns an error if either resource is busy or reserved by another
/// booking.
pub fn persist_trip_start(
    tx: &Transaction<'_>,
    start: &TripStart,
) -> Result<i64, PersistenceError> {
    let trip = &start.trip;

    let mut availability: ResourceAvailability =
        queries::resource_availability(tx, trip.vehicle_id, trip.driver_id)?;
    if let Some(booking_id) = trip.booking_id {
        if availability.vehicle_reserved_by == Some(booking_id) {
            availability.vehicle_reserved_by = None;
        }
        if availability.driver_reserved_by == Some(booking_id) {
            availability.driver_reserved_by = None;
        }
    }
    check_availability_unheld(availability, trip.vehicle_id, trip.driver_id)?;

    tx.execute(
        "INSERT INTO trips (
            vehicle_id, driver_id, booking_id, start_odometer, started_at, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            trip.vehicle_id,
            trip.driver_id,
            trip.booking_id,
            trip.start_odometer,
            trip.started_at,
            trip.status.as_str(),
        ],
    )?;
    let trip_id: i64 = tx.last_insert_rowid();

    let event_id: i64 = persist_audit_event(tx, &start.audit_event, Some(trip_id))?;
    info!(
        trip_id,
        vehicle_id = trip.vehicle_id,
        driver_id = trip.driver_id,
        event_id,
        "Persisted trip start"
    );

    Ok(trip_id)
}

/// Persists a trip completion and advances the vehicle odometer.
///
/// The trip update is guarded on `active` status; completing an already
/// completed trip is refused without side effects.
///
/// # Errors
///
/// Returns `TripNotActive` if the trip already completed.
pub fn persist_trip_completion(
    tx: &Transaction<'_>,
    completion: &TripCompletion,
) -> Result<(), PersistenceError> {
    let trip = &completion.trip;
    let trip_id: i64 = trip
        .trip_id
        .ok_or_else(|| PersistenceError::NotFound("Trip has no ID".to_string()))?;

    let rows_affected: usize = tx.execute(
        "UPDATE trips
         SET status = ?1, end_odometer = ?2, ended_at = ?3
         WHERE trip_id = ?4 AND status = 'active'",
        params![
            trip.status.as_str(),
            trip.end_odometer,
            trip.ended_at,
            trip_id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(PersistenceError::TripNotActive(trip_id));
    }

    tx.execute(
        "UPDATE vehicles SET odometer_km = ?1 WHERE vehicle_id = ?2",
        params![completion.vehicle.odometer_km, trip.vehicle_id],
    )?;

    let event_id: i64 = persist_audit_event(tx, &completion.audit_event, Some(trip_id))?;
    info!(
        trip_id,
        end_odometer = trip.end_odometer,
        event_id,
        "Persisted trip completion"
    );

    Ok(())
}
