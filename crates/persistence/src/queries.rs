// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rusqlite::{Connection, OptionalExtension, params};
use std::str::FromStr;

use fleet_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot, Subject};
use fleet_core::ResourceAvailability;
use fleet_domain::{
    Booking, BookingStatus, CompletedTrip, Driver, ExternalResource, Trip, TripStatus, Vehicle,
};

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::error::PersistenceError;

const BOOKING_COLUMNS: &str = "booking_id, requester, start_date, end_date, purpose, destination,
         passengers, self_drive, preferred_vehicle, vehicle_id, driver_id,
         external_provider, external_details, status, supervisor, rejection_reason, created_at";

#[allow(clippy::type_complexity)]
fn booking_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(
    Option<i64>,
    String,
    String,
    String,
    String,
    String,
    u32,
    bool,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
        row.get(14)?,
        row.get(15)?,
        row.get(16)?,
    ))
}

#[allow(clippy::type_complexity)]
fn build_booking(
    fields: (
        Option<i64>,
        String,
        String,
        String,
        String,
        String,
        u32,
        bool,
        Option<i64>,
        Option<i64>,
        Option<i64>,
        Option<String>,
        Option<String>,
        String,
        Option<String>,
        Option<String>,
        String,
    ),
) -> Result<Booking, PersistenceError> {
    let (
        booking_id,
        requester,
        start_date,
        end_date,
        purpose,
        destination,
        passengers,
        self_drive,
        preferred_vehicle,
        vehicle_id,
        driver_id,
        external_provider,
        external_details,
        status_str,
        supervisor,
        rejection_reason,
        created_at,
    ) = fields;

    let status: BookingStatus = BookingStatus::from_str(&status_str)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
    let external: Option<ExternalResource> =
        external_provider.map(|provider| ExternalResource::new(provider, external_details));

    Ok(Booking {
        booking_id,
        requester,
        start_date,
        end_date,
        purpose,
        destination,
        passengers,
        self_drive,
        preferred_vehicle,
        vehicle_id,
        driver_id,
        external,
        status,
        supervisor,
        rejection_reason,
        created_at,
    })
}

/// Retrieves a booking by ID.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn get_booking(
    conn: &Connection,
    booking_id: i64,
) -> Result<Option<Booking>, PersistenceError> {
    let row = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = ?1"),
            params![booking_id],
            booking_row,
        )
        .optional()?;

    row.map(build_booking).transpose()
}

/// Lists bookings, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn list_bookings(
    conn: &Connection,
    status: Option<BookingStatus>,
) -> Result<Vec<Booking>, PersistenceError> {
    let mut bookings: Vec<Booking> = Vec::new();

    match status {
        Some(s) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY booking_id ASC"
            ))?;
            let rows = stmt.query_map(params![s.as_str()], booking_row)?;
            for row_result in rows {
                bookings.push(build_booking(row_result?)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_id ASC"
            ))?;
            let rows = stmt.query_map([], booking_row)?;
            for row_result in rows {
                bookings.push(build_booking(row_result?)?);
            }
        }
    }

    Ok(bookings)
}

fn vehicle_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        vehicle_id: row.get(0)?,
        name: row.get(1)?,
        plate: row.get(2)?,
        registration_expiry: row.get(3)?,
        insurance_expiry: row.get(4)?,
        odometer_km: row.get(5)?,
    })
}

/// Retrieves a vehicle by ID.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn get_vehicle(
    conn: &Connection,
    vehicle_id: i64,
) -> Result<Option<Vehicle>, PersistenceError> {
    conn.query_row(
        "SELECT vehicle_id, name, plate, registration_expiry, insurance_expiry, odometer_km
         FROM vehicles WHERE vehicle_id = ?1",
        params![vehicle_id],
        vehicle_row,
    )
    .optional()
    .map_err(Into::into)
}

/// Lists all registered vehicles.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn list_vehicles(conn: &Connection) -> Result<Vec<Vehicle>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT vehicle_id, name, plate, registration_expiry, insurance_expiry, odometer_km
         FROM vehicles ORDER BY vehicle_id ASC",
    )?;
    let rows = stmt.query_map([], vehicle_row)?;

    let mut vehicles: Vec<Vehicle> = Vec::new();
    for row_result in rows {
        vehicles.push(row_result?);
    }
    Ok(vehicles)
}

fn driver_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Driver> {
    Ok(Driver {
        driver_id: row.get(0)?,
        identity: row.get(1)?,
        name: row.get(2)?,
        license_class: row.get(3)?,
        license_expiry: row.get(4)?,
    })
}

/// Retrieves a driver by ID.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn get_driver(conn: &Connection, driver_id: i64) -> Result<Option<Driver>, PersistenceError> {
    conn.query_row(
        "SELECT driver_id, identity, name, license_class, license_expiry
         FROM drivers WHERE driver_id = ?1",
        params![driver_id],
        driver_row,
    )
    .optional()
    .map_err(Into::into)
}

/// Lists all registered drivers.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn list_drivers(conn: &Connection) -> Result<Vec<Driver>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT driver_id, identity, name, license_class, license_expiry
         FROM drivers ORDER BY driver_id ASC",
    )?;
    let rows = stmt.query_map([], driver_row)?;

    let mut drivers: Vec<Driver> = Vec::new();
    for row_result in rows {
        drivers.push(row_result?);
    }
    Ok(drivers)
}

fn trip_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Trip, String)> {
    let status_str: String = row.get(8)?;
    Ok((
        Trip {
            trip_id: row.get(0)?,
            vehicle_id: row.get(1)?,
            driver_id: row.get(2)?,
            booking_id: row.get(3)?,
            start_odometer: row.get(4)?,
            end_odometer: row.get(5)?,
            started_at: row.get(6)?,
            ended_at: row.get(7)?,
            status: TripStatus::Active,
        },
        status_str,
    ))
}

fn build_trip(pair: (Trip, String)) -> Result<Trip, PersistenceError> {
    let (mut trip, status_str) = pair;
    trip.status = TripStatus::from_str(&status_str)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
    Ok(trip)
}

const TRIP_COLUMNS: &str = "trip_id, vehicle_id, driver_id, booking_id, start_odometer,
         end_odometer, started_at, ended_at, status";

/// Retrieves a trip by ID.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn get_trip(conn: &Connection, trip_id: i64) -> Result<Option<Trip>, PersistenceError> {
    let row = conn
        .query_row(
            &format!("SELECT {TRIP_COLUMNS} FROM trips WHERE trip_id = ?1"),
            params![trip_id],
            trip_row,
        )
        .optional()?;

    row.map(build_trip).transpose()
}

/// Lists all trips.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn list_trips(conn: &Connection) -> Result<Vec<Trip>, PersistenceError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {TRIP_COLUMNS} FROM trips ORDER BY trip_id ASC"))?;
    let rows = stmt.query_map([], trip_row)?;

    let mut trips: Vec<Trip> = Vec::new();
    for row_result in rows {
        trips.push(build_trip(row_result?)?);
    }
    Ok(trips)
}

/// Retrieves the active trip for a driver, if any.
///
/// The partial unique index on active trips guarantees at most one row.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn active_trip_for_driver(
    conn: &Connection,
    driver_id: i64,
) -> Result<Option<Trip>, PersistenceError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {TRIP_COLUMNS} FROM trips WHERE driver_id = ?1 AND status = 'active'"
            ),
            params![driver_id],
            trip_row,
        )
        .optional()?;

    row.map(build_trip).transpose()
}

/// Derives the current holds on a single vehicle: the reserving booking
/// (if any) and the active trip (if any).
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn vehicle_holds(
    conn: &Connection,
    vehicle_id: i64,
) -> Result<(Option<i64>, Option<i64>), PersistenceError> {
    let reserved_by: Option<i64> = conn
        .query_row(
            "SELECT booking_id FROM bookings
             WHERE status = 'approved' AND vehicle_id = ?1
               AND booking_id NOT IN (
                   SELECT booking_id FROM trips WHERE booking_id IS NOT NULL
               )
             LIMIT 1",
            params![vehicle_id],
            |row| row.get(0),
        )
        .optional()?;

    let active_trip: Option<i64> = conn
        .query_row(
            "SELECT trip_id FROM trips WHERE vehicle_id = ?1 AND status = 'active'",
            params![vehicle_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok((reserved_by, active_trip))
}

/// Derives the current holds on a single driver.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn driver_holds(
    conn: &Connection,
    driver_id: i64,
) -> Result<(Option<i64>, Option<i64>), PersistenceError> {
    let reserved_by: Option<i64> = conn
        .query_row(
            "SELECT booking_id FROM bookings
             WHERE status = 'approved' AND driver_id = ?1
               AND booking_id NOT IN (
                   SELECT booking_id FROM trips WHERE booking_id IS NOT NULL
               )
             LIMIT 1",
            params![driver_id],
            |row| row.get(0),
        )
        .optional()?;

    let active_trip: Option<i64> = conn
        .query_row(
            "SELECT trip_id FROM trips WHERE driver_id = ?1 AND status = 'active'",
            params![driver_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok((reserved_by, active_trip))
}

/// Derives the current holds on a vehicle/driver pair.
///
/// A resource is busy iff an active trip references it, and reserved iff
/// an approved booking references it whose trip has not started yet.
/// When called inside the transaction that commits an allocation or trip
/// start, this observation is authoritative for the commit.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn resource_availability(
    conn: &Connection,
    vehicle_id: i64,
    driver_id: i64,
) -> Result<ResourceAvailability, PersistenceError> {
    let (vehicle_reserved_by, vehicle_active_trip) = vehicle_holds(conn, vehicle_id)?;
    let (driver_reserved_by, driver_active_trip) = driver_holds(conn, driver_id)?;

    Ok(ResourceAvailability {
        vehicle_reserved_by,
        vehicle_active_trip,
        driver_reserved_by,
        driver_active_trip,
    })
}

/// Lists completed trips whose end date falls in the given window,
/// keyed by the purpose of their booking.
///
/// Trips without a booking fall into the `unassigned` bucket.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `from` - The window start date (ISO 8601, inclusive)
/// * `to` - The window end date (ISO 8601, inclusive)
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn completed_trips_between(
    conn: &Connection,
    from: &str,
    to: &str,
) -> Result<Vec<CompletedTrip>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT t.trip_id, t.start_odometer, t.end_odometer,
                COALESCE(b.purpose, 'unassigned')
         FROM trips t
         LEFT JOIN bookings b ON t.booking_id = b.booking_id
         WHERE t.status = 'completed'
           AND date(t.ended_at) >= date(?1)
           AND date(t.ended_at) <= date(?2)
         ORDER BY t.trip_id ASC",
    )?;

    let rows = stmt.query_map(params![from, to], |row| {
        Ok(CompletedTrip {
            trip_id: row.get(0)?,
            start_odometer: row.get(1)?,
            end_odometer: row.get(2)?,
            cost_center: row.get(3)?,
        })
    })?;

    let mut trips: Vec<CompletedTrip> = Vec::new();
    for row_result in rows {
        trips.push(row_result?);
    }
    Ok(trips)
}

fn audit_event_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(i64, String, Option<i64>, String, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn build_audit_event(
    fields: (i64, String, Option<i64>, String, String, String, String, String),
) -> Result<AuditEvent, PersistenceError> {
    let (
        event_id,
        subject_kind,
        subject_id,
        actor_json,
        cause_json,
        action_json,
        before_json,
        after_json,
    ) = fields;

    let actor_data: ActorData = serde_json::from_str(&actor_json)?;
    let cause_data: CauseData = serde_json::from_str(&cause_json)?;
    let action_data: ActionData = serde_json::from_str(&action_json)?;
    let before_data: StateSnapshotData = serde_json::from_str(&before_json)?;
    let after_data: StateSnapshotData = serde_json::from_str(&after_json)?;

    Ok(AuditEvent {
        event_id: Some(event_id),
        actor: Actor::new(actor_data.id, actor_data.actor_type),
        cause: Cause::new(cause_data.id, cause_data.description),
        action: Action::new(action_data.name, action_data.details),
        subject: Subject::new(subject_kind, subject_id),
        before: StateSnapshot::new(before_data.data),
        after: StateSnapshot::new(after_data.data),
    })
}

/// Retrieves the ordered audit trail for a subject.
///
/// When `subject_id` is `None`, all events of the given kind are
/// returned.
///
/// # Errors
///
/// Returns an error if events cannot be retrieved or deserialized.
pub fn get_audit_trail(
    conn: &Connection,
    subject_kind: &str,
    subject_id: Option<i64>,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let mut events: Vec<AuditEvent> = Vec::new();

    match subject_id {
        Some(id) => {
            let mut stmt = conn.prepare(
                "SELECT event_id, subject_kind, subject_id, actor_json, cause_json, action_json,
                        before_snapshot_json, after_snapshot_json
                 FROM audit_events
                 WHERE subject_kind = ?1 AND subject_id = ?2
                 ORDER BY event_id ASC",
            )?;
            let rows = stmt.query_map(params![subject_kind, id], audit_event_row)?;
            for row_result in rows {
                events.push(build_audit_event(row_result?)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT event_id, subject_kind, subject_id, actor_json, cause_json, action_json,
                        before_snapshot_json, after_snapshot_json
                 FROM audit_events
                 WHERE subject_kind = ?1
                 ORDER BY event_id ASC",
            )?;
            let rows = stmt.query_map(params![subject_kind], audit_event_row)?;
            for row_result in rows {
                events.push(build_audit_event(row_result?)?);
            }
        }
    }

    Ok(events)
}
