// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rusqlite::Connection;
use tracing::info;

use crate::error::PersistenceError;

/// Initializes the database schema.
///
/// The partial unique indexes on `trips` are the hard backstop for the
/// busy invariant: at most one `active` trip may reference a vehicle or
/// a driver, and each booking executes at most one trip.
///
/// # Arguments
///
/// * `conn` - The database connection to initialize
///
/// # Errors
///
/// Returns an error if schema creation fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), PersistenceError> {
    info!("Initializing database schema");

    // Enable foreign key enforcement
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute_batch(
        "
        -- Resource registry tables
        CREATE TABLE IF NOT EXISTS vehicles (
            vehicle_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            plate TEXT NOT NULL UNIQUE,
            registration_expiry TEXT NOT NULL,
            insurance_expiry TEXT NOT NULL,
            odometer_km INTEGER NOT NULL CHECK(odometer_km >= 0)
        );

        CREATE TABLE IF NOT EXISTS drivers (
            driver_id INTEGER PRIMARY KEY AUTOINCREMENT,
            identity TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            license_class TEXT NOT NULL,
            license_expiry TEXT NOT NULL
        );

        -- Workflow tables
        CREATE TABLE IF NOT EXISTS bookings (
            booking_id INTEGER PRIMARY KEY AUTOINCREMENT,
            requester TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            purpose TEXT NOT NULL,
            destination TEXT NOT NULL,
            passengers INTEGER NOT NULL CHECK(passengers >= 1),
            self_drive INTEGER NOT NULL DEFAULT 0 CHECK(self_drive IN (0, 1)),
            preferred_vehicle INTEGER,
            vehicle_id INTEGER,
            driver_id INTEGER,
            external_provider TEXT,
            external_details TEXT,
            status TEXT NOT NULL CHECK(status IN (
                'pending_supervisor', 'pending_allocation', 'approved', 'rejected'
            )),
            supervisor TEXT,
            rejection_reason TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(vehicle_id) REFERENCES vehicles(vehicle_id),
            FOREIGN KEY(driver_id) REFERENCES drivers(driver_id)
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_status
            ON bookings(status);

        CREATE TABLE IF NOT EXISTS trips (
            trip_id INTEGER PRIMARY KEY AUTOINCREMENT,
            vehicle_id INTEGER NOT NULL,
            driver_id INTEGER NOT NULL,
            booking_id INTEGER,
            start_odometer INTEGER NOT NULL CHECK(start_odometer >= 0),
            end_odometer INTEGER,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            status TEXT NOT NULL CHECK(status IN ('active', 'completed')),
            FOREIGN KEY(vehicle_id) REFERENCES vehicles(vehicle_id),
            FOREIGN KEY(driver_id) REFERENCES drivers(driver_id),
            FOREIGN KEY(booking_id) REFERENCES bookings(booking_id)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_trips_active_vehicle
            ON trips(vehicle_id) WHERE status = 'active';

        CREATE UNIQUE INDEX IF NOT EXISTS idx_trips_active_driver
            ON trips(driver_id) WHERE status = 'active';

        CREATE UNIQUE INDEX IF NOT EXISTS idx_trips_booking
            ON trips(booking_id) WHERE booking_id IS NOT NULL;

        -- Audit log
        CREATE TABLE IF NOT EXISTS audit_events (
            event_id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_kind TEXT NOT NULL,
            subject_id INTEGER,
            actor_json TEXT NOT NULL,
            cause_json TEXT NOT NULL,
            action_json TEXT NOT NULL,
            before_snapshot_json TEXT NOT NULL,
            after_snapshot_json TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_audit_events_subject
            ON audit_events(subject_kind, subject_id, event_id);
        ",
    )?;

    Ok(())
}

/// Enables WAL journal mode for better read concurrency.
///
/// # Errors
///
/// Returns an error if the pragma cannot be applied.
pub fn enable_wal_mode(conn: &Connection) -> Result<(), PersistenceError> {
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    info!(journal_mode = %mode, "Set journal mode");
    Ok(())
}

/// Verifies that foreign key enforcement is enabled.
///
/// If foreign keys are not enabled, the database cannot guarantee the
/// referential integrity constraints between bookings, trips, and the
/// resource registry.
///
/// # Arguments
///
/// * `conn` - The database connection to check
///
/// # Errors
///
/// Returns an error if foreign key enforcement is not enabled.
pub fn verify_foreign_key_enforcement(conn: &Connection) -> Result<(), PersistenceError> {
    let foreign_keys_enabled: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("Foreign key enforcement is enabled");
    Ok(())
}
