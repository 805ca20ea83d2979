// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the fleet booking system.
//!
//! This crate provides `SQLite` persistence for the resource registry,
//! the booking workflow, trips, and the audit log.
//!
//! ## Concurrency model
//!
//! Every state change commits inside a single transaction, and every
//! lifecycle update is guarded on the status the transition was computed
//! against. Availability for allocations and trip starts is re-derived
//! inside the committing transaction, so racing writers cannot both
//! succeed: the loser observes the hold (or the stale status) and fails
//! without side effects. Partial unique indexes on active trips are the
//! final backstop for the busy invariant.
//!
//! ## Testing
//!
//! Tests run against in-memory `SQLite` databases; each test gets its
//! own isolated instance.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

use rusqlite::Connection;
use std::path::Path;

use fleet_audit::AuditEvent;
use fleet_core::{
    BookingSubmission, BookingTransition, ResourceAvailability, TripCompletion, TripStart,
};
use fleet_domain::{Booking, BookingStatus, CompletedTrip, Driver, Trip, Vehicle};

mod bootstrap;
mod data_models;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

/// Persistence adapter for the fleet booking system.
pub struct SqlitePersistence {
    conn: Connection,
}

impl SqlitePersistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives its own database instance, which keeps tests
    /// isolated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open_in_memory()
            .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;

        bootstrap::initialize_schema(&conn)?;
        bootstrap::verify_foreign_key_enforcement(&conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open(path)
            .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;

        // WAL mode for better read concurrency
        bootstrap::enable_wal_mode(&conn)?;

        bootstrap::initialize_schema(&conn)?;
        bootstrap::verify_foreign_key_enforcement(&conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// This is a startup-time check required to ensure referential
    /// integrity constraints are enforced.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        bootstrap::verify_foreign_key_enforcement(&self.conn)
    }

    // ========================================================================
    // Resource Registry
    // ========================================================================

    /// Registers a vehicle along with its audit event.
    ///
    /// # Returns
    ///
    /// The vehicle ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails (including a duplicate
    /// plate).
    pub fn register_vehicle(
        &mut self,
        vehicle: &Vehicle,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        let tx = self.conn.transaction()?;
        let vehicle_id: i64 = mutations::insert_vehicle(&tx, vehicle, event)?;
        tx.commit()?;
        Ok(vehicle_id)
    }

    /// Registers a driver along with its audit event.
    ///
    /// # Returns
    ///
    /// The driver ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails (including a duplicate
    /// identity).
    pub fn register_driver(
        &mut self,
        driver: &Driver,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        let tx = self.conn.transaction()?;
        let driver_id: i64 = mutations::insert_driver(&tx, driver, event)?;
        tx.commit()?;
        Ok(driver_id)
    }

    /// Retrieves a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_vehicle(&self, vehicle_id: i64) -> Result<Option<Vehicle>, PersistenceError> {
        queries::get_vehicle(&self.conn, vehicle_id)
    }

    /// Lists all registered vehicles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_vehicles(&self) -> Result<Vec<Vehicle>, PersistenceError> {
        queries::list_vehicles(&self.conn)
    }

    /// Retrieves a driver by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_driver(&self, driver_id: i64) -> Result<Option<Driver>, PersistenceError> {
        queries::get_driver(&self.conn, driver_id)
    }

    /// Lists all registered drivers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_drivers(&self) -> Result<Vec<Driver>, PersistenceError> {
        queries::list_drivers(&self.conn)
    }

    // ========================================================================
    // Booking Workflow
    // ========================================================================

    /// Persists a booking submission.
    ///
    /// # Returns
    ///
    /// The booking ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_submission(
        &mut self,
        submission: &BookingSubmission,
    ) -> Result<i64, PersistenceError> {
        let tx = self.conn.transaction()?;
        let booking_id: i64 = mutations::persist_submission(&tx, submission)?;
        tx.commit()?;
        Ok(booking_id)
    }

    /// Persists a supervisor decision, rejection, or external
    /// allocation with a status-guarded update.
    ///
    /// # Errors
    ///
    /// Returns `StaleStatus` if the booking left the expected status
    /// since the transition was computed.
    pub fn persist_decision(
        &mut self,
        transition: &BookingTransition,
    ) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        mutations::persist_decision(&tx, transition)?;
        tx.commit()?;
        Ok(())
    }

    /// Persists an internal allocation, re-deriving availability inside
    /// the committing transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if either resource is held by another booking or
    /// busy on an active trip, or `StaleStatus` if the booking already
    /// left `pending_allocation`.
    pub fn persist_allocation(
        &mut self,
        transition: &BookingTransition,
    ) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        mutations::persist_allocation(&tx, transition)?;
        tx.commit()?;
        Ok(())
    }

    /// Retrieves a booking by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_booking(&self, booking_id: i64) -> Result<Option<Booking>, PersistenceError> {
        queries::get_booking(&self.conn, booking_id)
    }

    /// Lists bookings, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_bookings(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::list_bookings(&self.conn, status)
    }

    // ========================================================================
    // Trips
    // ========================================================================

    /// Persists a trip start, re-deriving holds inside the committing
    /// transaction.
    ///
    /// # Returns
    ///
    /// The trip ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if either resource is busy or reserved by
    /// another booking.
    pub fn persist_trip_start(&mut self, start: &TripStart) -> Result<i64, PersistenceError> {
        let tx = self.conn.transaction()?;
        let trip_id: i64 = mutations::persist_trip_start(&tx, start)?;
        tx.commit()?;
        Ok(trip_id)
    }

    /// Persists a trip completion and advances the vehicle odometer in
    /// the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `TripNotActive` if the trip already completed.
    pub fn persist_trip_completion(
        &mut self,
        completion: &TripCompletion,
    ) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        mutations::persist_trip_completion(&tx, completion)?;
        tx.commit()?;
        Ok(())
    }

    /// Retrieves a trip by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_trip(&self, trip_id: i64) -> Result<Option<Trip>, PersistenceError> {
        queries::get_trip(&self.conn, trip_id)
    }

    /// Lists all trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_trips(&self) -> Result<Vec<Trip>, PersistenceError> {
        queries::list_trips(&self.conn)
    }

    /// Retrieves the active trip for a driver, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn active_trip_for_driver(
        &self,
        driver_id: i64,
    ) -> Result<Option<Trip>, PersistenceError> {
        queries::active_trip_for_driver(&self.conn, driver_id)
    }

    // ========================================================================
    // Availability & Reporting
    // ========================================================================

    /// Derives the current holds on a vehicle/driver pair.
    ///
    /// Outside a committing transaction this observation is advisory;
    /// the mutation paths re-derive it before committing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn resource_availability(
        &self,
        vehicle_id: i64,
        driver_id: i64,
    ) -> Result<ResourceAvailability, PersistenceError> {
        queries::resource_availability(&self.conn, vehicle_id, driver_id)
    }

    /// Derives the current holds on a single vehicle as
    /// `(reserved_by, active_trip)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn vehicle_holds(
        &self,
        vehicle_id: i64,
    ) -> Result<(Option<i64>, Option<i64>), PersistenceError> {
        queries::vehicle_holds(&self.conn, vehicle_id)
    }

    /// Derives the current holds on a single driver as
    /// `(reserved_by, active_trip)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn driver_holds(
        &self,
        driver_id: i64,
    ) -> Result<(Option<i64>, Option<i64>), PersistenceError> {
        queries::driver_holds(&self.conn, driver_id)
    }

    /// Lists completed trips whose end date falls within the window,
    /// keyed by booking purpose (`unassigned` for bookingless trips).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn completed_trips_between(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<CompletedTrip>, PersistenceError> {
        queries::completed_trips_between(&self.conn, from, to)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Retrieves the ordered audit trail for a subject.
    ///
    /// # Arguments
    ///
    /// * `subject_kind` - The record kind ("booking", "trip", ...)
    /// * `subject_id` - The record ID, or `None` for all of the kind
    ///
    /// # Errors
    ///
    /// Returns an error if events cannot be retrieved or deserialized.
    pub fn get_audit_trail(
        &self,
        subject_kind: &str,
        subject_id: Option<i64>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::get_audit_trail(&self.conn, subject_kind, subject_id)
    }
}
