// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::SqlitePersistence;
use fleet_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot, Subject};
use fleet_core::{BookingSubmission, BookingTransition, TripStart};
use fleet_domain::{Booking, BookingDraft, Driver, Vehicle};

pub fn new_store() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("alloc-1"), String::from("allocator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Workflow request"))
}

pub fn registry_event(kind: &str, action: &str) -> AuditEvent {
    AuditEvent::new(
        Actor::new(String::from("admin-1"), String::from("admin")),
        create_test_cause(),
        Action::new(String::from(action), None),
        Subject::new(String::from(kind), None),
        StateSnapshot::new(String::from("absent")),
        StateSnapshot::new(String::from("registered")),
    )
}

pub fn create_test_vehicle() -> Vehicle {
    Vehicle {
        vehicle_id: None,
        name: String::from("Hilux"),
        plate: String::from("ABZ 4821"),
        registration_expiry: String::from("2026-06-30"),
        insurance_expiry: String::from("2026-03-31"),
        odometer_km: 35_000,
    }
}

pub fn create_test_driver() -> Driver {
    Driver {
        driver_id: None,
        identity: String::from("driver-d1"),
        name: String::from("D. Mwale"),
        license_class: String::from("C"),
        license_expiry: String::from("2027-01-31"),
    }
}

pub fn add_vehicle(store: &mut SqlitePersistence, plate: &str) -> i64 {
    let mut vehicle: Vehicle = create_test_vehicle();
    vehicle.plate = plate.to_string();
    store
        .register_vehicle(&vehicle, &registry_event("vehicle", "RegisterVehicle"))
        .expect("register vehicle")
}

pub fn add_driver(store: &mut SqlitePersistence, identity: &str) -> i64 {
    let mut driver: Driver = create_test_driver();
    driver.identity = identity.to_string();
    store
        .register_driver(&driver, &registry_event("driver", "RegisterDriver"))
        .expect("register driver")
}

pub fn create_test_draft() -> BookingDraft {
    BookingDraft {
        requester: String::from("alice"),
        start_date: String::from("2025-11-01"),
        end_date: String::from("2025-11-03"),
        purpose: String::from("Field survey"),
        destination: String::from("Ndola"),
        passengers: 2,
        self_drive: false,
        preferred_vehicle: None,
    }
}

pub fn submit(store: &mut SqlitePersistence) -> i64 {
    let submission: BookingSubmission = fleet_core::submit_booking(
        create_test_draft(),
        String::from("2025-10-20T08:00:00Z"),
        create_test_actor(),
        create_test_cause(),
    )
    .expect("valid draft");
    store.persist_submission(&submission).expect("persist submission")
}

pub fn approve(store: &mut SqlitePersistence, booking_id: i64) {
    let booking: Booking = store
        .get_booking(booking_id)
        .expect("query booking")
        .expect("booking exists");
    let transition: BookingTransition = fleet_core::approve_booking(
        &booking,
        String::from("sup-1"),
        create_test_actor(),
        create_test_cause(),
    )
    .expect("approvable");
    store.persist_decision(&transition).expect("persist decision");
}

pub fn allocate(
    store: &mut SqlitePersistence,
    booking_id: i64,
    vehicle_id: i64,
    driver_id: i64,
) -> Result<(), crate::PersistenceError> {
    let booking: Booking = store
        .get_booking(booking_id)
        .expect("query booking")
        .expect("booking exists");
    let vehicle: Vehicle = store
        .get_vehicle(vehicle_id)
        .expect("query vehicle")
        .expect("vehicle exists");
    let driver: Driver = store
        .get_driver(driver_id)
        .expect("query driver")
        .expect("driver exists");
    let availability = store
        .resource_availability(vehicle_id, driver_id)
        .expect("availability");

    let transition: BookingTransition = fleet_core::allocate_booking(
        &booking,
        &vehicle,
        &driver,
        availability,
        create_test_actor(),
        create_test_cause(),
    )
    .map_err(|e| crate::PersistenceError::DatabaseError(e.to_string()))?;

    store.persist_allocation(&transition)
}

pub fn approved_booking(store: &mut SqlitePersistence, vehicle_id: i64, driver_id: i64) -> i64 {
    let booking_id: i64 = submit(store);
    approve(store, booking_id);
    allocate(store, booking_id, vehicle_id, driver_id).expect("allocate");
    booking_id
}

pub fn start_trip(
    store: &mut SqlitePersistence,
    booking_id: Option<i64>,
    vehicle_id: i64,
    driver_id: i64,
) -> Result<i64, crate::PersistenceError> {
    let booking: Option<Booking> = booking_id.map(|id| {
        store
            .get_booking(id)
            .expect("query booking")
            .expect("booking exists")
    });
    let vehicle: Vehicle = store
        .get_vehicle(vehicle_id)
        .expect("query vehicle")
        .expect("vehicle exists");
    let driver: Driver = store
        .get_driver(driver_id)
        .expect("query driver")
        .expect("driver exists");
    let availability = store
        .resource_availability(vehicle_id, driver_id)
        .expect("availability");

    let start: TripStart = fleet_core::start_trip(
        booking.as_ref(),
        &vehicle,
        &driver,
        availability,
        String::from("2025-11-01T07:30:00Z"),
        create_test_actor(),
        create_test_cause(),
    )
    .map_err(|e| crate::PersistenceError::DatabaseError(e.to_string()))?;

    store.persist_trip_start(&start)
}

pub fn end_trip(
    store: &mut SqlitePersistence,
    trip_id: i64,
    end_odometer: u32,
    ended_at: &str,
) -> Result<(), crate::PersistenceError> {
    let trip = store
        .get_trip(trip_id)
        .expect("query trip")
        .expect("trip exists");
    let vehicle: Vehicle = store
        .get_vehicle(trip.vehicle_id)
        .expect("query vehicle")
        .expect("vehicle exists");

    let completion = fleet_core::end_trip(
        &trip,
        &vehicle,
        end_odometer,
        ended_at.to_string(),
        create_test_actor(),
        create_test_cause(),
    )
    .map_err(|e| crate::PersistenceError::DatabaseError(e.to_string()))?;

    store.persist_trip_completion(&completion)
}
