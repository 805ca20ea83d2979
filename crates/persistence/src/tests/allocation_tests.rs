// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for allocation persistence and the in-transaction availability
//! re-check.

use super::helpers::{
    add_driver, add_vehicle, allocate, approve, approved_booking, create_test_actor,
    create_test_cause, new_store, start_trip, submit,
};
use crate::{PersistenceError, SqlitePersistence};
use fleet_core::ResourceAvailability;
use fleet_domain::{Booking, BookingStatus};

#[test]
fn test_allocation_assigns_pair() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");

    let booking_id: i64 = approved_booking(&mut store, vehicle_id, driver_id);

    let booking: Booking = store.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Approved);
    assert_eq!(booking.vehicle_id, Some(vehicle_id));
    assert_eq!(booking.driver_id, Some(driver_id));

    let trail = store.get_audit_trail("booking", Some(booking_id)).unwrap();
    assert_eq!(trail[2].action.name, "AllocateBooking");
}

#[test]
fn test_allocation_of_reserved_pair_fails() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    approved_booking(&mut store, vehicle_id, driver_id);

    let second: i64 = submit(&mut store);
    approve(&mut store, second);

    let result = allocate(&mut store, second, vehicle_id, driver_id);

    assert!(result.is_err());
    let booking: Booking = store.get_booking(second).unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::PendingAllocation);
}

#[test]
fn test_stale_snapshot_allocation_fails_reserved() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");

    let first: i64 = submit(&mut store);
    approve(&mut store, first);
    let second: i64 = submit(&mut store);
    approve(&mut store, second);

    let vehicle = store.get_vehicle(vehicle_id).unwrap().unwrap();
    let driver = store.get_driver(driver_id).unwrap().unwrap();

    // Both transitions computed against the same pre-commit snapshot.
    let transition_a = fleet_core::allocate_booking(
        &store.get_booking(first).unwrap().unwrap(),
        &vehicle,
        &driver,
        ResourceAvailability::unheld(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    let transition_b = fleet_core::allocate_booking(
        &store.get_booking(second).unwrap().unwrap(),
        &vehicle,
        &driver,
        ResourceAvailability::unheld(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    store.persist_allocation(&transition_a).unwrap();
    let result = store.persist_allocation(&transition_b);

    assert_eq!(
        result,
        Err(PersistenceError::ResourceReserved {
            resource: String::from("vehicle"),
            id: vehicle_id,
            held_by: first,
        })
    );

    let loser: Booking = store.get_booking(second).unwrap().unwrap();
    assert_eq!(loser.status, BookingStatus::PendingAllocation);
    assert_eq!(loser.vehicle_id, None);
}

#[test]
fn test_allocation_of_busy_vehicle_fails() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    let first: i64 = approved_booking(&mut store, vehicle_id, driver_id);
    let trip_id: i64 = start_trip(&mut store, Some(first), vehicle_id, driver_id).unwrap();

    let second: i64 = submit(&mut store);
    approve(&mut store, second);

    let vehicle = store.get_vehicle(vehicle_id).unwrap().unwrap();
    let driver = store.get_driver(driver_id).unwrap().unwrap();
    let transition = fleet_core::allocate_booking(
        &store.get_booking(second).unwrap().unwrap(),
        &vehicle,
        &driver,
        ResourceAvailability::unheld(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    let result = store.persist_allocation(&transition);

    assert_eq!(
        result,
        Err(PersistenceError::ResourceBusy {
            resource: String::from("vehicle"),
            id: vehicle_id,
            trip_id,
        })
    );
}

#[test]
fn test_external_allocation_persists_provider() {
    let mut store: SqlitePersistence = new_store();
    let booking_id: i64 = submit(&mut store);
    approve(&mut store, booking_id);

    let booking: Booking = store.get_booking(booking_id).unwrap().unwrap();
    let transition = fleet_core::allocate_external(
        &booking,
        String::from("Gemini Cabs"),
        Some(String::from("Sedan, 4 seats")),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    store.persist_decision(&transition).unwrap();

    let booking: Booking = store.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Approved);
    assert_eq!(booking.vehicle_id, None);
    let external = booking.external.expect("external resource");
    assert_eq!(external.provider, "Gemini Cabs");
    assert_eq!(external.details, Some(String::from("Sedan, 4 seats")));
}

#[test]
fn test_distinct_pairs_allocate_independently() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_a: i64 = add_vehicle(&mut store, "ABZ 0001");
    let vehicle_b: i64 = add_vehicle(&mut store, "ABZ 0002");
    let driver_a: i64 = add_driver(&mut store, "driver-a");
    let driver_b: i64 = add_driver(&mut store, "driver-b");

    let first: i64 = approved_booking(&mut store, vehicle_a, driver_a);
    let second: i64 = approved_booking(&mut store, vehicle_b, driver_b);

    let booking_a: Booking = store.get_booking(first).unwrap().unwrap();
    let booking_b: Booking = store.get_booking(second).unwrap().unwrap();
    assert_eq!(booking_a.status, BookingStatus::Approved);
    assert_eq!(booking_b.status, BookingStatus::Approved);
}
