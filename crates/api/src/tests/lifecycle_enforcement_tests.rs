// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for lifecycle and conflict enforcement at the API boundary.

use super::helpers::{
    approved_booking, create_submit_request, create_test_allocator, create_test_cause,
    create_test_driver_actor, create_test_requester, create_test_supervisor, new_store,
    register_test_driver, register_test_vehicle, submit_test_booking,
};
use crate::error::ApiError;
use crate::handlers;
use crate::request_response::{
    AllocateBookingRequest, AllocateExternalRequest, EndTripRequest, RejectBookingRequest,
    ResourceState, StartTripRequest, SubmitBookingRequest,
};
use fleet_persistence::SqlitePersistence;

#[test]
fn test_submit_with_inverted_dates_fails() {
    let mut store: SqlitePersistence = new_store();
    let mut request: SubmitBookingRequest = create_submit_request();
    request.start_date = String::from("2025-11-03");
    request.end_date = String::from("2025-11-01");

    let result = handlers::submit_booking(
        &mut store,
        request,
        &create_test_requester(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "end_date"
    ));
}

#[test]
fn test_allocate_before_approval_fails() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = register_test_driver(&mut store, "driver-d1");
    let booking_id: i64 = submit_test_booking(&mut store);

    let result = handlers::allocate_booking(
        &mut store,
        booking_id,
        &AllocateBookingRequest {
            vehicle_id,
            driver_id,
        },
        &create_test_allocator(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_approve_twice_fails() {
    let mut store: SqlitePersistence = new_store();
    let booking_id: i64 = submit_test_booking(&mut store);
    handlers::approve_booking(
        &mut store,
        booking_id,
        &create_test_supervisor(),
        create_test_cause(),
    )
    .unwrap();

    let result = handlers::approve_booking(
        &mut store,
        booking_id,
        &create_test_supervisor(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_reject_without_reason_fails() {
    let mut store: SqlitePersistence = new_store();
    let booking_id: i64 = submit_test_booking(&mut store);

    let result = handlers::reject_booking(
        &mut store,
        booking_id,
        RejectBookingRequest {
            reason: String::new(),
        },
        &create_test_supervisor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "reason"
    ));
}

#[test]
fn test_missing_booking_is_not_found() {
    let mut store: SqlitePersistence = new_store();

    let result = handlers::approve_booking(
        &mut store,
        999,
        &create_test_supervisor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::NotFound { ref resource_type, .. }) if resource_type == "Booking"
    ));
}

#[test]
fn test_allocating_reserved_pair_reports_unavailable() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = register_test_driver(&mut store, "driver-d1");
    approved_booking(&mut store, vehicle_id, driver_id);

    let second: i64 = submit_test_booking(&mut store);
    handlers::approve_booking(
        &mut store,
        second,
        &create_test_supervisor(),
        create_test_cause(),
    )
    .unwrap();

    let result = handlers::allocate_booking(
        &mut store,
        second,
        &AllocateBookingRequest {
            vehicle_id,
            driver_id,
        },
        &create_test_allocator(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::ResourceUnavailable { .. })));
}

#[test]
fn test_starting_trip_on_busy_pair_reports_busy() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_a: i64 = register_test_driver(&mut store, "driver-a");
    let driver_b: i64 = register_test_driver(&mut store, "driver-b");
    handlers::start_trip(
        &mut store,
        &StartTripRequest {
            booking_id: None,
            vehicle_id,
            driver_id: driver_a,
        },
        &create_test_driver_actor("driver-a"),
        create_test_cause(),
    )
    .unwrap();

    let result = handlers::start_trip(
        &mut store,
        &StartTripRequest {
            booking_id: None,
            vehicle_id,
            driver_id: driver_b,
        },
        &create_test_driver_actor("driver-b"),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::ResourceBusy { .. })));
}

#[test]
fn test_external_allocation_holds_no_resources() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = register_test_driver(&mut store, "driver-d1");

    let external: i64 = submit_test_booking(&mut store);
    handlers::approve_booking(
        &mut store,
        external,
        &create_test_supervisor(),
        create_test_cause(),
    )
    .unwrap();
    handlers::allocate_external(
        &mut store,
        external,
        AllocateExternalRequest {
            provider: String::from("Gemini Cabs"),
            details: None,
        },
        &create_test_allocator(),
        create_test_cause(),
    )
    .unwrap();

    // The fleet pair is still free for an internal allocation.
    let internal: i64 = approved_booking(&mut store, vehicle_id, driver_id);
    let booking = handlers::get_booking(&store, internal).unwrap();
    assert_eq!(booking.vehicle_id, Some(vehicle_id));
}

#[test]
fn test_external_booking_cannot_start_fleet_trip() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = register_test_driver(&mut store, "driver-d1");

    let booking_id: i64 = submit_test_booking(&mut store);
    handlers::approve_booking(
        &mut store,
        booking_id,
        &create_test_supervisor(),
        create_test_cause(),
    )
    .unwrap();
    handlers::allocate_external(
        &mut store,
        booking_id,
        AllocateExternalRequest {
            provider: String::from("Gemini Cabs"),
            details: None,
        },
        &create_test_allocator(),
        create_test_cause(),
    )
    .unwrap();

    let result = handlers::start_trip(
        &mut store,
        &StartTripRequest {
            booking_id: Some(booking_id),
            vehicle_id,
            driver_id,
        },
        &create_test_driver_actor("driver-d1"),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}

#[test]
fn test_availability_listing_reflects_reservations_and_trips() {
    let mut store: SqlitePersistence = new_store();
    let reserved_vehicle: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let busy_vehicle: i64 = register_test_vehicle(&mut store, "ABZ 9000");
    let free_vehicle: i64 = register_test_vehicle(&mut store, "ABZ 7777");
    let reserved_driver: i64 = register_test_driver(&mut store, "driver-d1");
    let busy_driver: i64 = register_test_driver(&mut store, "driver-d2");
    approved_booking(&mut store, reserved_vehicle, reserved_driver);
    handlers::start_trip(
        &mut store,
        &StartTripRequest {
            booking_id: None,
            vehicle_id: busy_vehicle,
            driver_id: busy_driver,
        },
        &create_test_driver_actor("driver-d2"),
        create_test_cause(),
    )
    .unwrap();

    let vehicles = handlers::list_vehicle_availability(&store).unwrap();
    assert_eq!(vehicles[0].state, ResourceState::Reserved);
    assert_eq!(vehicles[1].state, ResourceState::Busy);
    assert_eq!(vehicles[2].state, ResourceState::Free);
    assert_eq!(vehicles[2].vehicle.vehicle_id, Some(free_vehicle));

    let drivers = handlers::list_driver_availability(&store).unwrap();
    assert_eq!(drivers[0].state, ResourceState::Reserved);
    assert_eq!(drivers[1].state, ResourceState::Busy);
}

#[test]
fn test_end_trip_below_start_reading_is_rejected() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = register_test_driver(&mut store, "driver-d1");
    let trip_id: i64 = handlers::start_trip(
        &mut store,
        &StartTripRequest {
            booking_id: None,
            vehicle_id,
            driver_id,
        },
        &create_test_driver_actor("driver-d1"),
        create_test_cause(),
    )
    .unwrap()
    .trip_id;

    let result = handlers::end_trip(
        &mut store,
        trip_id,
        &EndTripRequest {
            end_odometer: 34_900,
        },
        &create_test_driver_actor("driver-d1"),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidReading { .. })));
}

#[test]
fn test_ending_completed_trip_fails() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = register_test_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = register_test_driver(&mut store, "driver-d1");
    let driver = create_test_driver_actor("driver-d1");
    let trip_id: i64 = handlers::start_trip(
        &mut store,
        &StartTripRequest {
            booking_id: None,
            vehicle_id,
            driver_id,
        },
        &driver,
        create_test_cause(),
    )
    .unwrap()
    .trip_id;
    handlers::end_trip(
        &mut store,
        trip_id,
        &EndTripRequest {
            end_odometer: 35_050,
        },
        &driver,
        create_test_cause(),
    )
    .unwrap();

    let result = handlers::end_trip(
        &mut store,
        trip_id,
        &EndTripRequest {
            end_odometer: 35_060,
        },
        &driver,
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::InvalidTransition { .. })));
}
