// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleet_audit::Cause;
use fleet_persistence::SqlitePersistence;

use crate::auth::{AuthenticatedActor, Role};
use crate::handlers;
use crate::request_response::{
    AllocateBookingRequest, RegisterDriverRequest, RegisterVehicleRequest, SubmitBookingRequest,
};

pub fn new_store() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::Admin)
}

pub fn create_test_supervisor() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("sup-1"), Role::Supervisor)
}

pub fn create_test_allocator() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("alloc-1"), Role::Allocator)
}

pub fn create_test_requester() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("alice"), Role::Requester)
}

pub fn create_test_driver_actor(identity: &str) -> AuthenticatedActor {
    AuthenticatedActor::new(identity.to_string(), Role::Driver)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn register_test_vehicle(store: &mut SqlitePersistence, plate: &str) -> i64 {
    let request: RegisterVehicleRequest = RegisterVehicleRequest {
        name: String::from("Hilux"),
        plate: plate.to_string(),
        registration_expiry: String::from("2026-06-30"),
        insurance_expiry: String::from("2026-03-31"),
        odometer_km: 35_000,
    };
    handlers::register_vehicle(store, request, &create_test_admin(), create_test_cause())
        .expect("register vehicle")
        .vehicle_id
}

pub fn register_test_driver(store: &mut SqlitePersistence, identity: &str) -> i64 {
    let request: RegisterDriverRequest = RegisterDriverRequest {
        identity: identity.to_string(),
        name: String::from("D. Mwale"),
        license_class: String::from("C"),
        license_expiry: String::from("2027-01-31"),
    };
    handlers::register_driver(store, request, &create_test_admin(), create_test_cause())
        .expect("register driver")
        .driver_id
}

pub fn create_submit_request() -> SubmitBookingRequest {
    SubmitBookingRequest {
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

pub fn submit_test_booking(store: &mut SqlitePersistence) -> i64 {
    handlers::submit_booking(
        store,
        create_submit_request(),
        &create_test_requester(),
        create_test_cause(),
    )
    .expect("submit booking")
    .booking_id
}

pub fn approved_booking(store: &mut SqlitePersistence, vehicle_id: i64, driver_id: i64) -> i64 {
    let booking_id: i64 = submit_test_booking(store);
    handlers::approve_booking(
        store,
        booking_id,
        &create_test_supervisor(),
        create_test_cause(),
    )
    .expect("approve booking");
    handlers::allocate_booking(
        store,
        booking_id,
        &AllocateBookingRequest {
            vehicle_id,
            driver_id,
        },
        &create_test_allocator(),
        create_test_cause(),
    )
    .expect("allocate booking");
    booking_id
}
