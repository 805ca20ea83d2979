// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the fleet booking system.
//!
//! This crate sits between the HTTP server and the core workflow. Each
//! handler authenticates nothing itself (the caller supplies an already
//! authenticated actor), enforces authorization, translates the request
//! into core transitions, persists the result, and maps every internal
//! error onto the API error contract.

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

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    allocate_booking, allocate_external, approve_booking, audit_trail, cost_report, end_trip,
    get_active_trip, get_booking, get_trip, list_bookings, list_driver_availability, list_drivers,
    list_trips, list_vehicle_availability, list_vehicles, register_driver, register_vehicle,
    reject_booking, start_trip, submit_booking,
};
pub use request_response::{
    AllocateBookingRequest, AllocateExternalRequest, CostReportRequest, DecisionResponse,
    DriverAvailability, EndTripRequest, EndTripResponse, RegisterDriverRequest,
    RegisterDriverResponse, RegisterVehicleRequest, RegisterVehicleResponse,
    RejectBookingRequest, ResourceState, StartTripRequest, StartTripResponse,
    SubmitBookingRequest, SubmitBookingResponse, VehicleAvailability,
};
