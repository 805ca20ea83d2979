// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response DTOs for the API boundary.
//!
//! These are distinct from domain types and represent the API contract.
//! Read operations return domain types directly; the DTOs here cover
//! state-changing operations and derived views.

use fleet_domain::{Driver, Vehicle};
use serde::{Deserialize, Serialize};

/// API request to register a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterVehicleRequest {
    /// A human-readable vehicle name (e.g. "Hilux").
    pub name: String,
    /// The registration plate.
    pub plate: String,
    /// Registration expiry date (ISO 8601).
    pub registration_expiry: String,
    /// Insurance expiry date (ISO 8601).
    pub insurance_expiry: String,
    /// The current odometer reading in kilometres.
    pub odometer_km: u32,
}

/// API response for a successful vehicle registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterVehicleResponse {
    /// The vehicle ID assigned by the system.
    pub vehicle_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to register a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDriverRequest {
    /// The driver's login identity.
    pub identity: String,
    /// The driver's name.
    pub name: String,
    /// The driver's licence class.
    pub license_class: String,
    /// Licence expiry date (ISO 8601).
    pub license_expiry: String,
}

/// API response for a successful driver registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDriverResponse {
    /// The driver ID assigned by the system.
    pub driver_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to submit a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBookingRequest {
    /// The requesting staff member.
    pub requester: String,
    /// First day of the requested window (ISO 8601).
    pub start_date: String,
    /// Last day of the requested window (ISO 8601).
    pub end_date: String,
    /// The purpose of the trip; doubles as the cost centre.
    pub purpose: String,
    /// The destination.
    pub destination: String,
    /// The number of passengers.
    pub passengers: u32,
    /// Whether the requester will drive themselves.
    pub self_drive: bool,
    /// An optional preferred vehicle.
    pub preferred_vehicle: Option<i64>,
}

/// API response for a successful booking submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBookingResponse {
    /// The booking ID assigned by the system.
    pub booking_id: i64,
    /// The status of the new booking.
    pub status: String,
    /// A success message.
    pub message: String,
}

/// API response for a booking lifecycle decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// The booking ID.
    pub booking_id: i64,
    /// The booking's status after the decision.
    pub status: String,
    /// A success message.
    pub message: String,
}

/// API request to reject a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectBookingRequest {
    /// The reason the booking was rejected.
    pub reason: String,
}

/// API request to allocate an internal vehicle and driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateBookingRequest {
    /// The vehicle to assign.
    pub vehicle_id: i64,
    /// The driver to assign.
    pub driver_id: i64,
}

/// API request to allocate an external provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateExternalRequest {
    /// The external provider's name.
    pub provider: String,
    /// Optional free-form details (vehicle type, contact, ...).
    pub details: Option<String>,
}

/// API request to start a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTripRequest {
    /// The booking this trip executes, if any.
    pub booking_id: Option<i64>,
    /// The vehicle taking the trip.
    pub vehicle_id: i64,
    /// The driver taking the trip.
    pub driver_id: i64,
}

/// API response for a successful trip start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTripResponse {
    /// The trip ID assigned by the system.
    pub trip_id: i64,
    /// The odometer reading captured at departure.
    pub start_odometer: u32,
    /// A success message.
    pub message: String,
}

/// API request to end a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTripRequest {
    /// The odometer reading at return.
    pub end_odometer: u32,
}

/// API response for a successful trip completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTripResponse {
    /// The trip ID.
    pub trip_id: i64,
    /// The distance covered by the trip in kilometres.
    pub distance_km: u32,
    /// A success message.
    pub message: String,
}

/// API request for a cost report over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReportRequest {
    /// First day of the reporting window (ISO 8601, inclusive).
    pub from: String,
    /// Last day of the reporting window (ISO 8601, inclusive).
    pub to: String,
    /// Cost rate per kilometre; the system default applies when absent.
    pub rate_per_km: Option<f64>,
}

/// The derived state of a fleet resource for allocator screens.
///
/// Busy takes precedence over reserved: a resource on an active trip is
/// reported busy even if another approved booking also reserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    /// Neither reserved nor on an active trip.
    Free,
    /// Reserved by an approved booking whose trip has not started.
    Reserved,
    /// Referenced by an active trip.
    Busy,
}

/// A vehicle with its derived availability state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAvailability {
    /// The vehicle record.
    pub vehicle: Vehicle,
    /// The derived state.
    pub state: ResourceState,
}

/// A driver with their derived availability state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverAvailability {
    /// The driver record.
    pub driver: Driver,
    /// The derived state.
    pub state: ResourceState,
}
