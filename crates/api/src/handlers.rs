// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every state-changing handler follows the same shape: authorize,
//! fetch current records, compute the core transition, persist it, and
//! translate the outcome onto the API contract. The persistence layer
//! re-checks availability and status inside the committing transaction,
//! so a handler losing a race surfaces the conflict as an API error
//! without side effects.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use fleet_audit::{Action, AuditEvent, Cause, StateSnapshot, Subject};
use fleet_domain::{
    Booking, BookingDraft, BookingStatus, CompletedTrip, CostReport, DEFAULT_RATE_PER_KM,
    DomainError, Driver, Trip, Vehicle, build_cost_report, parse_date,
};
use fleet_persistence::SqlitePersistence;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AllocateBookingRequest, AllocateExternalRequest, CostReportRequest, DecisionResponse,
    DriverAvailability, EndTripRequest, EndTripResponse, RegisterDriverRequest,
    RegisterDriverResponse, RegisterVehicleRequest, RegisterVehicleResponse,
    RejectBookingRequest, ResourceState, StartTripRequest, StartTripResponse,
    SubmitBookingRequest, SubmitBookingResponse, VehicleAvailability,
};

/// Busy takes precedence over reserved.
const fn derive_resource_state(
    reserved_by: Option<i64>,
    active_trip: Option<i64>,
) -> ResourceState {
    match (active_trip, reserved_by) {
        (Some(_), _) => ResourceState::Busy,
        (None, Some(_)) => ResourceState::Reserved,
        (None, None) => ResourceState::Free,
    }
}

fn now_rfc3339() -> Result<String, ApiError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
}

fn fetch_booking(
    persistence: &SqlitePersistence,
    booking_id: i64,
) -> Result<Booking, ApiError> {
    persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::BookingNotFound(booking_id)))
}

fn fetch_vehicle(
    persistence: &SqlitePersistence,
    vehicle_id: i64,
) -> Result<Vehicle, ApiError> {
    persistence
        .get_vehicle(vehicle_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::VehicleNotFound(vehicle_id)))
}

fn fetch_driver(persistence: &SqlitePersistence, driver_id: i64) -> Result<Driver, ApiError> {
    persistence
        .get_driver(driver_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::DriverNotFound(driver_id)))
}

fn fetch_trip(persistence: &SqlitePersistence, trip_id: i64) -> Result<Trip, ApiError> {
    persistence
        .get_trip(trip_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::TripNotFound(trip_id)))
}

fn require_non_empty(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(translate_domain_error(DomainError::EmptyField { field }));
    }
    Ok(())
}

fn registry_event(
    actor: &AuthenticatedActor,
    cause: Cause,
    action: &str,
    kind: &str,
    after: String,
) -> AuditEvent {
    AuditEvent::new(
        actor.to_audit_actor(),
        cause,
        Action::new(action.to_string(), None),
        Subject::new(kind.to_string(), None),
        StateSnapshot::new(String::from("absent")),
        StateSnapshot::new(after),
    )
}

/// Registers a vehicle via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A required field is empty
/// - The plate is already registered
pub fn register_vehicle(
    persistence: &mut SqlitePersistence,
    request: RegisterVehicleRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RegisterVehicleResponse, ApiError> {
    AuthorizationService::authorize_manage_fleet(authenticated_actor)?;
    require_non_empty(&request.name, "name")?;
    require_non_empty(&request.plate, "plate")?;

    let vehicle: Vehicle = Vehicle {
        vehicle_id: None,
        name: request.name,
        plate: request.plate,
        registration_expiry: request.registration_expiry,
        insurance_expiry: request.insurance_expiry,
        odometer_km: request.odometer_km,
    };
    let event: AuditEvent = registry_event(
        authenticated_actor,
        cause,
        "RegisterVehicle",
        "vehicle",
        vehicle.snapshot_data(),
    );

    let vehicle_id: i64 = persistence
        .register_vehicle(&vehicle, &event)
        .map_err(translate_persistence_error)?;
    info!(vehicle_id, plate = %vehicle.plate, "Registered vehicle");

    Ok(RegisterVehicleResponse {
        vehicle_id,
        message: format!("Registered vehicle '{}'", vehicle.plate),
    })
}

/// Registers a driver via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A required field is empty
/// - The identity is already registered
pub fn register_driver(
    persistence: &mut SqlitePersistence,
    request: RegisterDriverRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RegisterDriverResponse, ApiError> {
    AuthorizationService::authorize_manage_fleet(authenticated_actor)?;
    require_non_empty(&request.identity, "identity")?;
    require_non_empty(&request.name, "name")?;

    let driver: Driver = Driver {
        driver_id: None,
        identity: request.identity,
        name: request.name,
        license_class: request.license_class,
        license_expiry: request.license_expiry,
    };
    let event: AuditEvent = registry_event(
        authenticated_actor,
        cause,
        "RegisterDriver",
        "driver",
        driver.snapshot_data(),
    );

    let driver_id: i64 = persistence
        .register_driver(&driver, &event)
        .map_err(translate_persistence_error)?;
    info!(driver_id, identity = %driver.identity, "Registered driver");

    Ok(RegisterDriverResponse {
        driver_id,
        message: format!("Registered driver '{}'", driver.identity),
    })
}

/// Submits a booking request via the API boundary.
///
/// Any authenticated actor may submit. The booking is validated and
/// enters the workflow in `pending_supervisor`.
///
/// # Errors
///
/// Returns an error if any field validation fails.
pub fn submit_booking(
    persistence: &mut SqlitePersistence,
    request: SubmitBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SubmitBookingResponse, ApiError> {
    AuthorizationService::authorize_submit(authenticated_actor)?;

    let draft: BookingDraft = BookingDraft {
        requester: request.requester,
        start_date: request.start_date,
        end_date: request.end_date,
        purpose: request.purpose,
        destination: request.destination,
        passengers: request.passengers,
        self_drive: request.self_drive,
        preferred_vehicle: request.preferred_vehicle,
    };

    let submission = fleet_core::submit_booking(
        draft,
        now_rfc3339()?,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let booking_id: i64 = persistence
        .persist_submission(&submission)
        .map_err(translate_persistence_error)?;
    info!(booking_id, "Submitted booking");

    Ok(SubmitBookingResponse {
        booking_id,
        status: submission.booking.status.as_str().to_string(),
        message: format!("Booking {booking_id} submitted for supervisor review"),
    })
}

/// Approves a submitted booking, moving it to allocation.
///
/// The approving actor is recorded as the booking's supervisor.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a Supervisor or Admin
/// - The booking does not exist or is not awaiting supervisor review
pub fn approve_booking(
    persistence: &mut SqlitePersistence,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DecisionResponse, ApiError> {
    AuthorizationService::authorize_approve(authenticated_actor)?;

    let booking: Booking = fetch_booking(persistence, booking_id)?;
    let transition = fleet_core::approve_booking(
        &booking,
        authenticated_actor.id.clone(),
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_decision(&transition)
        .map_err(translate_persistence_error)?;
    info!(booking_id, "Approved booking");

    Ok(DecisionResponse {
        booking_id,
        status: transition.booking.status.as_str().to_string(),
        message: format!("Booking {booking_id} approved for allocation"),
    })
}

/// Rejects a booking with a reason.
///
/// Supervisors reject at review; allocators reject when no resources
/// can be found.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a Supervisor, Allocator, or Admin
/// - The reason is empty
/// - The booking does not exist or is already terminal
pub fn reject_booking(
    persistence: &mut SqlitePersistence,
    booking_id: i64,
    request: RejectBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DecisionResponse, ApiError> {
    AuthorizationService::authorize_reject(authenticated_actor)?;

    let booking: Booking = fetch_booking(persistence, booking_id)?;
    let transition = fleet_core::reject_booking(
        &booking,
        request.reason,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_decision(&transition)
        .map_err(translate_persistence_error)?;
    info!(booking_id, "Rejected booking");

    Ok(DecisionResponse {
        booking_id,
        status: transition.booking.status.as_str().to_string(),
        message: format!("Booking {booking_id} rejected"),
    })
}

/// Allocates an internal vehicle and driver to an approved request.
///
/// Availability is checked against the current holds and re-checked
/// inside the committing transaction: of racing allocations for the
/// same pair, exactly one succeeds.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Allocator or Admin
/// - The booking, vehicle, or driver does not exist
/// - The booking is not awaiting allocation
/// - Either resource is reserved or busy
pub fn allocate_booking(
    persistence: &mut SqlitePersistence,
    booking_id: i64,
    request: &AllocateBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DecisionResponse, ApiError> {
    AuthorizationService::authorize_allocate(authenticated_actor)?;

    let booking: Booking = fetch_booking(persistence, booking_id)?;
    let vehicle: Vehicle = fetch_vehicle(persistence, request.vehicle_id)?;
    let driver: Driver = fetch_driver(persistence, request.driver_id)?;
    let availability = persistence
        .resource_availability(request.vehicle_id, request.driver_id)
        .map_err(translate_persistence_error)?;

    let transition = fleet_core::allocate_booking(
        &booking,
        &vehicle,
        &driver,
        availability,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_allocation(&transition)
        .map_err(translate_persistence_error)?;
    info!(
        booking_id,
        vehicle_id = request.vehicle_id,
        driver_id = request.driver_id,
        "Allocated booking"
    );

    Ok(DecisionResponse {
        booking_id,
        status: transition.booking.status.as_str().to_string(),
        message: format!(
            "Booking {booking_id} allocated vehicle {} and driver {}",
            request.vehicle_id, request.driver_id
        ),
    })
}

/// Allocates an external provider to an approved request.
///
/// External allocations hold no fleet resources.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Allocator or Admin
/// - The provider name is empty
/// - The booking does not exist or is not awaiting allocation
pub fn allocate_external(
    persistence: &mut SqlitePersistence,
    booking_id: i64,
    request: AllocateExternalRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DecisionResponse, ApiError> {
    AuthorizationService::authorize_allocate(authenticated_actor)?;

    let booking: Booking = fetch_booking(persistence, booking_id)?;
    let transition = fleet_core::allocate_external(
        &booking,
        request.provider,
        request.details,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_decision(&transition)
        .map_err(translate_persistence_error)?;
    info!(booking_id, "Allocated external provider");

    Ok(DecisionResponse {
        booking_id,
        status: transition.booking.status.as_str().to_string(),
        message: format!("Booking {booking_id} allocated to external provider"),
    })
}

/// Starts a trip, capturing the vehicle's odometer at departure.
///
/// A Driver actor may only start trips as themselves; Admins may start
/// trips for any driver. Starting under a booking consumes that
/// booking's reservation.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither the trip's driver nor an Admin
/// - The vehicle, driver, or booking does not exist
/// - The booking is not approved, or carries a different pair
/// - Either resource is busy or reserved by another booking
pub fn start_trip(
    persistence: &mut SqlitePersistence,
    request: &StartTripRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<StartTripResponse, ApiError> {
    let driver: Driver = fetch_driver(persistence, request.driver_id)?;
    AuthorizationService::authorize_trip(authenticated_actor, &driver.identity)?;

    let vehicle: Vehicle = fetch_vehicle(persistence, request.vehicle_id)?;
    let booking: Option<Booking> = request
        .booking_id
        .map(|id| fetch_booking(persistence, id))
        .transpose()?;
    let availability = persistence
        .resource_availability(request.vehicle_id, request.driver_id)
        .map_err(translate_persistence_error)?;

    let start = fleet_core::start_trip(
        booking.as_ref(),
        &vehicle,
        &driver,
        availability,
        now_rfc3339()?,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let trip_id: i64 = persistence
        .persist_trip_start(&start)
        .map_err(translate_persistence_error)?;
    info!(
        trip_id,
        vehicle_id = request.vehicle_id,
        driver_id = request.driver_id,
        "Started trip"
    );

    Ok(StartTripResponse {
        trip_id,
        start_odometer: start.trip.start_odometer,
        message: format!("Trip {trip_id} started at {} km", start.trip.start_odometer),
    })
}

/// Ends a trip, validating the return odometer reading and advancing
/// the vehicle's odometer.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither the trip's driver nor an Admin
/// - The trip does not exist or is not active
/// - The end reading is below the trip's start reading
pub fn end_trip(
    persistence: &mut SqlitePersistence,
    trip_id: i64,
    request: &EndTripRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<EndTripResponse, ApiError> {
    let trip: Trip = fetch_trip(persistence, trip_id)?;
    let driver: Driver = fetch_driver(persistence, trip.driver_id)?;
    AuthorizationService::authorize_trip(authenticated_actor, &driver.identity)?;

    let vehicle: Vehicle = fetch_vehicle(persistence, trip.vehicle_id)?;
    let completion = fleet_core::end_trip(
        &trip,
        &vehicle,
        request.end_odometer,
        now_rfc3339()?,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_trip_completion(&completion)
        .map_err(translate_persistence_error)?;

    let distance_km: u32 = completion.trip.distance_km().unwrap_or_default();
    info!(trip_id, distance_km, "Ended trip");

    Ok(EndTripResponse {
        trip_id,
        distance_km,
        message: format!("Trip {trip_id} completed: {distance_km} km"),
    })
}

/// Retrieves a booking by ID.
///
/// # Errors
///
/// Returns an error if the booking does not exist.
pub fn get_booking(
    persistence: &SqlitePersistence,
    booking_id: i64,
) -> Result<Booking, ApiError> {
    fetch_booking(persistence, booking_id)
}

/// Lists bookings, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_bookings(
    persistence: &SqlitePersistence,
    status: Option<BookingStatus>,
) -> Result<Vec<Booking>, ApiError> {
    persistence
        .list_bookings(status)
        .map_err(translate_persistence_error)
}

/// Lists all registered vehicles.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicles(persistence: &SqlitePersistence) -> Result<Vec<Vehicle>, ApiError> {
    persistence.list_vehicles().map_err(translate_persistence_error)
}

/// Lists all vehicles with their derived availability state.
///
/// The state is advisory: it can go stale the moment another allocation
/// or trip commits. Allocation itself re-checks inside the transaction.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicle_availability(
    persistence: &SqlitePersistence,
) -> Result<Vec<VehicleAvailability>, ApiError> {
    let vehicles: Vec<Vehicle> = persistence
        .list_vehicles()
        .map_err(translate_persistence_error)?;

    let mut entries: Vec<VehicleAvailability> = Vec::with_capacity(vehicles.len());
    for vehicle in vehicles {
        let vehicle_id: i64 = vehicle.vehicle_id.unwrap_or_default();
        let (reserved_by, active_trip) = persistence
            .vehicle_holds(vehicle_id)
            .map_err(translate_persistence_error)?;
        entries.push(VehicleAvailability {
            vehicle,
            state: derive_resource_state(reserved_by, active_trip),
        });
    }
    Ok(entries)
}

/// Lists all registered drivers.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_drivers(persistence: &SqlitePersistence) -> Result<Vec<Driver>, ApiError> {
    persistence.list_drivers().map_err(translate_persistence_error)
}

/// Lists all drivers with their derived availability state.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_driver_availability(
    persistence: &SqlitePersistence,
) -> Result<Vec<DriverAvailability>, ApiError> {
    let drivers: Vec<Driver> = persistence
        .list_drivers()
        .map_err(translate_persistence_error)?;

    let mut entries: Vec<DriverAvailability> = Vec::with_capacity(drivers.len());
    for driver in drivers {
        let driver_id: i64 = driver.driver_id.unwrap_or_default();
        let (reserved_by, active_trip) = persistence
            .driver_holds(driver_id)
            .map_err(translate_persistence_error)?;
        entries.push(DriverAvailability {
            driver,
            state: derive_resource_state(reserved_by, active_trip),
        });
    }
    Ok(entries)
}

/// Retrieves a trip by ID.
///
/// # Errors
///
/// Returns an error if the trip does not exist.
pub fn get_trip(persistence: &SqlitePersistence, trip_id: i64) -> Result<Trip, ApiError> {
    fetch_trip(persistence, trip_id)
}

/// Lists all trips.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_trips(persistence: &SqlitePersistence) -> Result<Vec<Trip>, ApiError> {
    persistence.list_trips().map_err(translate_persistence_error)
}

/// Retrieves the active trip for a driver, if any.
///
/// # Errors
///
/// Returns an error if the driver does not exist or the query fails.
pub fn get_active_trip(
    persistence: &SqlitePersistence,
    driver_id: i64,
) -> Result<Option<Trip>, ApiError> {
    fetch_driver(persistence, driver_id)?;
    persistence
        .active_trip_for_driver(driver_id)
        .map_err(translate_persistence_error)
}

/// Builds a cost report over completed trips in a date window.
///
/// Trips are grouped by booking purpose as the cost centre; trips with
/// no booking fall under `unassigned`. Trips whose readings fail the
/// odometer invariant are listed as integrity faults and excluded from
/// totals.
///
/// # Errors
///
/// Returns an error if:
/// - Either window boundary is not a valid date
/// - The window is inverted
/// - The rate is not positive
pub fn cost_report(
    persistence: &SqlitePersistence,
    request: &CostReportRequest,
) -> Result<CostReport, ApiError> {
    let from = parse_date(&request.from).map_err(translate_domain_error)?;
    let to = parse_date(&request.to).map_err(translate_domain_error)?;
    if to < from {
        return Err(translate_domain_error(DomainError::InvalidDateRange {
            start_date: request.from.clone(),
            end_date: request.to.clone(),
        }));
    }

    let rate_per_km: f64 = request.rate_per_km.unwrap_or(DEFAULT_RATE_PER_KM);
    if rate_per_km <= 0.0 {
        return Err(ApiError::InvalidInput {
            field: String::from("rate_per_km"),
            message: format!("Rate must be positive, got {rate_per_km}"),
        });
    }

    let trips: Vec<CompletedTrip> = persistence
        .completed_trips_between(&request.from, &request.to)
        .map_err(translate_persistence_error)?;

    Ok(build_cost_report(&trips, rate_per_km))
}

/// Retrieves the ordered audit trail for a subject.
///
/// # Errors
///
/// Returns an error if events cannot be retrieved.
pub fn audit_trail(
    persistence: &SqlitePersistence,
    subject_kind: &str,
    subject_id: Option<i64>,
) -> Result<Vec<AuditEvent>, ApiError> {
    persistence
        .get_audit_trail(subject_kind, subject_id)
        .map_err(translate_persistence_error)
}
