// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use fleet_api::{
    AllocateBookingRequest, AllocateExternalRequest, ApiError, AuthenticatedActor,
    CostReportRequest, DecisionResponse, DriverAvailability, EndTripRequest, EndTripResponse,
    RegisterDriverRequest, RegisterDriverResponse, RegisterVehicleRequest,
    RegisterVehicleResponse, RejectBookingRequest, Role, StartTripRequest, StartTripResponse,
    SubmitBookingRequest, SubmitBookingResponse, VehicleAvailability, authenticate_stub,
};
use fleet_audit::{AuditEvent, Cause};
use fleet_domain::{Booking, BookingStatus, CostReport, Driver, Trip, Vehicle};
use fleet_persistence::SqlitePersistence;

/// Fleet Server - HTTP server for the fleet booking system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for bookings, trips, and the audit log.
    persistence: Arc<Mutex<SqlitePersistence>>,
}

/// API request for registering a vehicle.
///
/// This includes authentication information in addition to the vehicle
/// data.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegisterVehicleApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// A human-readable vehicle name.
    name: String,
    /// The registration plate.
    plate: String,
    /// Registration expiry date (ISO 8601).
    registration_expiry: String,
    /// Insurance expiry date (ISO 8601).
    insurance_expiry: String,
    /// The current odometer reading in kilometres.
    odometer_km: u32,
}

/// API request for registering a driver.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegisterDriverApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The driver's login identity.
    identity: String,
    /// The driver's name.
    name: String,
    /// The driver's licence class.
    license_class: String,
    /// Licence expiry date (ISO 8601).
    license_expiry: String,
}

/// API request for submitting a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SubmitBookingApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The requesting staff member.
    requester: String,
    /// First day of the requested window (ISO 8601).
    start_date: String,
    /// Last day of the requested window (ISO 8601).
    end_date: String,
    /// The purpose of the trip.
    purpose: String,
    /// The destination.
    destination: String,
    /// The number of passengers.
    passengers: u32,
    /// Whether the requester will drive themselves.
    self_drive: bool,
    /// An optional preferred vehicle.
    preferred_vehicle: Option<i64>,
}

/// API request for approving a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ApproveApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
}

/// API request for rejecting a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RejectApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The reason the booking was rejected.
    reason: String,
}

/// API request for allocating a vehicle and driver.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct AllocateApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The vehicle to assign.
    vehicle_id: i64,
    /// The driver to assign.
    driver_id: i64,
}

/// API request for allocating an external provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct AllocateExternalApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The external provider's name.
    provider: String,
    /// Optional free-form details.
    details: Option<String>,
}

/// API request for starting a trip.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct StartTripApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The booking this trip executes, if any.
    booking_id: Option<i64>,
    /// The vehicle taking the trip.
    vehicle_id: i64,
    /// The driver taking the trip.
    driver_id: i64,
}

/// API request for ending a trip.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct EndTripApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The odometer reading at return.
    end_odometer: u32,
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    /// Optional status filter.
    status: Option<String>,
}

/// Query parameters for the active-trip lookup.
#[derive(Debug, Deserialize)]
struct ActiveTripQuery {
    /// The driver to look up.
    driver_id: i64,
}

/// Query parameters for the cost report.
#[derive(Debug, Deserialize)]
struct CostReportQuery {
    /// First day of the reporting window (ISO 8601, inclusive).
    from: String,
    /// Last day of the reporting window (ISO 8601, inclusive).
    to: String,
    /// Cost rate per kilometre; the system default applies when absent.
    rate_per_km: Option<f64>,
}

/// Query parameters for the audit trail.
#[derive(Debug, Deserialize)]
struct AuditTrailQuery {
    /// The record kind ("booking", "trip", "vehicle", "driver").
    subject_kind: String,
    /// The record ID, or absent for all of the kind.
    subject_id: Option<i64>,
}

/// Serializable representation of an `AuditEvent` for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditEventResponse {
    /// The event ID.
    event_id: Option<i64>,
    /// The actor ID.
    actor_id: String,
    /// The actor type.
    actor_type: String,
    /// The cause ID.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The action name.
    action_name: String,
    /// Optional action details.
    action_details: Option<String>,
    /// The subject kind.
    subject_kind: String,
    /// The subject ID.
    subject_id: Option<i64>,
    /// State before the transition.
    before_snapshot: String,
    /// State after the transition.
    after_snapshot: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidTransition { .. }
            | ApiError::ResourceUnavailable { .. }
            | ApiError::ResourceBusy { .. } => StatusCode::CONFLICT,
            ApiError::InvalidReading { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Converts an `AuditEvent` to an `AuditEventResponse`.
fn audit_event_to_response(event: &AuditEvent) -> AuditEventResponse {
    AuditEventResponse {
        event_id: event.event_id,
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        action_name: event.action.name.clone(),
        action_details: event.action.details.clone(),
        subject_kind: event.subject.kind.clone(),
        subject_id: event.subject.id,
        before_snapshot: event.before.data.clone(),
        after_snapshot: event.after.data.clone(),
    }
}

/// Parses a role string into a Role enum.
fn parse_role(role_str: &str) -> Result<Role, HttpError> {
    match role_str.to_lowercase().as_str() {
        "requester" => Ok(Role::Requester),
        "supervisor" => Ok(Role::Supervisor),
        "allocator" => Ok(Role::Allocator),
        "driver" => Ok(Role::Driver),
        "admin" => Ok(Role::Admin),
        _ => Err(HttpError {
            status: StatusCode::BAD_REQUEST,
            message: format!(
                "Invalid role: '{role_str}'. Must be 'requester', 'supervisor', 'allocator', \
                 'driver', or 'admin'"
            ),
        }),
    }
}

/// Authenticates the actor named in a request.
fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, HttpError> {
    let role: Role = parse_role(actor_role)?;
    authenticate_stub(actor_id.to_string(), role).map_err(|e| HttpError {
        status: StatusCode::UNAUTHORIZED,
        message: e.to_string(),
    })
}

/// Handler for POST `/vehicles` endpoint.
async fn handle_register_vehicle(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterVehicleApiRequest>,
) -> Result<Json<RegisterVehicleResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        plate = %req.plate,
        "Handling register_vehicle request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: RegisterVehicleRequest = RegisterVehicleRequest {
        name: req.name,
        plate: req.plate,
        registration_expiry: req.registration_expiry,
        insurance_expiry: req.insurance_expiry,
        odometer_km: req.odometer_km,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterVehicleResponse =
        fleet_api::register_vehicle(&mut persistence, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/vehicles` endpoint.
async fn handle_list_vehicles(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Vehicle>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let vehicles: Vec<Vehicle> = fleet_api::list_vehicles(&persistence)?;
    drop(persistence);

    Ok(Json(vehicles))
}

/// Handler for GET `/vehicles/availability` endpoint.
async fn handle_vehicle_availability(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<VehicleAvailability>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let entries: Vec<VehicleAvailability> = fleet_api::list_vehicle_availability(&persistence)?;
    drop(persistence);

    Ok(Json(entries))
}

/// Handler for POST `/drivers` endpoint.
async fn handle_register_driver(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterDriverApiRequest>,
) -> Result<Json<RegisterDriverResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        identity = %req.identity,
        "Handling register_driver request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: RegisterDriverRequest = RegisterDriverRequest {
        identity: req.identity,
        name: req.name,
        license_class: req.license_class,
        license_expiry: req.license_expiry,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterDriverResponse =
        fleet_api::register_driver(&mut persistence, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/drivers` endpoint.
async fn handle_list_drivers(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Driver>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let drivers: Vec<Driver> = fleet_api::list_drivers(&persistence)?;
    drop(persistence);

    Ok(Json(drivers))
}

/// Handler for GET `/drivers/availability` endpoint.
async fn handle_driver_availability(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<DriverAvailability>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let entries: Vec<DriverAvailability> = fleet_api::list_driver_availability(&persistence)?;
    drop(persistence);

    Ok(Json(entries))
}

/// Handler for POST `/bookings` endpoint.
async fn handle_submit_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SubmitBookingApiRequest>,
) -> Result<Json<SubmitBookingResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        requester = %req.requester,
        "Handling submit_booking request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: SubmitBookingRequest = SubmitBookingRequest {
        requester: req.requester,
        start_date: req.start_date,
        end_date: req.end_date,
        purpose: req.purpose,
        destination: req.destination,
        passengers: req.passengers,
        self_drive: req.self_drive,
        preferred_vehicle: req.preferred_vehicle,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: SubmitBookingResponse =
        fleet_api::submit_booking(&mut persistence, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/bookings` endpoint.
async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<Booking>>, HttpError> {
    let status: Option<BookingStatus> = query
        .status
        .as_deref()
        .map(BookingStatus::from_str)
        .transpose()
        .map_err(|e| HttpError {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        })?;

    let persistence = app_state.persistence.lock().await;
    let bookings: Vec<Booking> = fleet_api::list_bookings(&persistence, status)?;
    drop(persistence);

    Ok(Json(bookings))
}

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let booking: Booking = fleet_api::get_booking(&persistence, booking_id)?;
    drop(persistence);

    Ok(Json(booking))
}

/// Handler for POST `/bookings/{booking_id}/approve` endpoint.
async fn handle_approve_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<ApproveApiRequest>,
) -> Result<Json<DecisionResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        booking_id,
        "Handling approve_booking request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let mut persistence = app_state.persistence.lock().await;
    let response: DecisionResponse =
        fleet_api::approve_booking(&mut persistence, booking_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/reject` endpoint.
async fn handle_reject_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<RejectApiRequest>,
) -> Result<Json<DecisionResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        booking_id,
        "Handling reject_booking request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: RejectBookingRequest = RejectBookingRequest { reason: req.reason };

    let mut persistence = app_state.persistence.lock().await;
    let response: DecisionResponse =
        fleet_api::reject_booking(&mut persistence, booking_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/allocate` endpoint.
async fn handle_allocate_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<AllocateApiRequest>,
) -> Result<Json<DecisionResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        booking_id,
        vehicle_id = req.vehicle_id,
        driver_id = req.driver_id,
        "Handling allocate_booking request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: AllocateBookingRequest = AllocateBookingRequest {
        vehicle_id: req.vehicle_id,
        driver_id: req.driver_id,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: DecisionResponse =
        fleet_api::allocate_booking(&mut persistence, booking_id, &request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/allocate_external` endpoint.
async fn handle_allocate_external(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<AllocateExternalApiRequest>,
) -> Result<Json<DecisionResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        booking_id,
        provider = %req.provider,
        "Handling allocate_external request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: AllocateExternalRequest = AllocateExternalRequest {
        provider: req.provider,
        details: req.details,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: DecisionResponse =
        fleet_api::allocate_external(&mut persistence, booking_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/trips` endpoint.
async fn handle_start_trip(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<StartTripApiRequest>,
) -> Result<Json<StartTripResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        vehicle_id = req.vehicle_id,
        driver_id = req.driver_id,
        "Handling start_trip request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: StartTripRequest = StartTripRequest {
        booking_id: req.booking_id,
        vehicle_id: req.vehicle_id,
        driver_id: req.driver_id,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: StartTripResponse =
        fleet_api::start_trip(&mut persistence, &request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/trips` endpoint.
async fn handle_list_trips(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Trip>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let trips: Vec<Trip> = fleet_api::list_trips(&persistence)?;
    drop(persistence);

    Ok(Json(trips))
}

/// Handler for GET `/trips/active` endpoint.
async fn handle_get_active_trip(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ActiveTripQuery>,
) -> Result<Json<Option<Trip>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let trip: Option<Trip> = fleet_api::get_active_trip(&persistence, query.driver_id)?;
    drop(persistence);

    Ok(Json(trip))
}

/// Handler for GET `/trips/{trip_id}` endpoint.
async fn handle_get_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<Trip>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let trip: Trip = fleet_api::get_trip(&persistence, trip_id)?;
    drop(persistence);

    Ok(Json(trip))
}

/// Handler for POST `/trips/{trip_id}/end` endpoint.
async fn handle_end_trip(
    AxumState(app_state): AxumState<AppState>,
    Path(trip_id): Path<i64>,
    Json(req): Json<EndTripApiRequest>,
) -> Result<Json<EndTripResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        trip_id,
        end_odometer = req.end_odometer,
        "Handling end_trip request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);
    let request: EndTripRequest = EndTripRequest {
        end_odometer: req.end_odometer,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: EndTripResponse =
        fleet_api::end_trip(&mut persistence, trip_id, &request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/reports/costs` endpoint.
async fn handle_cost_report(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<CostReportQuery>,
) -> Result<Json<CostReport>, HttpError> {
    info!(from = %query.from, to = %query.to, "Handling cost_report request");

    let request: CostReportRequest = CostReportRequest {
        from: query.from,
        to: query.to,
        rate_per_km: query.rate_per_km,
    };

    let persistence = app_state.persistence.lock().await;
    let report: CostReport = fleet_api::cost_report(&persistence, &request)?;
    drop(persistence);

    Ok(Json(report))
}

/// Handler for GET `/audit/trail` endpoint.
async fn handle_audit_trail(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<AuditTrailQuery>,
) -> Result<Json<Vec<AuditEventResponse>>, HttpError> {
    let persistence = app_state.persistence.lock().await;
    let events: Vec<AuditEvent> =
        fleet_api::audit_trail(&persistence, &query.subject_kind, query.subject_id)?;
    drop(persistence);

    let responses: Vec<AuditEventResponse> =
        events.iter().map(audit_event_to_response).collect();

    Ok(Json(responses))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/vehicles", post(handle_register_vehicle))
        .route("/vehicles", get(handle_list_vehicles))
        .route("/vehicles/availability", get(handle_vehicle_availability))
        .route("/drivers", post(handle_register_driver))
        .route("/drivers", get(handle_list_drivers))
        .route("/drivers/availability", get(handle_driver_availability))
        .route("/bookings", post(handle_submit_booking))
        .route("/bookings", get(handle_list_bookings))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/approve", post(handle_approve_booking))
        .route("/bookings/{booking_id}/reject", post(handle_reject_booking))
        .route(
            "/bookings/{booking_id}/allocate",
            post(handle_allocate_booking),
        )
        .route(
            "/bookings/{booking_id}/allocate_external",
            post(handle_allocate_external),
        )
        .route("/trips", post(handle_start_trip))
        .route("/trips", get(handle_list_trips))
        .route("/trips/active", get(handle_get_active_trip))
        .route("/trips/{trip_id}", get(handle_get_trip))
        .route("/trips/{trip_id}/end", post(handle_end_trip))
        .route("/reports/costs", get(handle_cost_report))
        .route("/audit/trail", get(handle_audit_trail))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Fleet Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: String = format!("0.0.0.0:{}", args.port);
    info!("Listening on {addr}");

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
