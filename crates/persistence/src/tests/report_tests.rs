// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the completed-trip query feeding the cost report.

use super::helpers::{add_driver, add_vehicle, approved_booking, end_trip, new_store, start_trip};
use crate::SqlitePersistence;
use fleet_domain::{CompletedTrip, CostReport, DEFAULT_RATE_PER_KM, build_cost_report};

fn completed_trip(
    store: &mut SqlitePersistence,
    booking_id: Option<i64>,
    vehicle_id: i64,
    driver_id: i64,
    end_odometer: u32,
    ended_at: &str,
) {
    let trip_id: i64 = start_trip(store, booking_id, vehicle_id, driver_id).expect("start trip");
    end_trip(store, trip_id, end_odometer, ended_at).expect("end trip");
}

#[test]
fn test_window_includes_completed_trip() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    let booking_id: i64 = approved_booking(&mut store, vehicle_id, driver_id);
    completed_trip(
        &mut store,
        Some(booking_id),
        vehicle_id,
        driver_id,
        35_120,
        "2025-11-03T17:45:00Z",
    );

    let trips: Vec<CompletedTrip> = store
        .completed_trips_between("2025-11-01", "2025-11-30")
        .unwrap();

    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].start_odometer, 35_000);
    assert_eq!(trips[0].end_odometer, 35_120);
    assert_eq!(trips[0].cost_center, "Field survey");
}

#[test]
fn test_window_excludes_trips_outside_range() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    completed_trip(
        &mut store,
        None,
        vehicle_id,
        driver_id,
        35_080,
        "2025-11-05T16:00:00Z",
    );

    let trips: Vec<CompletedTrip> = store
        .completed_trips_between("2025-12-01", "2025-12-31")
        .unwrap();

    assert!(trips.is_empty());
}

#[test]
fn test_window_boundaries_are_inclusive() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    completed_trip(
        &mut store,
        None,
        vehicle_id,
        driver_id,
        35_080,
        "2025-11-05T23:59:00Z",
    );

    let trips: Vec<CompletedTrip> = store
        .completed_trips_between("2025-11-05", "2025-11-05")
        .unwrap();

    assert_eq!(trips.len(), 1);
}

#[test]
fn test_bookingless_trip_reports_unassigned() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    completed_trip(
        &mut store,
        None,
        vehicle_id,
        driver_id,
        35_060,
        "2025-11-02T12:00:00Z",
    );

    let trips: Vec<CompletedTrip> = store
        .completed_trips_between("2025-11-01", "2025-11-30")
        .unwrap();

    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].cost_center, "unassigned");
}

#[test]
fn test_active_trips_are_excluded() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    start_trip(&mut store, None, vehicle_id, driver_id).unwrap();

    let trips: Vec<CompletedTrip> = store
        .completed_trips_between("2025-11-01", "2025-11-30")
        .unwrap();

    assert!(trips.is_empty());
}

#[test]
fn test_cost_report_from_storage() {
    let mut store: SqlitePersistence = new_store();
    let vehicle_id: i64 = add_vehicle(&mut store, "ABZ 4821");
    let driver_id: i64 = add_driver(&mut store, "driver-d1");
    let booking_id: i64 = approved_booking(&mut store, vehicle_id, driver_id);
    completed_trip(
        &mut store,
        Some(booking_id),
        vehicle_id,
        driver_id,
        35_120,
        "2025-11-03T17:45:00Z",
    );
    // The vehicle is free again; a second leg under no booking.
    completed_trip(
        &mut store,
        None,
        vehicle_id,
        driver_id,
        35_200,
        "2025-11-10T18:00:00Z",
    );

    let trips: Vec<CompletedTrip> = store
        .completed_trips_between("2025-11-01", "2025-11-30")
        .unwrap();
    let report: CostReport = build_cost_report(&trips, DEFAULT_RATE_PER_KM);

    assert_eq!(report.trip_count, 2);
    assert_eq!(report.total_distance_km, 200);
    assert!((report.total_cost - 3_000.0).abs() < f64::EPSILON);
    assert_eq!(report.centers.len(), 2);

    let survey = report
        .centers
        .iter()
        .find(|center| center.key == "Field survey")
        .expect("survey bucket");
    assert_eq!(survey.distance_km, 120);
    assert!((survey.cost - 1_800.0).abs() < f64::EPSILON);
    assert!(report.integrity_faults.is_empty());
}
