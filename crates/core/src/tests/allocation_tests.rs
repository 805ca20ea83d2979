// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for internal and external allocation.

use crate::{
    BookingTransition, CoreError, ResourceAvailability, allocate_booking, allocate_external,
};

use fleet_domain::{Booking, BookingStatus, DomainError};

use super::helpers::{
    create_pending_allocation_booking, create_test_actor, create_test_cause, create_test_driver,
    create_test_vehicle,
};

// ============================================================================
// Internal Allocation Tests
// ============================================================================

#[test]
fn test_allocate_free_pair_approves_booking() {
    let booking: Booking = create_pending_allocation_booking();

    let result = allocate_booking(
        &booking,
        &create_test_vehicle(),
        &create_test_driver(),
        ResourceAvailability::unheld(),
        create_test_actor(),
        create_test_cause(),
    );

    let transition: BookingTransition = result.unwrap();
    assert_eq!(transition.booking.status, BookingStatus::Approved);
    assert_eq!(transition.booking.vehicle_id, Some(1));
    assert_eq!(transition.booking.driver_id, Some(2));
    assert_eq!(transition.previous_status, BookingStatus::PendingAllocation);
    assert_eq!(transition.audit_event.action.name, "AllocateBooking");
}

#[test]
fn test_allocate_rejects_booking_not_awaiting_allocation() {
    let mut booking: Booking = create_pending_allocation_booking();
    booking.status = BookingStatus::PendingSupervisor;

    let result = allocate_booking(
        &booking,
        &create_test_vehicle(),
        &create_test_driver(),
        ResourceAvailability::unheld(),
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::InvalidStatusTransition { .. })
    ));
}

#[test]
fn test_allocate_rejects_reserved_vehicle() {
    let booking: Booking = create_pending_allocation_booking();
    let availability = ResourceAvailability {
        vehicle_reserved_by: Some(99),
        ..ResourceAvailability::unheld()
    };

    let result = allocate_booking(
        &booking,
        &create_test_vehicle(),
        &create_test_driver(),
        availability,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ResourceUnavailable {
            resource: "vehicle",
            id: 1,
            ..
        })
    ));
}

#[test]
fn test_allocate_rejects_busy_vehicle() {
    let booking: Booking = create_pending_allocation_booking();
    let availability = ResourceAvailability {
        vehicle_active_trip: Some(3),
        ..ResourceAvailability::unheld()
    };

    let result = allocate_booking(
        &booking,
        &create_test_vehicle(),
        &create_test_driver(),
        availability,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ResourceBusy {
            resource: "vehicle",
            id: 1,
            trip_id: 3,
        })
    ));
}

#[test]
fn test_allocate_rejects_reserved_driver() {
    let booking: Booking = create_pending_allocation_booking();
    let availability = ResourceAvailability {
        driver_reserved_by: Some(42),
        ..ResourceAvailability::unheld()
    };

    let result = allocate_booking(
        &booking,
        &create_test_vehicle(),
        &create_test_driver(),
        availability,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ResourceUnavailable {
            resource: "driver",
            id: 2,
            ..
        })
    ));
}

#[test]
fn test_allocate_rejects_busy_driver() {
    let booking: Booking = create_pending_allocation_booking();
    let availability = ResourceAvailability {
        driver_active_trip: Some(5),
        ..ResourceAvailability::unheld()
    };

    let result = allocate_booking(
        &booking,
        &create_test_vehicle(),
        &create_test_driver(),
        availability,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ResourceBusy {
            resource: "driver",
            ..
        })
    ));
}

// ============================================================================
// External Allocation Tests
// ============================================================================

#[test]
fn test_allocate_external_approves_without_internal_resources() {
    let booking: Booking = create_pending_allocation_booking();

    let result = allocate_external(
        &booking,
        String::from("Acme Car Hire"),
        Some(String::from("contract 2025-117")),
        create_test_actor(),
        create_test_cause(),
    );

    let transition: BookingTransition = result.unwrap();
    assert_eq!(transition.booking.status, BookingStatus::Approved);
    assert_eq!(transition.booking.vehicle_id, None);
    assert_eq!(transition.booking.driver_id, None);
    let external = transition.booking.external.unwrap();
    assert_eq!(external.provider, "Acme Car Hire");
    assert_eq!(transition.audit_event.action.name, "AllocateExternal");
}

#[test]
fn test_allocate_external_requires_provider() {
    let booking: Booking = create_pending_allocation_booking();

    let result = allocate_external(
        &booking,
        String::from("   "),
        None,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::InvalidProvider(_))
    ));
}

#[test]
fn test_allocate_external_rejects_terminal_booking() {
    let mut booking: Booking = create_pending_allocation_booking();
    booking.status = BookingStatus::Rejected;

    let result = allocate_external(
        &booking,
        String::from("Acme Car Hire"),
        None,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(result.is_err());
}
