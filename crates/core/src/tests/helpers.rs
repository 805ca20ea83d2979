// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleet_audit::{Actor, Cause};
use fleet_domain::{Booking, BookingDraft, BookingStatus, Driver, Trip, TripStatus, Vehicle};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("alloc-1"), String::from("allocator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Workflow request"))
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

pub fn create_pending_allocation_booking() -> Booking {
    let mut booking: Booking = Booking::from_draft(
        create_test_draft(),
        String::from("2025-10-20T08:00:00Z"),
    );
    booking.booking_id = Some(7);
    booking.status = BookingStatus::PendingAllocation;
    booking.supervisor = Some(String::from("sup-1"));
    booking
}

pub fn create_approved_booking() -> Booking {
    let mut booking: Booking = create_pending_allocation_booking();
    booking.status = BookingStatus::Approved;
    booking.vehicle_id = Some(1);
    booking.driver_id = Some(2);
    booking
}

pub fn create_test_vehicle() -> Vehicle {
    Vehicle {
        vehicle_id: Some(1),
        name: String::from("Hilux"),
        plate: String::from("ABZ 4821"),
        registration_expiry: String::from("2026-06-30"),
        insurance_expiry: String::from("2026-03-31"),
        odometer_km: 35_000,
    }
}

pub fn create_test_driver() -> Driver {
    Driver {
        driver_id: Some(2),
        identity: String::from("driver-d1"),
        name: String::from("D. Mwale"),
        license_class: String::from("C"),
        license_expiry: String::from("2027-01-31"),
    }
}

pub fn create_active_trip() -> Trip {
    Trip {
        trip_id: Some(3),
        vehicle_id: 1,
        driver_id: 2,
        booking_id: Some(7),
        start_odometer: 35_000,
        end_odometer: None,
        started_at: String::from("2025-11-01T07:30:00Z"),
        ended_at: None,
        status: TripStatus::Active,
    }
}
