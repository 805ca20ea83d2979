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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod cost_report;
mod error;
mod resource;
mod trip;
mod validation;

pub use booking::{Booking, BookingDraft, BookingStatus, ExternalResource};
pub use cost_report::{
    CompletedTrip, CostCenterSummary, CostReport, IntegrityFault, DEFAULT_RATE_PER_KM,
    build_cost_report,
};
pub use error::DomainError;
pub use resource::{Driver, Vehicle};
pub use trip::{Trip, TripStatus};
pub use validation::{
    parse_date, validate_booking_draft, validate_end_odometer, validate_external_provider,
};
