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

mod apply;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{
    allocate_booking, allocate_external, approve_booking, end_trip, reject_booking, start_trip,
    submit_booking,
};
pub use error::CoreError;
pub use state::{
    BookingSubmission, BookingTransition, ResourceAvailability, TripCompletion, TripStart,
};
