// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocatable fleet resources: vehicles and drivers.
//!
//! Busy/free state is derived, never stored on the resource itself: a
//! resource is busy iff an active trip references it, and reserved iff an
//! approved booking holds it before its trip starts.

use serde::{Deserialize, Serialize};

/// A fleet vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// The vehicle identifier (`None` until persisted).
    pub vehicle_id: Option<i64>,
    /// The descriptive name (make/model).
    pub name: String,
    /// The registration plate.
    pub plate: String,
    /// When the registration expires (ISO 8601 date).
    pub registration_expiry: String,
    /// When the insurance expires (ISO 8601 date).
    pub insurance_expiry: String,
    /// The last known odometer reading, in kilometres.
    ///
    /// This is the implicit start reading of the vehicle's next trip and
    /// is advanced to the end reading when a trip completes.
    pub odometer_km: u32,
}

impl Vehicle {
    /// Returns a compact string description for audit snapshots.
    #[must_use]
    pub fn snapshot_data(&self) -> String {
        format!(
            "vehicle_id={},plate={},odometer={}",
            self.vehicle_id.map_or_else(|| String::from("new"), |id| id.to_string()),
            self.plate,
            self.odometer_km,
        )
    }
}

/// A fleet driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// The driver identifier (`None` until persisted).
    pub driver_id: Option<i64>,
    /// The identity the external identity provider supplies for this
    /// driver. Trip operations require the caller identity to match it.
    pub identity: String,
    /// The driver's display name.
    pub name: String,
    /// The license class held.
    pub license_class: String,
    /// When the license expires (ISO 8601 date).
    pub license_expiry: String,
}

impl Driver {
    /// Returns a compact string description for audit snapshots.
    #[must_use]
    pub fn snapshot_data(&self) -> String {
        format!(
            "driver_id={},identity={},license_class={}",
            self.driver_id.map_or_else(|| String::from("new"), |id| id.to_string()),
            self.identity,
            self.license_class,
        )
    }
}
