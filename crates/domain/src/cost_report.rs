// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cost aggregation over completed trips.
//!
//! The aggregator is a pure function: it never mutates trip or booking
//! records, and re-running it over the same inputs yields identical
//! output. Trips whose readings regressed are excluded from the sums and
//! reported as integrity faults rather than silently summed or thrown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The default cost rate, in currency units per kilometre.
pub const DEFAULT_RATE_PER_KM: f64 = 15.0;

/// A completed trip as consumed by the aggregator.
///
/// The cost center key is derived from the associated booking (its
/// purpose); trips without a booking carry the `"unassigned"` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTrip {
    /// The trip identifier.
    pub trip_id: i64,
    /// The odometer reading at trip start.
    pub start_odometer: u32,
    /// The odometer reading at trip end.
    pub end_odometer: u32,
    /// The cost-center classification key.
    pub cost_center: String,
}

/// A trip whose end reading is below its start reading.
///
/// Such records indicate data corruption outside the trip tracker's
/// invariants; they are reported, never aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityFault {
    /// The offending trip.
    pub trip_id: i64,
    /// The recorded start reading.
    pub start_odometer: u32,
    /// The recorded end reading.
    pub end_odometer: u32,
}

/// Aggregated figures for one cost center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCenterSummary {
    /// The classification key (booking purpose).
    pub key: String,
    /// The number of trips in this bucket.
    pub trip_count: usize,
    /// The total distance driven, in kilometres.
    pub distance_km: u64,
    /// The total estimated cost.
    pub cost: f64,
    /// This bucket's share of the total cost, in percent, rounded to one
    /// decimal place. Zero when the total cost is zero.
    pub percentage: f64,
}

/// The derived cost report for a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    /// The rate applied, in currency units per kilometre.
    pub rate_per_km: f64,
    /// The number of trips included in the sums.
    pub trip_count: usize,
    /// The total distance driven, in kilometres.
    pub total_distance_km: u64,
    /// The total estimated cost.
    pub total_cost: f64,
    /// Per-cost-center summaries, ordered by key.
    pub centers: Vec<CostCenterSummary>,
    /// Trips excluded from the sums because of regressed readings.
    pub integrity_faults: Vec<IntegrityFault>,
}

/// Rounds a percentage to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds a cost report from a set of completed trips.
///
/// Per-trip distance is `end_odometer - start_odometer`; cost is
/// distance times `rate_per_km`. Buckets are keyed by cost center and
/// ordered by key, so the output is deterministic for a given input set.
/// The percentage computation explicitly guards the zero-total case.
#[must_use]
pub fn build_cost_report(trips: &[CompletedTrip], rate_per_km: f64) -> CostReport {
    let mut integrity_faults: Vec<IntegrityFault> = Vec::new();
    let mut buckets: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    let mut total_distance_km: u64 = 0;
    let mut trip_count: usize = 0;

    for trip in trips {
        let Some(distance) = trip.end_odometer.checked_sub(trip.start_odometer) else {
            integrity_faults.push(IntegrityFault {
                trip_id: trip.trip_id,
                start_odometer: trip.start_odometer,
                end_odometer: trip.end_odometer,
            });
            continue;
        };

        let entry = buckets.entry(trip.cost_center.clone()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(distance);
        total_distance_km += u64::from(distance);
        trip_count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let total_cost: f64 = total_distance_km as f64 * rate_per_km;

    let centers: Vec<CostCenterSummary> = buckets
        .into_iter()
        .map(|(key, (count, distance_km))| {
            #[allow(clippy::cast_precision_loss)]
            let cost: f64 = distance_km as f64 * rate_per_km;
            let percentage: f64 = if total_cost == 0.0 {
                0.0
            } else {
                round_one_decimal(100.0 * cost / total_cost)
            };
            CostCenterSummary {
                key,
                trip_count: count,
                distance_km,
                cost,
                percentage,
            }
        })
        .collect();

    CostReport {
        rate_per_km,
        trip_count,
        total_distance_km,
        total_cost,
        centers,
        integrity_faults,
    }
}
