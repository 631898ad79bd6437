//! Guarantee-aware cost matrix construction.
//!
//! For courier `i` and order `j`, with `W` the courier's work hours, `A` its
//! active hours, `G = omega * A` its currently guaranteed hours, and `w_b` the
//! estimated work hours for the pairing:
//!
//! ```text
//! cost(i, j) = w_b                     if G <= W   (guarantee already met)
//!            = max(W + w_b - G, 0)     if G >  W   (below guarantee: discount)
//! ```
//!
//! Below-guarantee couriers are discounted by their shortfall `G - W`,
//! steering the downstream assignment toward work that would otherwise be
//! paid out as an end-of-period handout anyway.

#![forbid(unsafe_code)]

use geokit::LatLon;
use work_estimator::{estimate_work_hours, WorkEstimateInput};

/// The facts about a courier the cost rule needs, decoupled from any
/// particular domain `Courier` representation.
#[derive(Clone, Copy, Debug)]
pub struct CourierFacts {
    pub location: LatLon,
    pub speed_kmph: f64,
    pub work_hours: f64,
    pub active_hours: f64,
}

/// The facts about an order the cost rule needs.
#[derive(Clone, Copy, Debug)]
pub struct OrderFacts {
    pub pickup: LatLon,
    pub dropoff: LatLon,
}

/// Cost of assigning a single courier to a single order under guarantee ratio `omega`.
///
/// Returns `(cost, estimated_work_hours)` so callers that need both (the
/// batch processor persists `estimated_work_hours` on the order) don't
/// recompute the work estimate separately.
pub fn guarantee_aware_cost(
    courier: CourierFacts,
    order: OrderFacts,
    omega: f64,
    prep_time_minutes: f64,
) -> (f64, f64) {
    let w_b = estimate_work_hours(WorkEstimateInput {
        courier_location: courier.location,
        speed_kmph: courier.speed_kmph,
        pickup: order.pickup,
        dropoff: order.dropoff,
        prep_time_minutes,
    });
    let guaranteed = omega * courier.active_hours;
    let cost = if guaranteed <= courier.work_hours {
        w_b
    } else {
        (courier.work_hours + w_b - guaranteed).max(0.0)
    };
    (cost, w_b)
}

/// A dense `couriers.len() x orders.len()` cost matrix, row-major.
///
/// Every entry is finite and non-negative; see [`guarantee_aware_cost`] for
/// the per-pair rule.
pub fn compute_cost_matrix(
    couriers: &[CourierFacts],
    orders: &[OrderFacts],
    omega: f64,
    prep_time_minutes: f64,
) -> Vec<Vec<f64>> {
    couriers
        .iter()
        .map(|&courier| {
            orders
                .iter()
                .map(|&order| guarantee_aware_cost(courier, order, omega, prep_time_minutes).0)
                .collect()
        })
        .collect()
}
