//! Estimated work-hours for a courier to complete a single order.
//!
//! `work_hours = (travel(courier -> pickup) + prep_time + travel(pickup -> dropoff)) / 60`

#![forbid(unsafe_code)]

use geokit::{travel_time_minutes, LatLon};

/// Everything `estimate_work_hours` needs, decoupled from any particular
/// courier/order representation so this crate has no upstream dependencies.
#[derive(Clone, Copy, Debug)]
pub struct WorkEstimateInput {
    pub courier_location: LatLon,
    pub speed_kmph: f64,
    pub pickup: LatLon,
    pub dropoff: LatLon,
    pub prep_time_minutes: f64,
}

/// Estimated work-hours: travel to pickup, prep, travel to dropoff.
pub fn estimate_work_hours(input: WorkEstimateInput) -> f64 {
    let to_pickup = travel_time_minutes(input.courier_location, input.pickup, input.speed_kmph);
    let to_dropoff = travel_time_minutes(input.pickup, input.dropoff, input.speed_kmph);
    (to_pickup + input.prep_time_minutes + to_dropoff) / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_is_positive_for_distinct_points() {
        let input = WorkEstimateInput {
            courier_location: LatLon::new(19.0760, 72.8777),
            speed_kmph: 25.0,
            pickup: LatLon::new(19.10, 72.90),
            dropoff: LatLon::new(19.20, 73.00),
            prep_time_minutes: 8.0,
        };
        assert!(estimate_work_hours(input) > 0.0);
    }

    #[test]
    fn estimate_is_zero_travel_plus_prep_when_colocated() {
        let p = LatLon::new(12.9716, 77.5946);
        let input = WorkEstimateInput {
            courier_location: p,
            speed_kmph: 25.0,
            pickup: p,
            dropoff: p,
            prep_time_minutes: 8.0,
        };
        // No travel distance at all: just the prep time converted to hours.
        assert!((estimate_work_hours(input) - 8.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn higher_speed_lowers_estimate() {
        let base = WorkEstimateInput {
            courier_location: LatLon::new(0.0, 0.0),
            speed_kmph: 25.0,
            pickup: LatLon::new(0.0, 0.1),
            dropoff: LatLon::new(0.0, 0.2),
            prep_time_minutes: 8.0,
        };
        let faster = WorkEstimateInput {
            speed_kmph: 50.0,
            ..base
        };
        assert!(estimate_work_hours(faster) < estimate_work_hours(base));
    }
}
