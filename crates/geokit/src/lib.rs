//! Great-circle distance and travel-time primitives, plus the synthetic-fixture
//! helpers needed to generate geographically plausible courier/order locations
//! for tests and the demo CLI.
//!
//! Everything here is deterministic and does no I/O; the only exception is the
//! `fixtures` feature, which pulls in `rand` for random point generation.

#![forbid(unsafe_code)]

#[cfg(feature = "fixtures")]
pub mod fixtures;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on Earth's surface in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Travel time in minutes between two points at `speed_kmph`.
///
/// `speed_kmph` is floored at a small epsilon so a misconfigured zero speed
/// can't produce an infinite or NaN travel time.
pub fn travel_time_minutes(a: LatLon, b: LatLon, speed_kmph: f64) -> f64 {
    let distance_km = haversine_km(a, b);
    let hours = distance_km / speed_kmph.max(1e-3);
    hours * 60.0
}

/// Initial bearing in degrees (0-360) from `a` to `b`.
pub fn bearing_between(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = x.atan2(y).to_degrees();
    (bearing + 360.0) % 360.0
}

/// Destination point given a start, bearing (degrees) and distance (km).
pub fn destination_point(start: LatLon, bearing_deg: f64, distance_km: f64) -> LatLon {
    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();
    let bearing = bearing_deg.to_radians();
    let ratio = distance_km / EARTH_RADIUS_KM;
    let lat2 = (lat1.sin() * ratio.cos() + lat1.cos() * ratio.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * ratio.sin() * lat1.cos()).atan2(ratio.cos() - lat1.sin() * lat2.sin());
    LatLon::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Bounding box (min_lat, max_lat, min_lon, max_lon) for a circular area.
pub fn bounding_box(center: LatLon, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_offset = radius_km / 111.0;
    let lon_offset = radius_km / (111.0 * center.lat.to_radians().cos());
    (
        center.lat - lat_offset,
        center.lat + lat_offset,
        center.lon - lon_offset,
        center.lon + lon_offset,
    )
}

/// Whether `point` lies within `radius_km` of `center`.
pub fn is_within_radius(point: LatLon, center: LatLon, radius_km: f64) -> bool {
    haversine_km(point, center) <= radius_km
}

/// Index and distance (km) of the candidate nearest to `target`.
/// Returns `None` if `candidates` is empty.
pub fn find_nearest(target: LatLon, candidates: &[LatLon]) -> Option<(usize, f64)> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, haversine_km(target, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
