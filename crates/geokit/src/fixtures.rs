//! Synthetic location generation for tests and the demo CLI's `seed` command.
//! Ported from the reference simulator's `geo_utils` module: uniform random
//! points within a radius, and a clustered variant for restaurant hotspots.

use crate::LatLon;
use rand::Rng;

/// Named city centers used to anchor demo fixtures.
pub const CITY_CENTERS: &[(&str, LatLon)] = &[
    ("mumbai", LatLon { lat: 19.0760, lon: 72.8777 }),
    ("delhi", LatLon { lat: 28.6139, lon: 77.2090 }),
    ("bangalore", LatLon { lat: 12.9716, lon: 77.5946 }),
    ("hyderabad", LatLon { lat: 17.3850, lon: 78.4867 }),
    ("chennai", LatLon { lat: 13.0827, lon: 80.2707 }),
    ("kolkata", LatLon { lat: 22.5726, lon: 88.3639 }),
    ("pune", LatLon { lat: 18.5204, lon: 73.8567 }),
    ("ahmedabad", LatLon { lat: 23.0225, lon: 72.5714 }),
];

/// Look up a city center by (case-insensitive) name, defaulting to Mumbai.
pub fn city_center(name: &str) -> LatLon {
    CITY_CENTERS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, loc)| *loc)
        .unwrap_or(CITY_CENTERS[0].1)
}

/// Uniformly random point within `radius_km` of `center` (uniform over the disc area).
pub fn random_point(rng: &mut impl Rng, center: LatLon, radius_km: f64) -> LatLon {
    let bearing = rng.gen::<f64>() * 360.0;
    let r = radius_km * rng.gen::<f64>().sqrt();
    crate::destination_point(center, bearing, r)
}

/// Random point biased toward a smaller "hotspot" within the radius, used to
/// simulate restaurant clustering rather than a uniform spread of pickups.
pub fn random_point_clustered(
    rng: &mut impl Rng,
    center: LatLon,
    radius_km: f64,
    cluster_factor: f64,
) -> LatLon {
    let hotspot_radius = radius_km * cluster_factor;
    let hotspot = random_point(rng, center, hotspot_radius);
    let point_radius = radius_km * (1.0 - cluster_factor);
    random_point(rng, hotspot, point_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn city_center_lookup_is_case_insensitive() {
        assert_eq!(city_center("MUMBAI").lat, city_center("mumbai").lat);
    }

    #[test]
    fn unknown_city_falls_back_to_mumbai() {
        assert_eq!(city_center("atlantis"), CITY_CENTERS[0].1);
    }

    #[test]
    fn random_point_stays_within_radius() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let center = city_center("bangalore");
        for _ in 0..200 {
            let p = random_point(&mut rng, center, 5.0);
            assert!(crate::is_within_radius(p, center, 5.01));
        }
    }

    #[test]
    fn clustered_point_stays_within_radius() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let center = city_center("delhi");
        for _ in 0..200 {
            let p = random_point_clustered(&mut rng, center, 5.0, 0.3);
            assert!(crate::is_within_radius(p, center, 5.01));
        }
    }
}
