//! Spherical geometry helpers used to sanity-check geocoder answers.

use crate::model::{Bounds, LatLng};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Bounding boxes larger than this (square metres) usually mean the geocoder
/// matched a whole town or region instead of a street address.
pub const IMPLAUSIBLE_AREA: f64 = 500_000.0;

/// Central angle in radians between two points, by the haversine formula.
fn central_angle(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in metres.
pub fn great_circle_distance(a: LatLng, b: LatLng) -> f64 {
    EARTH_RADIUS_M * central_angle(a, b)
}

/// Rough surface area of a bounding box in square metres.
///
/// The box is treated as a flat rectangle whose height is the diagonal's
/// great-circle length and whose width is that length shrunk by the cosine of
/// the mean latitude. Good enough to spot absurdly large matches, nothing more.
pub fn area_of_bounds(bounds: &Bounds) -> f64 {
    let south_west = bounds.south_west;
    let north_east = bounds.north_east;

    let height = great_circle_distance(south_west, north_east);
    let mean_lat = ((south_west.lat + north_east.lat) / 2.0).to_radians();
    let width = height * mean_lat.cos().abs();
    width * height
}

/// Whether a bounding box is too large to be a single address.
pub fn is_implausible(bounds: &Bounds, threshold: f64) -> bool {
    area_of_bounds(bounds) > threshold
}
