// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Point;

/// Length of one microdegree of latitude, in miles.
pub const MILES_PER_MICRODEGREE: f64 = 0.0000691;

/// Microdegrees in one radian, as used to correct for the convergence of meridians.
const MICRODEGREES_PER_RADIAN: f64 = 57_300_000.0;

/// Calculates the approximate distance between two points, in miles.
///
/// Uses a planar approximation, with the longitude delta scaled by the cosine
/// of the latitude of `a`. Good enough for the short distances between
/// consecutive road vertices.
pub fn distance(a: Point, b: Point) -> f64 {
    let dlat = (b.latitude as i64 - a.latitude as i64) as f64;
    let dlon = (b.longitude as i64 - a.longitude as i64) as f64;

    let x = MILES_PER_MICRODEGREE * dlat;
    let y = MILES_PER_MICRODEGREE * dlon * (a.latitude as f64 / MICRODEGREES_PER_RADIAN).cos();

    (x * x + y * y).sqrt()
}

/// Calculates the [taxicab distance](https://en.wikipedia.org/wiki/Taxicab_geometry)
/// between two points, in miles. Longitude is not corrected for latitude.
pub fn manhattan_distance(a: Point, b: Point) -> f64 {
    let dlat = (b.latitude as i64 - a.latitude as i64).unsigned_abs() as f64;
    let dlon = (b.longitude as i64 - a.longitude as i64).unsigned_abs() as f64;
    MILES_PER_MICRODEGREE * (dlat + dlon)
}
