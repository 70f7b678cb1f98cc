// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{distance, manhattan_distance, Point, RoadSegment, Store};

/// Distance, in miles, added to every non-interstate segment
/// to account for traffic lights and intersections.
pub const NON_INTERSTATE_PENALTY: f64 = 0.01;

/// Distance, in miles, added when moving onto a segment of a different street.
pub const STREET_CHANGE_PENALTY: f64 = 0.08;

/// Speed assumed by the [heuristic], in miles per hour.
pub const HEURISTIC_SPEED_MPH: f64 = 25.0;

/// Error conditions which may occur when computing segment costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CostError {
    /// The road class has no known speed limit. Segments with such
    /// classes must be treated as impassable.
    #[error("unrecognized road class {0}")]
    UnrecognizedRoadClass(u8),
}

/// Returns the assumed speed limit, in miles per hour, for a given road class.
pub fn speed_limit(road_class: u8) -> Result<f64, CostError> {
    match road_class {
        // Interstate highways: unseparated, separated
        11..=14 => Ok(70.0),
        15..=18 => Ok(80.0),

        // US highways
        21..=24 => Ok(45.0),
        25..=28 => Ok(50.0),

        // State highways
        31..=34 => Ok(45.0),
        35..=38 => Ok(50.0),

        // Local and neighborhood roads
        41..=44 => Ok(25.0),
        45..=48 => Ok(30.0),

        _ => Err(CostError::UnrecognizedRoadClass(road_class)),
    }
}

/// Returns the length of the full geometry of a segment, in miles.
pub fn segment_length(store: &Store, segment: &RoadSegment) -> f64 {
    let mut points = store.segment_geometry(segment);
    let Some(mut prev) = points.next() else {
        return 0.0;
    };

    let mut length = 0.0;
    for p in points {
        length += distance(prev, p);
        prev = p;
    }
    length
}

/// Returns the cost (in hours) of moving from segment `from` onto segment `to`
/// and traversing the whole of `to`.
pub fn segment_traversal_cost(
    store: &Store,
    from: &RoadSegment,
    to: &RoadSegment,
) -> Result<f64, CostError> {
    let speed = speed_limit(to.road_class)?;
    let mut d = segment_length(store, to);

    if !to.is_interstate() {
        d += NON_INTERSTATE_PENALTY;
    }

    if from.street != to.street {
        d += STREET_CHANGE_PENALTY;
    }

    Ok(d / speed)
}

/// Estimates the cost (in hours) of getting from `p` to `destination`.
///
/// Assumes a flat speed of [HEURISTIC_SPEED_MPH] over the [manhattan_distance],
/// which may overestimate the cost on fast roads.
pub fn heuristic(p: Point, destination: Point) -> f64 {
    manhattan_distance(p, destination) / HEURISTIC_SPEED_MPH
}
