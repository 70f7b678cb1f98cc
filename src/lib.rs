// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Routing and address lookup over road networks digitized from
//! [TIGER/Line](https://www.census.gov/geographies/mapping-files/time-series/geo/tiger-line-file.html)
//! style data.
//!
//! A [Store] is loaded once from three flat binary files (`segments.dat`, `names.dat`
//! and `chains.dat`) and is read-only afterwards. Routes between [RoadSegments](RoadSegment)
//! are found with A*, where adjacency is discovered by exact coordinate equality of segment
//! endpoints. Addresses are resolved by a linear scan over street names and house number ranges.
//!
//! # Example
//!
//! ```no_run
//! let store = roadquery::Store::load_dir("path/to/data", &roadquery::LoadOptions::default())
//!     .expect("failed to load road network");
//!
//! let matches = roadquery::locate(&store, 100, "W", "Nassau", "St", "*")
//!     .expect("address not found");
//! let destination = matches[0].segment;
//!
//! let route = roadquery::find_shortest_path(&store, 0, destination, false)
//!     .expect("failed to find route");
//!
//! println!("Route: {:?}", route);
//! ```

mod address;
mod astar;
mod cost;
mod distance;
pub mod query;
mod store;

pub use address::{locate, AddressError, AddressMatch, AddressQuery, MAX_ADDRESS_MATCHES, WILDCARD};
pub use astar::{
    find_route_via_highways, find_shortest_path, find_shortest_path_with, Frontier, NodeId,
    Progress, Route, RouteError, Search, SearchNode, SearchOptions, SearchState, Visited,
    DEFAULT_STEP_LIMIT, LONG_ROUTE_THRESHOLD_MILES,
};
pub use cost::{
    heuristic, segment_length, segment_traversal_cost, speed_limit, CostError,
    HEURISTIC_SPEED_MPH, NON_INTERSTATE_PENALTY, STREET_CHANGE_PENALTY,
};
pub use distance::{distance, manhattan_distance, MILES_PER_MICRODEGREE};
pub use store::{
    write_segments, write_shapes, write_street_names, Compression, DataFile, EndpointIndex,
    LoadError, LoadOptions, SegmentDisplay, Store, SEGMENT_RECORD_SIZE, STREET_NAME_RECORD_SIZE,
};

/// Highest [RoadSegment::road_class] which may be used for routing.
/// Everything above (most notably 127 - water boundaries) is not a road.
pub const MAX_ROUTABLE_CLASS: u8 = 49;

/// Highest [RoadSegment::road_class] of interstate highways.
pub const MAX_INTERSTATE_CLASS: u8 = 19;

/// Position on Earth, in microdegrees (degrees × 10⁶).
///
/// Points are compared exactly - two segments are connected
/// if and only if they share an endpoint with identical coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub longitude: i32,
    pub latitude: i32,
}

impl Point {
    pub const fn new(latitude: i32, longitude: i32) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Which end of a [RoadSegment] a search has arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

/// Atomic piece of road between two endpoints, the unit of storage and routing.
///
/// Segments are identified by their position in the [Store].
/// Address ranges are not guaranteed to be ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadSegment {
    pub start_address_left: i32,
    pub end_address_left: i32,
    pub start_address_right: i32,
    pub end_address_right: i32,

    /// Index of the [StreetName] of this segment.
    pub street: u32,

    /// Index of the intermediate points of this segment,
    /// `None` if the segment is a straight line.
    pub shape: Option<u32>,

    pub start: Point,
    pub end: Point,

    /// Census feature class code: 11-18 interstates, 21-28 US highways,
    /// 31-38 state highways, 41-48 local roads, 127 water boundaries.
    pub road_class: u8,
}

impl RoadSegment {
    /// Returns true if the segment may be used for routing at all.
    pub fn is_routable(&self) -> bool {
        self.road_class <= MAX_ROUTABLE_CLASS
    }

    /// Returns true if the segment is a part of an interstate highway.
    pub fn is_interstate(&self) -> bool {
        self.road_class <= MAX_INTERSTATE_CLASS
    }

    /// Checks if either the left or the right address range contains the provided
    /// house number. Ranges may be descending.
    pub fn contains_address(&self, house_number: i32) -> bool {
        range_contains(self.start_address_left, self.end_address_left, house_number)
            || range_contains(self.start_address_right, self.end_address_right, house_number)
    }

    /// If `p` is one of the endpoints of this segment, returns the other
    /// endpoint and which end of the segment that is.
    ///
    /// A closed loop (start == end) is entered at its start and left at its end.
    pub fn opposite(&self, p: Point) -> Option<(Point, Endpoint)> {
        if self.start == p {
            Some((self.end, Endpoint::End))
        } else if self.end == p {
            Some((self.start, Endpoint::Start))
        } else {
            None
        }
    }

    /// Returns true if `p` is one of the endpoints of this segment.
    pub fn touches(&self, p: Point) -> bool {
        self.start == p || self.end == p
    }
}

#[inline]
fn range_contains(a: i32, b: i32, x: i32) -> bool {
    (a <= x && x <= b) || (b <= x && x <= a)
}

/// Street name, stored as fixed-width space-padded fields.
///
/// Street names are deduplicated - many [RoadSegments](RoadSegment) refer to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreetName {
    pub prefix: [u8; 2],
    pub name: [u8; 30],
    pub type_: [u8; 4],
    pub suffix: [u8; 2],
}

impl StreetName {
    /// Creates a street name from its components. Every component is truncated
    /// or padded with spaces to its fixed width.
    pub fn new(prefix: &str, name: &str, type_: &str, suffix: &str) -> Self {
        Self {
            prefix: pad(prefix),
            name: pad(name),
            type_: pad(type_),
            suffix: pad(suffix),
        }
    }

    /// Checks whether every field of this street starts with the respective argument.
    /// Empty arguments match everything.
    pub fn matches(&self, prefix: &str, name: &str, type_: &str, suffix: &str) -> bool {
        self.prefix.starts_with(prefix.as_bytes())
            && self.name.starts_with(name.as_bytes())
            && self.type_.starts_with(type_.as_bytes())
            && self.suffix.starts_with(suffix.as_bytes())
    }

    pub fn prefix(&self) -> std::borrow::Cow<'_, str> {
        unpad(&self.prefix)
    }

    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        unpad(&self.name)
    }

    pub fn type_(&self) -> std::borrow::Cow<'_, str> {
        unpad(&self.type_)
    }

    pub fn suffix(&self) -> std::borrow::Cow<'_, str> {
        unpad(&self.suffix)
    }
}

/// Formats the street in a human-readable way, e.g. `W. Nassau St`.
impl std::fmt::Display for StreetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = self.prefix();
        let mut sep = "";

        if !prefix.is_empty() {
            write!(f, "{}.", prefix)?;
            sep = " ";
        }

        for part in [self.name(), self.type_(), self.suffix()] {
            if !part.is_empty() {
                write!(f, "{}{}", sep, part)?;
                sep = " ";
            }
        }

        Ok(())
    }
}

fn pad<const N: usize>(s: &str) -> [u8; N] {
    let mut field = [b' '; N];
    let len = s.len().min(N);
    field[..len].copy_from_slice(&s.as_bytes()[..len]);
    field
}

fn unpad(field: &[u8]) -> std::borrow::Cow<'_, str> {
    let end = field
        .iter()
        .rposition(|&c| c != b' ' && c != 0)
        .map(|i| i + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&field[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: Point, end: Point) -> RoadSegment {
        RoadSegment {
            start_address_left: 101,
            end_address_left: 199,
            start_address_right: 198,
            end_address_right: 100,
            street: 0,
            shape: None,
            start,
            end,
            road_class: 41,
        }
    }

    #[test]
    fn contains_address_in_either_direction() {
        let s = segment(Point::new(0, 0), Point::new(0, 10));
        assert!(s.contains_address(101));
        assert!(s.contains_address(150));
        assert!(s.contains_address(100));
        assert!(s.contains_address(198));
        assert!(!s.contains_address(99));
        assert!(!s.contains_address(200));
    }

    #[test]
    fn opposite_endpoint() {
        let a = Point::new(1, 2);
        let b = Point::new(3, 4);
        let s = segment(a, b);
        assert_eq!(s.opposite(a), Some((b, Endpoint::End)));
        assert_eq!(s.opposite(b), Some((a, Endpoint::Start)));
        assert_eq!(s.opposite(Point::new(5, 6)), None);
    }

    #[test]
    fn street_name_display() {
        assert_eq!(
            StreetName::new("W", "Nassau", "St", "").to_string(),
            "W. Nassau St"
        );
        assert_eq!(
            StreetName::new("", "Morris Bridge", "Rd", "E").to_string(),
            "Morris Bridge Rd E"
        );
        assert_eq!(StreetName::new("", "Main", "", "").to_string(), "Main");
    }

    #[test]
    fn street_name_matching_is_left_anchored() {
        let street = StreetName::new("E", "Fowler", "Ave", "");
        assert!(street.matches("", "", "", ""));
        assert!(street.matches("E", "Fowler", "Ave", ""));
        assert!(street.matches("", "Fow", "", ""));
        assert!(!street.matches("", "owler", "", ""));
        assert!(!street.matches("W", "Fowler", "", ""));
        assert!(!street.matches("", "Fowler", "St", ""));
    }

    #[test]
    fn street_name_is_padded_and_truncated() {
        let street = StreetName::new("NWX", "Main", "Boulevard", "");
        assert_eq!(&street.prefix, b"NW");
        assert_eq!(&street.type_, b"Boul");
        assert_eq!(street.name(), "Main");
        assert_eq!(street.suffix(), "");
    }
}
