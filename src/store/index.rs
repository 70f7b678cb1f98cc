// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::Store;
use crate::Point;

/// Lookup table from a coordinate to all segments having an endpoint there.
///
/// Built once from a [Store], trading memory usage for CPU time: without it,
/// every node expansion in [find_shortest_path](crate::find_shortest_path) requires
/// a walk over the whole segment table. The index reports exactly the same segments,
/// in the same (ascending) order, as [Store::segments_at].
#[derive(Debug, Default, Clone)]
pub struct EndpointIndex(HashMap<Point, Vec<u32>>);

impl EndpointIndex {
    pub fn new(store: &Store) -> Self {
        let mut index: HashMap<Point, Vec<u32>> = HashMap::default();

        for (idx, s) in store.segments().iter().enumerate() {
            index.entry(s.start).or_default().push(idx as u32);
            if s.end != s.start {
                index.entry(s.end).or_default().push(idx as u32);
            }
        }

        Self(index)
    }

    /// Returns indices of all segments with an endpoint at `p`, in ascending order.
    pub fn segments_at(&self, p: Point) -> &[u32] {
        self.0.get(&p).map(|v| v.as_slice()).unwrap_or_default()
    }

    /// Returns the number of distinct endpoints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{road, store_from_tables};
    use crate::StreetName;

    #[test]
    fn matches_full_scan() {
        let a = Point::new(0, 0);
        let b = Point::new(0, 10);
        let c = Point::new(10, 10);
        let store = store_from_tables(
            &[
                road(a, b, 0, 41),
                road(b, c, 0, 41),
                road(c, a, 0, 41),
                road(b, b, 0, 41),
            ],
            &[StreetName::new("", "Loop", "Rd", "")],
            &[],
        );
        let index = EndpointIndex::new(&store);

        assert_eq!(index.len(), 3);
        for p in [a, b, c, Point::new(5, 5)] {
            let scanned: Vec<u32> = store.segments_at(p).map(|(i, _)| i as u32).collect();
            assert_eq!(index.segments_at(p), scanned.as_slice());
        }
        assert_eq!(index.segments_at(b), &[0, 1, 3]);
    }
}
