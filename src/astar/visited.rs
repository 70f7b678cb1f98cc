// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::Point;

/// The A* "closed list": points of search nodes which were already expanded.
#[derive(Debug, Default, Clone)]
pub struct Visited(HashSet<Point>);

impl Visited {
    /// Marks a point as finalized. Returns false if it already was.
    pub fn insert(&mut self, point: Point) -> bool {
        self.0.insert(point)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.0.contains(&point)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
