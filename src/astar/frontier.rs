// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::NodeId;
use crate::Point;

#[derive(Debug, Clone, Copy)]
struct Entry {
    f: f64,
    node: NodeId,
    point: Point,
}

/// The A* "open list": search nodes which were discovered, but not yet expanded.
///
/// Nodes are kept sorted by their `f` value; among nodes with equal `f`
/// the earliest inserted one is extracted first. Every open node must be at
/// a distinct point, which allows looking nodes up by their position.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    /// Sorted by descending `f`, so that the minimum can be popped from the back.
    /// Equal `f` entries are ordered from the newest to the oldest.
    entries: Vec<Entry>,
    by_point: HashMap<Point, NodeId>,
}

impl Frontier {
    /// Adds a node at the given point with the given `f` value.
    pub fn insert(&mut self, node: NodeId, point: Point, f: f64) {
        debug_assert!(!self.by_point.contains_key(&point));

        let at = self.entries.partition_point(|e| e.f > f);
        self.entries.insert(at, Entry { f, node, point });
        self.by_point.insert(point, node);
    }

    /// Returns the node with the lowest `f` value, without removing it.
    pub fn peek(&self) -> Option<NodeId> {
        self.entries.last().map(|e| e.node)
    }

    /// Removes and returns the node with the lowest `f` value.
    pub fn pop(&mut self) -> Option<NodeId> {
        let e = self.entries.pop()?;
        self.by_point.remove(&e.point);
        Some(e.node)
    }

    /// Finds the open node at the given point.
    pub fn find(&self, point: Point) -> Option<NodeId> {
        self.by_point.get(&point).copied()
    }

    /// Removes a specific node. Returns false if the node was not open.
    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.entries.iter().rposition(|e| e.node == node) {
            Some(idx) => {
                let e = self.entries.remove(idx);
                self.by_point.remove(&e.point);
                true
            }
            None => false,
        }
    }

    /// Changes the `f` value of an open node, moving it to its new place in the order.
    /// The node is treated as freshly inserted when breaking ties.
    pub fn update(&mut self, node: NodeId, f: f64) {
        if let Some(idx) = self.entries.iter().rposition(|e| e.node == node) {
            let e = self.entries.remove(idx);
            let at = self.entries.partition_point(|x| x.f > f);
            self.entries.insert(at, Entry { f, ..e });
        }
    }

    /// Returns the number of open nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over open nodes and their `f` values, in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.entries.iter().rev().map(|e| (e.node, e.f))
    }
}
