// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{Frontier, RouteError, Visited, DEFAULT_STEP_LIMIT};
use crate::{heuristic, segment_traversal_cost, Endpoint, EndpointIndex, Point, RoadSegment, Store};

/// Index of a [SearchNode] within a single [Search].
pub type NodeId = usize;

/// Endpoint of a segment reached during a [Search].
///
/// Nodes form a tree through their `parent` links, rooted at the
/// start point of the source segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchNode {
    pub point: Point,

    /// Segment through which this node was reached
    /// (the source segment for the root).
    pub segment: usize,

    /// Which end of `segment` this node is at.
    pub arrived_at: Endpoint,

    /// Cost of getting here from the root.
    pub g: f64,

    /// Estimated cost of getting from here to the destination.
    pub h: f64,

    /// Always `g + h`.
    pub f: f64,

    pub parent: Option<NodeId>,
}

/// Additional controls for route searches.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions<'a> {
    /// Only use interstate highways (road class up to
    /// [MAX_INTERSTATE_CLASS](crate::MAX_INTERSTATE_CLASS)).
    pub highways_only: bool,

    /// Maximum number of node expansions before [RouteError::StepLimitExceeded]
    /// is returned. The recommended value is [DEFAULT_STEP_LIMIT].
    pub step_limit: usize,

    /// Optional lookup table for adjacent segments. Without it, every
    /// expansion walks over the whole segment table.
    pub endpoint_index: Option<&'a EndpointIndex>,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        Self {
            highways_only: false,
            step_limit: DEFAULT_STEP_LIMIT,
            endpoint_index: None,
        }
    }
}

/// A found route: indices of traversed segments, from the source to the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub segments: Vec<usize>,

    /// Estimated travel time, in hours.
    pub cost: f64,

    /// Point at which the route leaves its last segment.
    pub end: Point,
}

impl Route {
    /// Appends another route which continues from [Route::end] of this one.
    /// The segment shared by both routes is only listed once; `other.cost`
    /// must not include it.
    pub(super) fn join(&mut self, other: Route) {
        let mut segments = other.segments.into_iter().peekable();
        if self.segments.last().is_some() && self.segments.last() == segments.peek() {
            segments.next();
        }
        self.segments.extend(segments);
        self.cost += other.cost;
        self.end = other.end;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Initialized,
    Searching,
    Found,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A node was expanded and moved to the [Visited] set.
    Expanded(NodeId),

    /// The search has finished, either with a route or with the conclusion
    /// that no route exists.
    Done(Option<Route>),
}

/// Single [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) route search
/// between two segments, which can be advanced one node expansion at a time.
///
/// Segments are connected if they share an endpoint with exactly the same coordinates.
/// The search starts at the start point of the source segment and finishes
/// as soon as an expanded point touches the destination segment.
///
/// All search state is owned by this object and dropped with it;
/// many searches may run over the same [Store] at the same time.
#[derive(Debug)]
pub struct Search<'a> {
    store: &'a Store,
    options: SearchOptions<'a>,
    destination: usize,
    destination_point: Point,
    nodes: Vec<SearchNode>,
    frontier: Frontier,
    visited: Visited,
    steps: usize,
    state: SearchState,
    route: Option<Route>,
}

impl<'a> Search<'a> {
    /// Prepares a search from `source` to `destination`.
    ///
    /// Searching from a segment to itself is finished right away
    /// with a single-segment, zero-cost route.
    pub fn new(
        store: &'a Store,
        source: usize,
        destination: usize,
        options: SearchOptions<'a>,
    ) -> Result<Self, RouteError> {
        let source_segment = store
            .segment(source)
            .ok_or(RouteError::InvalidReference(source))?;
        Self::starting_at(
            store,
            source,
            source_segment.start,
            source_segment.end,
            destination,
            options,
        )
    }

    /// Prepares a search which continues along `source` after it was driven up to `at`,
    /// so that `source` itself is not paid for again.
    ///
    /// `at` must be one of the endpoints of `source`.
    pub(super) fn resume(
        store: &'a Store,
        source: usize,
        at: Point,
        destination: usize,
        options: SearchOptions<'a>,
    ) -> Result<Self, RouteError> {
        store
            .segment(source)
            .filter(|s| s.touches(at))
            .ok_or(RouteError::InvalidReference(source))?;
        Self::starting_at(store, source, at, at, destination, options)
    }

    /// `trivial_end` is reported as [Route::end] if `source == destination`.
    fn starting_at(
        store: &'a Store,
        source: usize,
        root: Point,
        trivial_end: Point,
        destination: usize,
        options: SearchOptions<'a>,
    ) -> Result<Self, RouteError> {
        let destination_point = store
            .segment(destination)
            .ok_or(RouteError::InvalidReference(destination))?
            .start;

        let mut search = Self {
            store,
            options,
            destination,
            destination_point,
            nodes: Vec::default(),
            frontier: Frontier::default(),
            visited: Visited::default(),
            steps: 0,
            state: SearchState::Initialized,
            route: None,
        };

        if source == destination {
            search.state = SearchState::Found;
            search.route = Some(Route {
                segments: vec![source],
                cost: 0.0,
                end: trivial_end,
            });
        } else {
            let arrived_at = match store.segment(source) {
                Some(s) if s.start != root => Endpoint::End,
                _ => Endpoint::Start,
            };
            let h = heuristic(root, destination_point);
            search.push_node(SearchNode {
                point: root,
                segment: source,
                arrived_at,
                g: 0.0,
                h,
                f: h,
                parent: None,
            });
        }

        Ok(search)
    }

    /// Expands the open node with the lowest `f` value.
    pub fn step(&mut self) -> Result<Progress, RouteError> {
        match self.state {
            SearchState::Found | SearchState::Exhausted => {
                return Ok(Progress::Done(self.route.clone()))
            }
            SearchState::Initialized | SearchState::Searching => {}
        }

        let Some(current) = self.frontier.peek() else {
            log::debug!(
                "no route to segment {} after {} expansions",
                self.destination,
                self.steps
            );
            self.state = SearchState::Exhausted;
            return Ok(Progress::Done(None));
        };

        self.steps += 1;
        if self.steps > self.options.step_limit {
            return Err(RouteError::StepLimitExceeded);
        }
        self.state = SearchState::Searching;

        let node = self.nodes[current];
        log::trace!(
            "expanding segment {} at {:?} (g={:.5}, h={:.5})",
            node.segment,
            node.point,
            node.g,
            node.h
        );

        if let Some(route) = self.expand(current, node) {
            log::debug!(
                "found route to segment {} after {} expansions",
                self.destination,
                self.steps
            );
            self.state = SearchState::Found;
            self.route = Some(route.clone());
            return Ok(Progress::Done(Some(route)));
        }

        self.frontier.remove(current);
        self.visited.insert(node.point);
        Ok(Progress::Expanded(current))
    }

    /// Steps through the search until it's finished.
    pub fn run(mut self) -> Result<Option<Route>, RouteError> {
        loop {
            if let Progress::Done(route) = self.step()? {
                return Ok(route);
            }
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Returns the number of node expansions done so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn visited(&self) -> &Visited {
        &self.visited
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    /// Returns all nodes created by this search, including the expanded ones.
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    fn push_node(&mut self, node: SearchNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.frontier.insert(id, node.point, node.f);
        id
    }

    fn is_eligible(&self, segment: &RoadSegment) -> bool {
        segment.is_routable() && (!self.options.highways_only || segment.is_interstate())
    }

    fn adjacent_segments(&self, p: Point) -> Vec<usize> {
        match self.options.endpoint_index {
            Some(index) => index.segments_at(p).iter().map(|&i| i as usize).collect(),
            None => self.store.segments_at(p).map(|(i, _)| i).collect(),
        }
    }

    /// Creates or improves nodes at the far ends of all segments touching `node`.
    /// Returns the route if one of those segments is the destination.
    fn expand(&mut self, current: NodeId, node: SearchNode) -> Option<Route> {
        let store = self.store;
        let from = &store.segments()[node.segment];

        for idx in self.adjacent_segments(node.point) {
            let segment = &store.segments()[idx];
            if !self.is_eligible(segment) {
                continue;
            }

            let Some((other, arrived_at)) = segment.opposite(node.point) else {
                continue;
            };

            if self.visited.contains(other) {
                continue;
            }

            let g = match segment_traversal_cost(store, from, segment) {
                Ok(cost) => node.g + cost,
                Err(e) => {
                    log::warn!("segment {}: {} - treating as impassable", idx, e);
                    continue;
                }
            };

            match self.frontier.find(other) {
                Some(existing) => {
                    let n = &mut self.nodes[existing];
                    if g < n.g {
                        n.parent = Some(current);
                        n.segment = idx;
                        n.arrived_at = arrived_at;
                        n.g = g;
                        n.f = g + n.h;
                        let f = n.f;
                        self.frontier.update(existing, f);
                    }
                }

                None => {
                    let h = heuristic(other, self.destination_point);
                    self.push_node(SearchNode {
                        point: other,
                        segment: idx,
                        arrived_at,
                        g,
                        h,
                        f: g + h,
                        parent: Some(current),
                    });
                }
            }

            if idx == self.destination {
                let mut segments = self.path_to(current);
                segments.push(idx);
                return Some(Route {
                    segments,
                    cost: g,
                    end: other,
                });
            }
        }

        None
    }

    /// Walks parent links from `last` up to the root, returning
    /// the segments in the order of travel.
    fn path_to(&self, last: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = Vec::default();
        let mut at = Some(last);

        while let Some(id) = at {
            let segment = self.nodes[id].segment;

            // The root and a node reached over the source segment itself share the segment
            if path.last() != Some(&segment) {
                path.push(segment);
            }

            at = self.nodes[id].parent;
        }

        path.reverse();
        path
    }
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the fastest route between two segments.
///
/// Returns `Ok(None)` if there is no route between the two segments.
/// Otherwise, the route starts with `source` and ends with `destination`.
pub fn find_shortest_path(
    store: &Store,
    source: usize,
    destination: usize,
    highways_only: bool,
) -> Result<Option<Route>, RouteError> {
    let options = SearchOptions {
        highways_only,
        ..SearchOptions::default()
    };
    find_shortest_path_with(store, source, destination, options)
}

/// Like [find_shortest_path], but with full control over the [SearchOptions].
pub fn find_shortest_path_with(
    store: &Store,
    source: usize,
    destination: usize,
    options: SearchOptions<'_>,
) -> Result<Option<Route>, RouteError> {
    Search::new(store, source, destination, options)?.run()
}
