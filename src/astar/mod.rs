// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod frontier;
mod highways;
mod search;
mod visited;

pub use error::{RouteError, DEFAULT_STEP_LIMIT};
pub use frontier::Frontier;
pub use highways::{find_route_via_highways, LONG_ROUTE_THRESHOLD_MILES};
pub use search::{
    find_shortest_path, find_shortest_path_with, NodeId, Progress, Route, Search, SearchNode,
    SearchOptions, SearchState,
};
pub use visited::Visited;

#[cfg(test)]
pub(crate) use search::tests as search_tests;
