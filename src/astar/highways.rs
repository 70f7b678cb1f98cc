// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{find_shortest_path_with, Route, RouteError, Search, SearchOptions};
use crate::{distance, Store};

/// Straight-line distance (in miles) between the source and destination,
/// above which [find_route_via_highways] splits the search into three legs.
pub const LONG_ROUTE_THRESHOLD_MILES: f64 = 10.0;

/// Finds a route between two far-away segments by going over interstate highways.
///
/// A single A* search over a large network expands a huge amount of local roads.
/// If the two segments are more than [LONG_ROUTE_THRESHOLD_MILES] apart, the route
/// is made from three separate searches instead: from the source to the closest
/// highway, over highways only to the highway closest to the destination, and
/// from there to the destination. Each leg continues from the point where the
/// previous one left its last segment, so every segment is paid for once.
/// The result may be slower than what [find_shortest_path](crate::find_shortest_path)
/// would find.
///
/// Nearby segments, and stores without any highways, fall back to a single search
/// with the provided `options`. `options.highways_only` is ignored for the first
/// and the last leg.
pub fn find_route_via_highways(
    store: &Store,
    source: usize,
    destination: usize,
    options: SearchOptions<'_>,
) -> Result<Option<Route>, RouteError> {
    let from = store
        .segment(source)
        .ok_or(RouteError::InvalidReference(source))?;
    let to = store
        .segment(destination)
        .ok_or(RouteError::InvalidReference(destination))?;

    let d = distance(from.start, to.start);
    if d <= LONG_ROUTE_THRESHOLD_MILES {
        return find_shortest_path_with(store, source, destination, options);
    }

    let (Some(entry), Some(exit)) = (
        store.find_closest_highway(from.start),
        store.find_closest_highway(to.start),
    ) else {
        log::debug!("no highways in the network, using a single search");
        return find_shortest_path_with(store, source, destination, options);
    };

    log::debug!(
        "segments {} and {} are {:.1} miles apart, routing over highways {} and {}",
        source,
        destination,
        d,
        entry,
        exit
    );

    let local = SearchOptions {
        highways_only: false,
        ..options
    };
    let highway = SearchOptions {
        highways_only: true,
        ..options
    };

    let Some(mut route) = find_shortest_path_with(store, source, entry, local)? else {
        return Ok(None);
    };

    for (leg_from, leg_to, leg_options) in [(entry, exit, highway), (exit, destination, local)] {
        match Search::resume(store, leg_from, route.end, leg_to, leg_options)?.run()? {
            Some(leg) => route.join(leg),
            None => return Ok(None),
        }
    }

    Ok(Some(route))
}
